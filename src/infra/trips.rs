//! Travel diary entries read from the bundled JSON data file.

use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use crate::application::repos::{RepoError, TripsRepo};
use crate::domain::travels::TripRecord;

const SOURCE: &str = "infra::trips";

/// Reads the trips map (`{"<slug>": {...}, ...}`) on every call so edits to
/// the file show up without a restart.
#[derive(Debug, Clone)]
pub struct TripsFileRepo {
    path: PathBuf,
}

impl TripsFileRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TripsRepo for TripsFileRepo {
    async fn list_trips(&self) -> Result<Vec<TripRecord>, RepoError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    target = SOURCE,
                    path = %self.path.display(),
                    "Travels data file is missing"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(RepoError::unavailable(err)),
        };

        let entries: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(RepoError::decode)?;
        Ok(decode_trips(entries))
    }
}

fn decode_trips(entries: Map<String, Value>) -> Vec<TripRecord> {
    let mut trips: Vec<TripRecord> = entries
        .into_iter()
        .filter_map(|(slug, entry)| match serde_json::from_value::<TripRecord>(entry) {
            Ok(trip) => Some(TripRecord { slug, ..trip }),
            Err(err) => {
                warn!(target = SOURCE, slug = %slug, error = %err, "skipping malformed trip");
                None
            }
        })
        .collect();
    trips.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.slug.cmp(&b.slug)));
    trips
}
