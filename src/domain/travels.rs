//! Travel diary entries bundled with the site.

use serde::{Deserialize, Serialize};

use crate::domain::entities::null_as_default;

/// Trips shown before the reader asks for more, and how many each request adds.
pub const TRIPS_PAGE_SIZE: usize = 3;
const DEFAULT_TRIP_DAYS: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    /// Key of the entry in the bundled data file.
    #[serde(skip)]
    pub slug: String,
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripStats {
    pub travelers: u32,
    pub days: u32,
    pub landmarks: usize,
}

impl TripRecord {
    /// Derived figures shown on the trip card.
    pub fn stats(&self) -> TripStats {
        TripStats {
            travelers: self.id % 4 + 2,
            days: leading_days(&self.read_time),
            landmarks: self.images.len(),
        }
    }
}

fn leading_days(read_time: &str) -> u32 {
    let digits: String = read_time
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits
        .parse::<u32>()
        .ok()
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_TRIP_DAYS)
}

/// Number of trips to show after `shown` have been displayed and more were requested.
pub fn next_visible(shown: usize, total: usize) -> usize {
    shown.saturating_add(TRIPS_PAGE_SIZE).min(total)
}

/// Clamp a requested visible count to the valid range.
pub fn visible_count(requested: Option<usize>, total: usize) -> usize {
    requested
        .unwrap_or(TRIPS_PAGE_SIZE)
        .max(TRIPS_PAGE_SIZE)
        .min(total)
}
