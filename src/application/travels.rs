use std::sync::Arc;

use tracing::warn;

use crate::application::blog::Loaded;
use crate::application::repos::TripsRepo;
use crate::application::toast::Toast;
use crate::domain::travels::{TripRecord, next_visible, visible_count};
use crate::presentation::views::{TripCardView, TripsView};

const SOURCE: &str = "application::travels::TravelService";

#[derive(Clone)]
pub struct TravelService {
    trips: Arc<dyn TripsRepo>,
}

impl TravelService {
    pub fn new(trips: Arc<dyn TripsRepo>) -> Self {
        Self { trips }
    }

    /// The first `requested` trips (at least one page), with a link to the next page.
    pub async fn listing(&self, requested: Option<usize>) -> Loaded<TripsView> {
        match self.trips.list_trips().await {
            Ok(trips) => Loaded {
                value: trips_view(&trips, requested),
                toasts: Vec::new(),
            },
            Err(err) => {
                warn!(target = SOURCE, error = %err, "failed to list trips");
                Loaded {
                    value: trips_view(&[], requested),
                    toasts: vec![Toast::fetch_failed("trips")],
                }
            }
        }
    }
}

fn trips_view(trips: &[TripRecord], requested: Option<usize>) -> TripsView {
    let total = trips.len();
    let shown = visible_count(requested, total);
    let next = next_visible(shown, total);

    TripsView {
        trips: trips.iter().take(shown).map(trip_card).collect(),
        shown,
        total,
        next_shown: (next > shown).then_some(next),
    }
}

fn trip_card(trip: &TripRecord) -> TripCardView {
    let stats = trip.stats();
    TripCardView {
        slug: trip.slug.clone(),
        title: trip.title.clone(),
        date: trip.date.clone(),
        description: trip.description.clone(),
        cover_url: trip.cover.clone(),
        highlights: trip.highlights.clone(),
        read_time: trip.read_time.clone(),
        travelers: stats.travelers,
        days: stats.days,
        landmarks: stats.landmarks,
    }
}
