pub mod segments;
pub mod tariff;

use crate::entities::{FareEstimate, RidePing};
use crate::error::FareError;

pub use segments::{speed_km_per_hour, valid_segments, MIN_TIME_SLOT_HOURS};
pub use tariff::{segment_fare, SegmentKind, FLAG_FALL, MINIMUM_FARE};

/// Price a single ride from its pings.
///
/// The total is the flag fall plus every valid segment's fare, clamped up to
/// `MINIMUM_FARE`. Pure and free of shared state, so workers call it
/// concurrently on independent batches.
pub fn calculate_fare_for_ride(pings: &[RidePing]) -> Result<FareEstimate, FareError> {
    let ride_id = pings.first().map(|ping| ping.ride_id);
    let segments = valid_segments(pings);

    let Some(ride_id) = ride_id.filter(|_| !segments.is_empty()) else {
        return Err(FareError::NotEnoughSegments { ride_id });
    };

    let mut total = FLAG_FALL;
    for segment in &segments {
        total += segment_fare(segment)?;
    }

    Ok(FareEstimate::new(ride_id, total.max(MINIMUM_FARE)))
}
