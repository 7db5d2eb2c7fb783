//! Speed computation and outlier-tolerant segment extraction.

use crate::entities::{RidePing, RideSegment};
use crate::error::FareError;
use crate::utils::geo::haversine_distance;

use super::tariff::MAX_SPEED_KMH;

/// Elapsed time assumed for two pings sharing a timestamp (0.36 s).
pub const MIN_TIME_SLOT_HOURS: f64 = 0.0001;

pub fn segment_distance_km(segment: &RideSegment) -> f64 {
    haversine_distance(segment.start.coordinate, segment.end.coordinate)
}

/// Average speed between two pings in km/h.
///
/// Pings with the same timestamp are measured over `MIN_TIME_SLOT_HOURS`
/// instead of failing, so an instantaneous jump reads as very fast but finite.
pub fn speed_km_per_hour(start: &RidePing, end: &RidePing) -> Result<f64, FareError> {
    let elapsed = RideSegment::new(*start, *end).elapsed_seconds()?;

    let kilometers = haversine_distance(start.coordinate, end.coordinate);
    let hours = match elapsed {
        0 => MIN_TIME_SLOT_HOURS,
        seconds => seconds as f64 / 3_600.0,
    };

    Ok(kilometers / hours)
}

/// Walk the pings keeping a cursor on the last accepted ping.
///
/// A candidate that is out of order or faster than `MAX_SPEED_KMH` is dropped
/// and the cursor stays put, so the next candidate is measured against the
/// last good ping rather than the outlier.
pub fn valid_segments(pings: &[RidePing]) -> Vec<RideSegment> {
    let mut segments = Vec::with_capacity(pings.len().saturating_sub(1));

    let Some((first, rest)) = pings.split_first() else {
        return segments;
    };

    let mut cursor = *first;
    for candidate in rest {
        match speed_km_per_hour(&cursor, candidate) {
            Ok(speed) if speed <= MAX_SPEED_KMH => {
                segments.push(RideSegment::new(cursor, *candidate));
                cursor = *candidate;
            }
            Ok(speed) => {
                tracing::trace!(
                    ride_id = candidate.ride_id,
                    timestamp = candidate.timestamp,
                    speed_kmh = speed,
                    "Skipping ping above speed limit"
                );
            }
            Err(e) => {
                tracing::debug!(
                    ride_id = candidate.ride_id,
                    timestamp = candidate.timestamp,
                    error = %e,
                    "Skipping ping with unusable timestamp"
                );
            }
        }
    }

    segments
}
