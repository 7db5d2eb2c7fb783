//! Fixed tariff table and per-segment pricing.

use crate::entities::RideSegment;
use crate::error::FareError;

use super::segments::{segment_distance_km, speed_km_per_hour};

pub const DAY_RATE_PER_KM: f64 = 0.74;
pub const NIGHT_RATE_PER_KM: f64 = 1.30;
pub const IDLE_RATE_PER_HOUR: f64 = 11.90;
pub const FLAG_FALL: f64 = 1.30;
pub const MINIMUM_FARE: f64 = 3.47;

/// Segments at or below this speed are billed by time
pub const IDLE_SPEED_KMH: f64 = 10.0;
/// Segments above this speed are treated as GPS noise
pub const MAX_SPEED_KMH: f64 = 100.0;

/// Night tariff covers [NIGHT_START_HOUR, NIGHT_END_HOUR) UTC
pub const NIGHT_START_HOUR: u32 = 0;
pub const NIGHT_END_HOUR: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Idle,
    Day,
    Night,
}

pub fn is_night_hour(hour: u32) -> bool {
    (NIGHT_START_HOUR..NIGHT_END_HOUR).contains(&hour)
}

/// Classify an already-validated segment.
pub fn classify(segment: &RideSegment) -> Result<SegmentKind, FareError> {
    let speed = speed_km_per_hour(&segment.start, &segment.end)?;

    if speed <= IDLE_SPEED_KMH {
        Ok(SegmentKind::Idle)
    } else if is_night_hour(segment.start.hour_of_day_utc()) {
        Ok(SegmentKind::Night)
    } else {
        Ok(SegmentKind::Day)
    }
}

/// Fare contribution of one segment.
///
/// Idle segments cost `IDLE_RATE_PER_HOUR` per elapsed hour regardless of
/// distance; moving segments cost the day or night rate per kilometer, picked
/// by the hour the segment started.
pub fn segment_fare(segment: &RideSegment) -> Result<f64, FareError> {
    let fare = match classify(segment)? {
        SegmentKind::Idle => IDLE_RATE_PER_HOUR * segment.elapsed_hours()?,
        SegmentKind::Night => segment_distance_km(segment) * NIGHT_RATE_PER_KM,
        SegmentKind::Day => segment_distance_km(segment) * DAY_RATE_PER_KM,
    };

    Ok(fare)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RidePing;

    // 2018-12-12T11:00:00Z
    const ELEVEN_AM: i64 = 1_544_612_400;
    // 2018-12-12T02:00:00Z
    const TWO_AM: i64 = 1_544_580_000;

    fn segment(from: (f64, f64), to: (f64, f64), start: i64, end: i64) -> RideSegment {
        RideSegment::new(
            RidePing::new(1, from.0, from.1, start),
            RidePing::new(1, to.0, to.1, end),
        )
    }

    #[test]
    fn test_night_hours() {
        assert!(is_night_hour(0));
        assert!(is_night_hour(4));
        assert!(!is_night_hour(5));
        assert!(!is_night_hour(23));
    }

    #[test]
    fn test_idle_segment_billed_by_time() {
        // ~0.67 km in 30 minutes is 1.35 km/h
        let idle = segment(
            (51.415597, -2.397278),
            (51.420850, -2.392416),
            ELEVEN_AM,
            ELEVEN_AM + 1_800,
        );

        assert_eq!(classify(&idle), Ok(SegmentKind::Idle));
        let fare = segment_fare(&idle).unwrap();
        assert!((fare - IDLE_RATE_PER_HOUR * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_idle_with_identical_timestamps_costs_nothing() {
        let still = segment((51.0, -2.0), (51.0, -2.0), ELEVEN_AM, ELEVEN_AM);
        assert_eq!(classify(&still), Ok(SegmentKind::Idle));
        assert_eq!(segment_fare(&still), Ok(0.0));
    }

    #[test]
    fn test_day_and_night_rates() {
        let from = (51.365184, -2.388245);
        let to = (52.052135, -1.269958);

        let day = segment(from, to, ELEVEN_AM, ELEVEN_AM + 3_600);
        assert_eq!(classify(&day), Ok(SegmentKind::Day));
        let day_fare = segment_fare(&day).unwrap();
        assert!((day_fare - 108.49 * DAY_RATE_PER_KM).abs() < 0.05);

        let night = segment(from, to, TWO_AM, TWO_AM + 3_600);
        assert_eq!(classify(&night), Ok(SegmentKind::Night));
        let night_fare = segment_fare(&night).unwrap();
        assert!((night_fare - 108.49 * NIGHT_RATE_PER_KM).abs() < 0.05);
    }

    #[test]
    fn test_start_hour_picks_the_rate() {
        // 2018-12-12T04:58:00Z to 05:01:00Z, ~1.22 km
        let into_morning = segment(
            (49.143352, 3.519707),
            (49.150684, 3.532212),
            1_544_590_680,
            1_544_590_860,
        );
        assert_eq!(classify(&into_morning), Ok(SegmentKind::Night));

        // 2018-12-12T23:30:00Z to 2018-12-13T01:30:00Z, ~108.5 km
        let past_midnight = segment(
            (51.365184, -2.388245),
            (52.052135, -1.269958),
            1_544_657_400,
            1_544_657_400 + 7_200,
        );
        assert_eq!(classify(&past_midnight), Ok(SegmentKind::Day));
        let fare = segment_fare(&past_midnight).unwrap();
        assert!((fare - 108.49 * DAY_RATE_PER_KM).abs() < 0.05);
    }

    #[test]
    fn test_out_of_order_segment_is_rejected() {
        let backwards = segment((51.0, -2.0), (51.1, -2.0), ELEVEN_AM, ELEVEN_AM - 60);
        assert!(matches!(
            segment_fare(&backwards),
            Err(FareError::InvalidTimestampOrder { .. })
        ));
    }
}
