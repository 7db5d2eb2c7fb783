use std::ops::Deref;

use chrono::{DateTime, Timelike, Utc};

use crate::error::FareError;

/// A position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One reported location sample of a ride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidePing {
    pub ride_id: i64,
    pub coordinate: Coordinate,
    /// Unix timestamp, whole seconds
    pub timestamp: i64,
}

impl RidePing {
    pub fn new(ride_id: i64, latitude: f64, longitude: f64, timestamp: i64) -> Self {
        Self {
            ride_id,
            coordinate: Coordinate { latitude, longitude },
            timestamp,
        }
    }

    /// Hour of day (0-23) of this ping in UTC
    pub fn hour_of_day_utc(&self) -> u32 {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0)
            .map(|at| at.hour())
            .unwrap_or_else(|| (self.timestamp.rem_euclid(86_400) / 3_600) as u32)
    }
}

/// Two consecutive accepted pings of the same ride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RideSegment {
    pub start: RidePing,
    pub end: RidePing,
}

impl RideSegment {
    pub fn new(start: RidePing, end: RidePing) -> Self {
        Self { start, end }
    }

    /// Seconds from start to end. Fails for out-of-order pings and for spans
    /// that do not fit in an `i64`.
    pub fn elapsed_seconds(&self) -> Result<i64, FareError> {
        let (start, end) = (self.start.timestamp, self.end.timestamp);

        if end < start {
            return Err(FareError::InvalidTimestampOrder { start, end });
        }
        end.checked_sub(start)
            .ok_or(FareError::ElapsedTimeOverflow { start, end })
    }

    pub fn elapsed_hours(&self) -> Result<f64, FareError> {
        Ok(self.elapsed_seconds()? as f64 / 3_600.0)
    }
}

/// All pings of a single ride, in the order they were received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideBatch(Vec<RidePing>);

impl RideBatch {
    pub fn new(pings: Vec<RidePing>) -> Self {
        Self(pings)
    }

    /// Ride identifier of the first ping, if any
    pub fn ride_id(&self) -> Option<i64> {
        self.0.first().map(|ping| ping.ride_id)
    }

    pub fn push(&mut self, ping: RidePing) {
        self.0.push(ping);
    }
}

impl Deref for RideBatch {
    type Target = [RidePing];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<RidePing>> for RideBatch {
    fn from(pings: Vec<RidePing>) -> Self {
        Self(pings)
    }
}
