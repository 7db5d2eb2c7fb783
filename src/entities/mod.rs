pub mod fare;
pub mod ride;

pub use fare::FareEstimate;
pub use ride::{Coordinate, RideBatch, RidePing, RideSegment};
