pub mod calculator;
pub mod config;
pub mod entities;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod utils;

pub use calculator::calculate_fare_for_ride;
pub use config::Config;
pub use entities::{Coordinate, FareEstimate, RideBatch, RidePing, RideSegment};
pub use error::{AppError, AppResult, FareError};
pub use pipeline::{run_pipeline, PipelineReport};
