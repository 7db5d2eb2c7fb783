pub mod parser;
pub mod sink;

pub use parser::{parse_rides, IngestReport};
pub use sink::write_estimates;
