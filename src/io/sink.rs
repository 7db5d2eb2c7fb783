use std::io::Write;

use csv::WriterBuilder;
use tokio::sync::mpsc;

use crate::entities::FareEstimate;
use crate::error::AppResult;

/// Write `ride_id,cost` rows until the result channel closes.
///
/// Runs on a blocking thread. Returns the number of rows written.
pub fn write_estimates<W: Write>(
    writer: W,
    mut results: mpsc::Receiver<FareEstimate>,
) -> AppResult<usize> {
    let mut csv_wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    let mut written = 0;

    while let Some(estimate) = results.blocking_recv() {
        csv_wtr.serialize(estimate.to_row())?;
        written += 1;
    }

    csv_wtr.flush()?;
    tracing::debug!(written, "Result stream closed");
    Ok(written)
}
