use std::io::Read;

use csv::{ByteRecord, ReaderBuilder, Trim};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::entities::{RideBatch, RidePing};
use crate::error::{AppError, AppResult};

/// One input row: `id,lat,lng,timestamp`, no header.
#[derive(Debug, Deserialize)]
struct PingRecord {
    ride_id: i64,
    latitude: f64,
    longitude: f64,
    timestamp: i64,
}

impl From<PingRecord> for RidePing {
    fn from(record: PingRecord) -> Self {
        RidePing::new(
            record.ride_id,
            record.latitude,
            record.longitude,
            record.timestamp,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows: usize,
    pub malformed_rows: usize,
    pub batches: usize,
}

/// Read pings and send one `RideBatch` per run of consecutive rows sharing a ride id.
///
/// Runs on a blocking thread; `blocking_send` parks it while the job channel is
/// full. The channel closes when the caller drops `jobs` after this returns.
/// Malformed rows are skipped, I/O failures abort.
pub fn parse_rides<R: Read>(
    reader: R,
    jobs: &mpsc::Sender<RideBatch>,
    progress_every: usize,
) -> AppResult<IngestReport> {
    let mut csv_rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut report = IngestReport::default();
    let mut current = RideBatch::default();
    let mut raw_record = ByteRecord::new();

    while csv_rdr.read_byte_record(&mut raw_record)? {
        report.rows += 1;

        let parsed: Result<PingRecord, csv::Error> = raw_record.deserialize(None);
        let ping: RidePing = match parsed {
            Ok(record) => record.into(),
            Err(e) => {
                report.malformed_rows += 1;
                tracing::warn!(
                    line = ?raw_record.position().map(|p| p.line()),
                    error = %e,
                    "Skipping malformed row"
                );
                continue;
            }
        };

        if current.ride_id().is_some_and(|id| id != ping.ride_id) {
            let finished = std::mem::take(&mut current);
            send_batch(jobs, finished, &mut report, progress_every)?;
        }
        current.push(ping);
    }

    if !current.is_empty() {
        send_batch(jobs, current, &mut report, progress_every)?;
    }

    Ok(report)
}

fn send_batch(
    jobs: &mpsc::Sender<RideBatch>,
    batch: RideBatch,
    report: &mut IngestReport,
    progress_every: usize,
) -> AppResult<()> {
    jobs.blocking_send(batch)
        .map_err(|_| AppError::ChannelClosed("job"))?;

    report.batches += 1;
    if progress_every > 0 && report.batches % progress_every == 0 {
        tracing::info!(rides = report.batches, "Processed rides");
    }

    Ok(())
}
