//! Fan-out/fan-in fare pipeline.
//!
//! ```text
//! parser --jobs--> worker x N --results--> sink
//!                     |
//!                   done --> completion tracker (closes results)
//! ```

pub mod completion;
pub mod worker;

use std::io::{Read, Write};

use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};

use crate::calculator::calculate_fare_for_ride;
use crate::config::Config;
use crate::entities::{FareEstimate, RideBatch};
use crate::error::AppResult;
use crate::io::{parse_rides, write_estimates, IngestReport};

pub use completion::{CompletionTracker, TrackerState};
pub use worker::{run_worker, DoneSignal, FareFn, JobQueue, WorkerReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub ingest: IngestReport,
    pub workers: WorkerReport,
    pub estimates_written: usize,
    pub done_signals: usize,
}

/// Spawn `workers` tasks sharing one job queue, plus the tracker that closes
/// the result channel once they are all done.
pub fn spawn_worker_pool(
    workers: usize,
    jobs: mpsc::Receiver<RideBatch>,
    results: mpsc::Sender<FareEstimate>,
    fare: FareFn,
) -> (Vec<JoinHandle<WorkerReport>>, JoinHandle<usize>) {
    let queue = JobQueue::new(jobs);
    let (done_tx, done_rx) = mpsc::channel(workers.max(1));

    let handles = (0..workers)
        .map(|worker_id| {
            tokio::spawn(run_worker(
                worker_id,
                queue.clone(),
                results.clone(),
                DoneSignal::new(worker_id, done_tx.clone()),
                fare,
            ))
        })
        .collect();

    let tracker = tokio::spawn(CompletionTracker::new(workers, done_rx, results).run());

    (handles, tracker)
}

/// Price every ride read from `reader` and write the estimates to `writer`.
pub async fn run_pipeline<R, W>(config: &Config, reader: R, writer: W) -> AppResult<PipelineReport>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    run_pipeline_with(config, reader, writer, calculate_fare_for_ride).await
}

/// Same as [`run_pipeline`] with a custom per-ride fare function.
pub async fn run_pipeline_with<R, W>(
    config: &Config,
    reader: R,
    writer: W,
    fare: FareFn,
) -> AppResult<PipelineReport>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    config.validate()?;

    let (job_tx, job_rx) = mpsc::channel::<RideBatch>(config.job_capacity);
    let (result_tx, result_rx) = mpsc::channel::<FareEstimate>(config.result_capacity);

    let (workers, tracker) = spawn_worker_pool(config.workers, job_rx, result_tx, fare);
    tracing::info!(workers = config.workers, "Worker pool started");

    let sink = task::spawn_blocking(move || write_estimates(writer, result_rx));

    let progress_every = config.progress_every;
    // the job channel closes when `job_tx` is dropped at the end of this closure
    let parser = task::spawn_blocking(move || parse_rides(reader, &job_tx, progress_every));

    // join every task before surfacing any failure so nothing is left running
    let ingest = parser.await;

    let mut totals = WorkerReport::default();
    let mut worker_failure = None;
    for handle in workers {
        match handle.await {
            Ok(report) => totals += report,
            Err(e) => {
                tracing::error!(error = %e, "Worker task failed");
                if worker_failure.is_none() {
                    worker_failure = Some(e);
                }
            }
        }
    }

    let done_signals = tracker.await?;
    let estimates_written = sink.await??;
    let ingest = ingest??;
    if let Some(e) = worker_failure {
        return Err(e.into());
    }

    let report = PipelineReport {
        ingest,
        workers: totals,
        estimates_written,
        done_signals,
    };

    tracing::info!(
        rides = report.ingest.batches,
        malformed_rows = report.ingest.malformed_rows,
        priced = report.estimates_written,
        skipped = report.workers.skipped,
        "Pipeline complete"
    );

    Ok(report)
}
