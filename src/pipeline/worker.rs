use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::entities::{FareEstimate, RideBatch, RidePing};
use crate::error::FareError;

/// Function a worker applies to every batch it claims.
pub type FareFn = fn(&[RidePing]) -> Result<FareEstimate, FareError>;

/// Shared consumer side of the job channel.
///
/// Every worker holds a clone; each batch is handed to exactly one of them.
#[derive(Debug, Clone)]
pub struct JobQueue {
    inner: Arc<Mutex<mpsc::Receiver<RideBatch>>>,
}

impl JobQueue {
    pub fn new(receiver: mpsc::Receiver<RideBatch>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Next batch, or `None` once the channel is closed and drained.
    pub async fn next(&self) -> Option<RideBatch> {
        self.inner.lock().await.recv().await
    }
}

/// One-shot completion signal. Sending consumes it.
#[derive(Debug)]
pub struct DoneSignal {
    worker_id: usize,
    sender: mpsc::Sender<usize>,
}

impl DoneSignal {
    pub fn new(worker_id: usize, sender: mpsc::Sender<usize>) -> Self {
        Self { worker_id, sender }
    }

    pub async fn send(self) {
        if self.sender.send(self.worker_id).await.is_err() {
            tracing::warn!(worker_id = self.worker_id, "Done channel already closed");
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub processed: usize,
    pub published: usize,
    pub skipped: usize,
    /// Priced but dropped because the result channel had closed
    pub undelivered: usize,
}

impl std::ops::AddAssign for WorkerReport {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.published += other.published;
        self.skipped += other.skipped;
        self.undelivered += other.undelivered;
    }
}

/// Drain the job queue, pricing each batch and publishing successes.
///
/// Failed rides are logged and dropped. The result sender is released before
/// the done signal goes out, so once every worker has signalled the only
/// sender left is the completion tracker's.
pub async fn run_worker(
    worker_id: usize,
    jobs: JobQueue,
    results: mpsc::Sender<FareEstimate>,
    done: DoneSignal,
    fare: FareFn,
) -> WorkerReport {
    let mut report = WorkerReport::default();
    tracing::debug!(worker_id, "Worker started");

    while let Some(batch) = jobs.next().await {
        report.processed += 1;

        match fare(&batch) {
            Ok(estimate) => {
                if results.send(estimate).await.is_ok() {
                    report.published += 1;
                } else {
                    if report.undelivered == 0 {
                        tracing::warn!(
                            worker_id,
                            ride_id = estimate.ride_id,
                            "Result channel closed, dropping estimates from here on"
                        );
                    }
                    report.undelivered += 1;
                }
            }
            Err(e) => {
                report.skipped += 1;
                tracing::warn!(
                    worker_id,
                    ride_id = ?batch.ride_id(),
                    pings = batch.len(),
                    error = %e,
                    "Failed to calculate fare, skipping ride"
                );
            }
        }
    }

    drop(results);
    done.send().await;

    tracing::debug!(
        worker_id,
        processed = report.processed,
        skipped = report.skipped,
        undelivered = report.undelivered,
        "Worker finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_fare(pings: &[RidePing]) -> Result<FareEstimate, FareError> {
        match pings.first() {
            Some(ping) if ping.ride_id >= 0 => {
                Ok(FareEstimate::new(ping.ride_id, ping.ride_id as f64 + 0.5))
            }
            first => Err(FareError::NotEnoughSegments {
                ride_id: first.map(|p| p.ride_id),
            }),
        }
    }

    fn batch(ride_id: i64) -> RideBatch {
        RideBatch::from(vec![RidePing::new(ride_id, 0.0, 0.0, 0)])
    }

    #[tokio::test]
    async fn test_worker_publishes_each_ride() {
        let (job_tx, job_rx) = mpsc::channel(10);
        let (result_tx, mut result_rx) = mpsc::channel(10);
        let (done_tx, mut done_rx) = mpsc::channel(1);

        for id in 0..3 {
            job_tx.send(batch(id)).await.unwrap();
        }
        drop(job_tx);

        let report = run_worker(
            7,
            JobQueue::new(job_rx),
            result_tx,
            DoneSignal::new(7, done_tx),
            stub_fare,
        )
        .await;

        assert_eq!(
            report,
            WorkerReport {
                processed: 3,
                published: 3,
                skipped: 0,
                undelivered: 0,
            }
        );

        let mut ids = Vec::new();
        while let Some(estimate) = result_rx.recv().await {
            ids.push(estimate.ride_id);
        }
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(done_rx.recv().await, Some(7));
        assert_eq!(done_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_failed_rides_do_not_stop_worker() {
        let (job_tx, job_rx) = mpsc::channel(10);
        let (result_tx, mut result_rx) = mpsc::channel(10);
        let (done_tx, mut done_rx) = mpsc::channel(1);

        job_tx.send(batch(1)).await.unwrap();
        job_tx.send(RideBatch::default()).await.unwrap();
        job_tx.send(batch(-1)).await.unwrap();
        job_tx.send(batch(2)).await.unwrap();
        drop(job_tx);

        let report = run_worker(
            0,
            JobQueue::new(job_rx),
            result_tx,
            DoneSignal::new(0, done_tx),
            stub_fare,
        )
        .await;

        assert_eq!(report.processed, 4);
        assert_eq!(report.published, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(result_rx.recv().await.map(|e| e.ride_id), Some(1));
        assert_eq!(result_rx.recv().await.map(|e| e.ride_id), Some(2));
        assert_eq!(result_rx.recv().await, None);
        assert_eq!(done_rx.recv().await, Some(0));
    }

    #[tokio::test]
    async fn test_closed_result_channel_keeps_draining_jobs() {
        let (job_tx, job_rx) = mpsc::channel(10);
        let (result_tx, result_rx) = mpsc::channel(10);
        let (done_tx, mut done_rx) = mpsc::channel(1);
        drop(result_rx);

        for id in 0..4 {
            job_tx.send(batch(id)).await.unwrap();
        }
        drop(job_tx);

        let report = run_worker(
            1,
            JobQueue::new(job_rx),
            result_tx,
            DoneSignal::new(1, done_tx),
            stub_fare,
        )
        .await;

        assert_eq!(report.processed, 4);
        assert_eq!(report.published, 0);
        assert_eq!(report.undelivered, 4);
        assert_eq!(done_rx.recv().await, Some(1));
    }

    #[tokio::test]
    async fn test_empty_queue_still_signals_done() {
        let (job_tx, job_rx) = mpsc::channel::<RideBatch>(1);
        let (result_tx, _result_rx) = mpsc::channel(1);
        let (done_tx, mut done_rx) = mpsc::channel(1);
        drop(job_tx);

        let report = run_worker(
            3,
            JobQueue::new(job_rx),
            result_tx,
            DoneSignal::new(3, done_tx),
            stub_fare,
        )
        .await;

        assert_eq!(report, WorkerReport::default());
        assert_eq!(done_rx.recv().await, Some(3));
    }

    #[tokio::test]
    async fn test_queue_hands_each_batch_out_once() {
        let (job_tx, job_rx) = mpsc::channel(4);
        let queue = JobQueue::new(job_rx);
        let other = queue.clone();

        job_tx.send(batch(1)).await.unwrap();
        job_tx.send(batch(2)).await.unwrap();
        drop(job_tx);

        assert_eq!(queue.next().await.and_then(|b| b.ride_id()), Some(1));
        assert_eq!(other.next().await.and_then(|b| b.ride_id()), Some(2));
        assert!(queue.next().await.is_none());
        assert!(other.next().await.is_none());
    }
}
