use tokio::sync::mpsc;

use crate::entities::FareEstimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Waiting { remaining: usize },
    Closed,
}

impl TrackerState {
    pub fn new(workers: usize) -> Self {
        match workers {
            0 => TrackerState::Closed,
            remaining => TrackerState::Waiting { remaining },
        }
    }

    /// Account for one finished worker.
    pub fn on_done(self) -> Self {
        match self {
            TrackerState::Waiting { remaining } if remaining > 1 => TrackerState::Waiting {
                remaining: remaining - 1,
            },
            _ => TrackerState::Closed,
        }
    }
}

/// Counts worker done-signals and closes the downstream channels after the last one.
///
/// The tracker owns the done receiver and the final result sender. Closing
/// consumes the tracker, so each channel is released exactly once.
#[derive(Debug)]
pub struct CompletionTracker {
    state: TrackerState,
    done: mpsc::Receiver<usize>,
    results: mpsc::Sender<FareEstimate>,
}

impl CompletionTracker {
    pub fn new(
        workers: usize,
        done: mpsc::Receiver<usize>,
        results: mpsc::Sender<FareEstimate>,
    ) -> Self {
        Self {
            state: TrackerState::new(workers),
            done,
            results,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Wait for every worker, then close. Returns how many signals were seen.
    pub async fn run(mut self) -> usize {
        let mut received = 0;

        while let TrackerState::Waiting { remaining } = self.state {
            match self.done.recv().await {
                Some(worker_id) => {
                    received += 1;
                    self.state = self.state.on_done();
                    tracing::debug!(worker_id, remaining = remaining - 1, "Worker done");
                }
                None => {
                    // every signal sender was dropped without sending, i.e. a worker died
                    tracing::warn!(remaining, "Done channel closed before all workers finished");
                    break;
                }
            }
        }

        self.close();
        received
    }

    fn close(self) {
        let CompletionTracker {
            mut done, results, ..
        } = self;

        done.close();
        drop(done);
        drop(results);

        tracing::info!("All workers finished, result channel closed");
    }
}
