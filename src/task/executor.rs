use crate::task::execution::{RunId, SubmissionCompletion, SubmissionJob, execute_job};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Runs submissions on detached worker threads. Outcomes are only logged.
pub struct SubmissionExecutor {
    completion_tx: Sender<SubmissionCompletion>,
    completion_rx: Receiver<SubmissionCompletion>,
    next_run_id: u64,
    in_flight: usize,
}

impl SubmissionExecutor {
    pub fn new() -> Self {
        let (completion_tx, completion_rx) = mpsc::channel::<SubmissionCompletion>();
        Self {
            completion_tx,
            completion_rx,
            next_run_id: 0,
            in_flight: 0,
        }
    }

    pub fn spawn(&mut self, job: SubmissionJob) -> RunId {
        self.next_run_id += 1;
        let run_id = RunId(self.next_run_id);
        self.in_flight += 1;
        debug!(step = %job.step, run = %run_id, "submission dispatched");

        let completion_tx = self.completion_tx.clone();
        std::thread::spawn(move || {
            let completion = execute_job(job, run_id);
            let _ = completion_tx.send(completion);
        });
        run_id
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Collects finished submissions without blocking.
    pub fn drain_ready(&mut self) -> Vec<SubmissionCompletion> {
        let mut out = Vec::<SubmissionCompletion>::new();
        loop {
            match self.completion_rx.try_recv() {
                Ok(completion) => out.push(self.report(completion)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Blocks until every dispatched submission reported or `timeout` elapsed.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<SubmissionCompletion> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::<SubmissionCompletion>::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completion_rx.recv_timeout(remaining) {
                Ok(completion) => out.push(self.report(completion)),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    warn!(
                        pending = self.in_flight,
                        timeout_ms = timeout.as_millis() as u64,
                        "gave up waiting for submissions"
                    );
                    break;
                }
            }
        }
        out
    }

    fn report(&mut self, completion: SubmissionCompletion) -> SubmissionCompletion {
        self.in_flight = self.in_flight.saturating_sub(1);
        let elapsed_ms = completion.elapsed.as_millis() as u64;
        match &completion.outcome {
            Ok(()) => debug!(
                step = %completion.step,
                run = %completion.run_id,
                elapsed_ms,
                "submission succeeded"
            ),
            Err(err) => error!(
                step = %completion.step,
                run = %completion.run_id,
                elapsed_ms,
                error = %err,
                "submission failed"
            ),
        }
        completion
    }
}

impl Default for SubmissionExecutor {
    fn default() -> Self {
        Self::new()
    }
}
