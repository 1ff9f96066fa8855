use crate::core::StepKey;
use crate::error::SubmissionError;
use crate::state::form::Snapshot;
use crate::state::store::Record;
use crate::step::collaborators::{PayloadShaper, SubmissionPayload, Submitter};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct SubmissionJob {
    pub step: StepKey,
    pub prior: Option<Record>,
    pub current: Snapshot,
    pub shaper: Option<PayloadShaper>,
    pub submitter: Arc<dyn Submitter>,
}

impl SubmissionJob {
    fn payload(self) -> Result<(SubmissionPayload, Arc<dyn Submitter>), SubmissionError> {
        let payload = match &self.shaper {
            Some(shaper) => SubmissionPayload::shaped(self.prior, self.current, shaper)?,
            None => SubmissionPayload::new(self.prior, self.current)?,
        };
        Ok((payload, self.submitter))
    }
}

#[derive(Debug)]
pub struct SubmissionCompletion {
    pub step: StepKey,
    pub run_id: RunId,
    pub elapsed: Duration,
    pub outcome: Result<(), SubmissionError>,
}

impl SubmissionCompletion {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub fn execute_job(job: SubmissionJob, run_id: RunId) -> SubmissionCompletion {
    let step = job.step.clone();
    let started_at = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let (payload, submitter) = job.payload()?;
        submitter.submit(&payload)
    }))
    .unwrap_or(Err(SubmissionError::WorkerPanicked));

    SubmissionCompletion {
        step,
        run_id,
        elapsed: started_at.elapsed(),
        outcome,
    }
}
