use crate::core::StepKey;
use crate::error::SubmissionError;
use crate::state::form::Snapshot;
use crate::state::store::Record;
use serde::Serialize;
use std::sync::Arc;

/// Builds the request body a step sends in place of the generic one.
pub type PayloadShaper = Arc<
    dyn Fn(Option<&Record>, &Snapshot) -> Result<serde_json::Value, SubmissionError> + Send + Sync,
>;

/// Data sent to the backend when a step is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub prior: Option<Record>,
    pub current: Snapshot,
    /// Request body handed to the backend.
    pub body: serde_json::Value,
}

#[derive(Serialize)]
struct GenericBody<'a> {
    #[serde(rename = "priorStepRecord")]
    prior: Option<&'a Record>,
    #[serde(rename = "thisStepRecord")]
    current: &'a Snapshot,
}

impl SubmissionPayload {
    /// Payload with the `{ priorStepRecord, thisStepRecord }` body.
    pub fn new(prior: Option<Record>, current: Snapshot) -> Result<Self, SubmissionError> {
        let body = serde_json::to_value(GenericBody {
            prior: prior.as_ref(),
            current: &current,
        })
        .map_err(SubmissionError::Encode)?;
        Ok(Self {
            prior,
            current,
            body,
        })
    }

    /// Payload whose body comes from the step's own shaper.
    pub fn shaped(
        prior: Option<Record>,
        current: Snapshot,
        shaper: &PayloadShaper,
    ) -> Result<Self, SubmissionError> {
        let body = (**shaper)(prior.as_ref(), &current)?;
        Ok(Self {
            prior,
            current,
            body,
        })
    }
}

/// Backend call made once per accepted submit. Runs off the UI thread.
pub trait Submitter: Send + Sync + 'static {
    fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionError>;
}

/// Screen router. Called once per accepted submit.
pub trait Navigator {
    fn advance(&mut self, next: &StepKey);
}

impl<F> Navigator for F
where
    F: FnMut(&StepKey),
{
    fn advance(&mut self, next: &StepKey) {
        self(next)
    }
}
