use crate::core::{FieldId, StepKey};
use crate::error::FlowError;
use crate::state::form::FormState;
use crate::state::store::{Record, WizardStore};
use crate::step::StepPhase;
use crate::step::collaborators::{Navigator, Submitter};
use crate::step::definition::StepDefinition;
use crate::task::{RunId, SubmissionExecutor, SubmissionJob};
use std::sync::Arc;
use tracing::{debug, error, info, info_span};

/// Session resources a controller needs while submitting.
pub struct StepContext<'a> {
    pub store: &'a mut WizardStore,
    pub executor: &'a mut SubmissionExecutor,
    pub navigator: &'a mut dyn Navigator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the step is editable again and errors are shown.
    Rejected { errors: Vec<(FieldId, String)> },
    /// Record stored, submission dispatched, navigation signalled.
    Advanced { next: StepKey, run_id: RunId },
    /// Submit arrived outside `Editing` and was dropped.
    Ignored { phase: StepPhase },
}

/// Drives one mounted step from editing to advancing.
pub struct StepController {
    definition: StepDefinition,
    form: FormState,
    phase: StepPhase,
    submitter: Arc<dyn Submitter>,
}

impl StepController {
    pub fn new(definition: StepDefinition, submitter: Arc<dyn Submitter>) -> Self {
        let form = definition.new_form();
        Self {
            definition,
            form,
            phase: StepPhase::Editing,
            submitter,
        }
    }

    pub fn key(&self) -> &StepKey {
        self.definition.key()
    }

    pub fn definition(&self) -> &StepDefinition {
        &self.definition
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Mutable form access; refused once the step left `Editing`.
    pub fn form_mut(&mut self) -> Result<&mut FormState, FlowError> {
        if self.phase != StepPhase::Editing {
            return Err(FlowError::NotEditable {
                step: self.definition.key().clone(),
                phase: self.phase,
            });
        }
        Ok(&mut self.form)
    }

    /// Handles the user's submit action.
    ///
    /// Accepted only while `Editing`; any other phase yields `Ignored`, so repeated
    /// presses never issue a second submission. The submission runs detached and its
    /// outcome never blocks advancing.
    pub fn submit(&mut self, ctx: &mut StepContext<'_>) -> Result<SubmitOutcome, FlowError> {
        let span = info_span!("step_submit", step = %self.definition.key());
        let _enter = span.enter();

        if self.phase != StepPhase::Editing {
            debug!(phase = %self.phase, "submit ignored");
            return Ok(SubmitOutcome::Ignored { phase: self.phase });
        }

        self.phase = StepPhase::Validating;
        if !self.form.apply_validations() {
            self.phase = StepPhase::Editing;
            let errors = self.form.errors();
            info!(invalid = errors.len(), "submit rejected by validation");
            return Ok(SubmitOutcome::Rejected { errors });
        }

        self.phase = StepPhase::Submitting;
        let prior = match self.read_prior(ctx.store) {
            Ok(prior) => prior,
            Err(err) => {
                self.phase = StepPhase::Faulted;
                error!(error = %err, "prerequisite step missing");
                return Err(err);
            }
        };

        let snapshot = self.form.snapshot();
        let record = match Record::from_serializable(&snapshot) {
            Ok(record) => record,
            Err(err) => {
                self.phase = StepPhase::Faulted;
                error!(error = %err, "snapshot could not be stored");
                return Err(err.into());
            }
        };

        let run_id = ctx.executor.spawn(SubmissionJob {
            step: self.definition.key().clone(),
            prior,
            current: snapshot,
            shaper: self.definition.payload_shaper().cloned(),
            submitter: Arc::clone(&self.submitter),
        });

        ctx.store.write(self.definition.key().clone(), record);
        self.phase = StepPhase::Advanced;

        let next = self.definition.next().clone();
        ctx.navigator.advance(&next);
        info!(next = %next, run = %run_id, "step advanced");

        Ok(SubmitOutcome::Advanced { next, run_id })
    }

    fn read_prior(&self, store: &WizardStore) -> Result<Option<Record>, FlowError> {
        match self.definition.prior() {
            Some(key) => Ok(Some(store.read(key.as_str())?.clone())),
            None => Ok(None),
        }
    }
}
