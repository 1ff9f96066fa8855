use crate::config::WizardConfig;
use crate::core::StepKey;
use crate::error::FlowError;
use crate::state::flow::Flow;
use crate::state::store::{Record, WizardStore};
use crate::step::collaborators::{Navigator, Submitter};
use crate::step::controller::{StepContext, StepController, SubmitOutcome};
use crate::step::definition::StepDefinition;
use crate::task::{SubmissionCompletion, SubmissionExecutor};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One run of the wizard, from the first step to completion or abandonment.
///
/// Owns the records of completed steps and is passed explicitly to every step.
pub struct WizardSession {
    store: WizardStore,
    flow: Flow,
    executor: SubmissionExecutor,
    drain_timeout: Duration,
}

impl WizardSession {
    pub fn begin(config: &WizardConfig) -> Self {
        info!(steps = config.steps.len(), "wizard session started");
        Self {
            store: WizardStore::new(),
            flow: Flow::new(config.steps.clone()),
            executor: SubmissionExecutor::new(),
            drain_timeout: config.drain_timeout(),
        }
    }

    pub fn store(&self) -> &WizardStore {
        &self.store
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Mounts the active step. Mounting any other step, or one whose declared next
    /// step differs from the configured flow, is a navigation bug.
    pub fn mount(
        &self,
        definition: StepDefinition,
        submitter: Arc<dyn Submitter>,
    ) -> Result<StepController, FlowError> {
        let expected = self.flow.current_step();
        if expected != Some(definition.key()) {
            return Err(FlowError::OutOfOrder {
                expected: expected.cloned(),
                found: definition.key().clone(),
            });
        }
        match self.flow.next_step() {
            Some(configured) if configured != definition.next() => {
                return Err(FlowError::NextMismatch {
                    step: definition.key().clone(),
                    declared: definition.next().clone(),
                    configured: configured.clone(),
                });
            }
            _ => {}
        }
        Ok(StepController::new(definition, submitter))
    }

    /// Records the output of a step handled outside a `StepController`, such as
    /// a lookup answered by the backend, and moves past it.
    pub fn complete_step(&mut self, key: &str, record: Record) -> Result<(), FlowError> {
        let current = self.flow.current_step();
        if current.map(StepKey::as_str) != Some(key) {
            return Err(FlowError::OutOfOrder {
                expected: current.cloned(),
                found: key.into(),
            });
        }
        self.store.write(key, record);
        if !self.flow.advance() {
            self.flow.complete_current();
        }
        Ok(())
    }

    pub fn submit(&mut self, controller: &mut StepController) -> Result<SubmitOutcome, FlowError> {
        self.submit_inner(controller, None)
    }

    /// Like [`submit`](Self::submit), also forwarding the advance signal to the screen router.
    pub fn submit_with(
        &mut self,
        controller: &mut StepController,
        router: &mut dyn Navigator,
    ) -> Result<SubmitOutcome, FlowError> {
        self.submit_inner(controller, Some(router))
    }

    fn submit_inner(
        &mut self,
        controller: &mut StepController,
        router: Option<&mut dyn Navigator>,
    ) -> Result<SubmitOutcome, FlowError> {
        let mut navigator = SessionNavigator {
            flow: &mut self.flow,
            router,
        };
        let mut ctx = StepContext {
            store: &mut self.store,
            executor: &mut self.executor,
            navigator: &mut navigator,
        };
        controller.submit(&mut ctx)
    }

    /// Finished submissions since the last poll. Failures were already logged.
    pub fn poll_submissions(&mut self) -> Vec<SubmissionCompletion> {
        self.executor.drain_ready()
    }

    pub fn pending_submissions(&self) -> usize {
        self.executor.in_flight()
    }

    /// Ends the wizard successfully and clears every stored record.
    pub fn complete(&mut self) -> Vec<SubmissionCompletion> {
        let completions = self.executor.wait_idle(self.drain_timeout);
        self.flow.complete_current();
        info!(records = self.store.len(), "wizard session completed");
        self.reset();
        completions
    }

    /// Ends the wizard early and clears every stored record.
    pub fn abandon(&mut self) -> Vec<SubmissionCompletion> {
        let completions = self.executor.wait_idle(self.drain_timeout);
        self.flow.cancel_current();
        info!(
            step = ?self.flow.current_step(),
            records = self.store.len(),
            "wizard session abandoned"
        );
        self.reset();
        completions
    }

    fn reset(&mut self) {
        self.store.reset();
        self.flow.reset();
    }
}

struct SessionNavigator<'a, 'r> {
    flow: &'a mut Flow,
    router: Option<&'a mut (dyn Navigator + 'r)>,
}

impl Navigator for SessionNavigator<'_, '_> {
    fn advance(&mut self, next: &StepKey) {
        if !self.flow.advance_to(next.as_str()) {
            warn!(next = %next, current = ?self.flow.current_step(), "advance target is not the next step");
        }
        if let Some(router) = self.router.as_mut() {
            router.advance(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WizardSession;
    use crate::config::WizardConfig;
    use crate::core::StepKey;
    use crate::core::schema::{FieldSchema, FieldSpec};
    use crate::core::value::Value;
    use crate::error::{FlowError, SubmissionError};
    use crate::state::flow::StepStatus;
    use crate::state::store::Record;
    use crate::step::collaborators::{SubmissionPayload, Submitter};
    use crate::step::controller::SubmitOutcome;
    use crate::step::definition::StepDefinition;
    use crate::validation::ValidatorRegistry;
    use crate::validation::validators::required;
    use serde_json::json;
    use std::sync::Arc;

    struct AlwaysFails;

    impl Submitter for AlwaysFails {
        fn submit(&self, _payload: &SubmissionPayload) -> Result<(), SubmissionError> {
            Err(SubmissionError::Rejected("service unavailable".to_string()))
        }
    }

    fn config() -> WizardConfig {
        WizardConfig::new(vec![
            StepKey::new("STUDENT_ID"),
            StepKey::new("PERSONAL_DETAILS"),
            StepKey::new("ADDRESS"),
        ])
    }

    fn personal_details() -> StepDefinition {
        let schema = FieldSchema::new()
            .field("name", FieldSpec::text("Nome"))
            .expect("schema");
        let validators = ValidatorRegistry::new().with("name", required("name missing"));
        StepDefinition::new("PERSONAL_DETAILS", "ADDRESS", schema, validators).requires("STUDENT_ID")
    }

    fn student_record() -> Record {
        Record::from_serializable(&json!({"registration": "2023001"})).expect("record")
    }

    #[test]
    fn mounting_out_of_order_is_refused() {
        let session = WizardSession::begin(&config());
        let err = session
            .mount(personal_details(), Arc::new(AlwaysFails))
            .err()
            .expect("out of order");
        assert!(matches!(
            err,
            FlowError::OutOfOrder { ref expected, .. }
                if expected.as_ref().is_some_and(|key| key == "STUDENT_ID")
        ));
    }

    #[test]
    fn submit_moves_the_flow_and_notifies_the_router() {
        let mut session = WizardSession::begin(&config());
        session
            .complete_step("STUDENT_ID", student_record())
            .expect("student id");
        assert_eq!(session.flow().progress(), (2, 3));

        let mut controller = session
            .mount(personal_details(), Arc::new(AlwaysFails))
            .expect("mount");
        controller
            .form_mut()
            .expect("editable")
            .set_value("name", Value::text("Ana"))
            .expect("set");

        let mut routed = Vec::new();
        let mut router = |next: &StepKey| routed.push(next.clone());
        let outcome = session
            .submit_with(&mut controller, &mut router)
            .expect("submit");

        assert!(matches!(outcome, SubmitOutcome::Advanced { .. }));
        assert_eq!(routed, vec![StepKey::new("ADDRESS")]);
        assert_eq!(
            session.flow().current_step().map(StepKey::as_str),
            Some("ADDRESS")
        );
        assert_eq!(session.flow().status_at(1), StepStatus::Done);
        assert!(session.store().contains("PERSONAL_DETAILS"));

        let completions = session.complete();
        assert_eq!(completions.len(), 1);
        assert!(!completions[0].is_success());
    }

    #[test]
    fn complete_and_abandon_reset_the_session() {
        let mut session = WizardSession::begin(&config());
        session
            .complete_step("STUDENT_ID", student_record())
            .expect("student id");
        session.abandon();

        assert!(session.store().is_empty());
        assert_eq!(session.flow().current_index(), 0);
        assert_eq!(session.flow().current_status(), StepStatus::Active);
        assert_eq!(session.pending_submissions(), 0);
    }

    #[test]
    fn mounting_a_step_that_leads_elsewhere_is_refused() {
        let mut session = WizardSession::begin(&config());
        session
            .complete_step("STUDENT_ID", student_record())
            .expect("student id");

        let schema = FieldSchema::new()
            .field("name", FieldSpec::text("Nome"))
            .expect("schema");
        let detour = StepDefinition::new(
            "PERSONAL_DETAILS",
            "PAYMENT",
            schema,
            ValidatorRegistry::new(),
        );
        let err = session
            .mount(detour, Arc::new(AlwaysFails))
            .err()
            .expect("mismatched next step");

        assert!(matches!(
            err,
            FlowError::NextMismatch { ref declared, ref configured, .. }
                if declared == "PAYMENT" && configured == "ADDRESS"
        ));
    }

    #[test]
    fn complete_step_rejects_skipping_ahead() {
        let mut session = WizardSession::begin(&config());
        let err = session
            .complete_step("ADDRESS", Record::new())
            .expect_err("skip");
        assert!(matches!(err, FlowError::OutOfOrder { .. }));
        assert!(session.store().is_empty());
    }
}
