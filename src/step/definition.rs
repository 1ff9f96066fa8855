use crate::core::StepKey;
use crate::core::schema::FieldSchema;
use crate::error::SubmissionError;
use crate::state::form::{FormState, Snapshot};
use crate::state::store::Record;
use crate::step::collaborators::PayloadShaper;
use crate::validation::ValidatorRegistry;
use std::fmt;
use std::sync::Arc;

/// Static description of a step: its fields, their validators and its place in the flow.
#[derive(Clone)]
pub struct StepDefinition {
    key: StepKey,
    next: StepKey,
    requires: Option<StepKey>,
    schema: Arc<FieldSchema>,
    validators: Arc<ValidatorRegistry>,
    shaper: Option<PayloadShaper>,
}

impl StepDefinition {
    pub fn new(
        key: impl Into<StepKey>,
        next: impl Into<StepKey>,
        schema: FieldSchema,
        validators: ValidatorRegistry,
    ) -> Self {
        Self {
            key: key.into(),
            next: next.into(),
            requires: None,
            schema: Arc::new(schema),
            validators: Arc::new(validators),
            shaper: None,
        }
    }

    /// Declares the earlier step whose record this step reads on submit.
    pub fn requires(mut self, prior: impl Into<StepKey>) -> Self {
        self.requires = Some(prior.into());
        self
    }

    /// Replaces the generic submission body with one built from the prior record
    /// and this step's snapshot.
    pub fn payload(
        mut self,
        shaper: impl Fn(Option<&Record>, &Snapshot) -> Result<serde_json::Value, SubmissionError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.shaper = Some(Arc::new(shaper));
        self
    }

    pub fn key(&self) -> &StepKey {
        &self.key
    }

    pub fn next(&self) -> &StepKey {
        &self.next
    }

    pub fn prior(&self) -> Option<&StepKey> {
        self.requires.as_ref()
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn payload_shaper(&self) -> Option<&PayloadShaper> {
        self.shaper.as_ref()
    }

    pub fn new_form(&self) -> FormState {
        FormState::new(Arc::clone(&self.schema), Arc::clone(&self.validators))
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("key", &self.key)
            .field("next", &self.next)
            .field("requires", &self.requires)
            .field("fields", &self.schema.len())
            .field("shaped", &self.shaper.is_some())
            .finish()
    }
}
