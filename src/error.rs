//! Error types shared across the engine.

use crate::core::schema::FieldKind;
use crate::core::{FieldId, StepKey};
use crate::step::StepPhase;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a step's form state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field `{0}`")]
    UnknownField(FieldId),

    #[error("field `{0}` is declared twice")]
    DuplicateField(FieldId),

    #[error("field `{field}` rejected input: {reason}")]
    Parse { field: FieldId, reason: String },

    #[error("field `{field}` holds {kind:?} values")]
    TypeMismatch { field: FieldId, kind: FieldKind },
}

/// Errors raised by the wizard store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The step was reached before the step owning `0` wrote its record.
    #[error("no record stored for step `{0}`")]
    MissingPriorStep(StepKey),

    #[error("record for step `{key}` has an unexpected shape: {source}")]
    Decode {
        key: StepKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("value cannot be stored as a record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Errors that stop a step controller.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("step `{step}` cannot be edited while {phase}")]
    NotEditable { step: StepKey, phase: StepPhase },

    #[error("step `{found}` mounted out of order; the active step is {expected:?}")]
    OutOfOrder {
        expected: Option<StepKey>,
        found: StepKey,
    },

    #[error("step `{step}` leads to `{declared}` but the flow continues with `{configured}`")]
    NextMismatch {
        step: StepKey,
        declared: StepKey,
        configured: StepKey,
    },
}

impl FlowError {
    pub fn is_missing_prior_step(&self) -> bool {
        matches!(self, Self::Store(StoreError::MissingPriorStep(_)))
    }
}

/// Errors reported by a submission collaborator. Logged, never surfaced to the user.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("backend rejected submission: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("payload could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("payload is missing the `{0}` record")]
    MissingRecord(&'static str),

    #[error("submission worker panicked")]
    WorkerPanicked,
}

/// Errors raised while loading a wizard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config lists no steps")]
    EmptyFlow,

    #[error("step `{0}` appears more than once in the flow")]
    DuplicateStep(StepKey),

    #[error("unknown log level `{0}`")]
    InvalidLevel(String),
}
