pub mod collaborators;
pub mod controller;
pub mod definition;

use std::fmt;

pub use collaborators::{Navigator, PayloadShaper, SubmissionPayload, Submitter};
pub use controller::{StepContext, StepController, SubmitOutcome};
pub use definition::StepDefinition;

/// Lifecycle of one mounted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Editing,
    Validating,
    Submitting,
    /// Terminal: the record was stored and navigation signalled.
    Advanced,
    /// Terminal: a prerequisite step never completed.
    Faulted,
}

impl StepPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Advanced | Self::Faulted)
    }
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Editing => "editing",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Advanced => "advanced",
            Self::Faulted => "faulted",
        })
    }
}
