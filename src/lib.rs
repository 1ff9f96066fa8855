pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod session;
pub mod signup;
pub mod state;
pub mod step;
pub mod task;
pub mod validation;

pub use crate::core::schema;
pub use crate::core::value;
pub use crate::core::{FieldId, StepKey};
pub use crate::error::{ConfigError, FlowError, FormError, StoreError, SubmissionError};
pub use crate::session::WizardSession;
pub use crate::state::flow;
pub use crate::state::form;
pub use crate::state::store;
pub use crate::validation::validators;
