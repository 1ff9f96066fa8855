pub mod execution;
pub mod executor;

pub use execution::{RunId, SubmissionCompletion, SubmissionJob};
pub use executor::SubmissionExecutor;
