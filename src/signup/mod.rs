//! Student sign-up wizard.

pub mod gender;
pub mod personal_details;

use crate::core::StepKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const STUDENT_ID: &str = "STUDENT_ID";
pub const PERSONAL_DETAILS: &str = "PERSONAL_DETAILS";
pub const ADDRESS: &str = "ADDRESS";

pub fn flow_steps() -> Vec<StepKey> {
    vec![
        StepKey::new(STUDENT_ID),
        StepKey::new(PERSONAL_DETAILS),
        StepKey::new(ADDRESS),
    ]
}

/// Enrollment data confirmed by the backend on the student id step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdRecord {
    pub birth_date: NaiveDate,
    pub cpf: String,
    pub email: String,
    pub registration: String,
    pub status: String,
}
