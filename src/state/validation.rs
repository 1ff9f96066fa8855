use crate::core::FieldId;
use std::collections::HashMap;

/// Last computed error message per field, backing inline error display.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationState {
    entries: HashMap<FieldId, String>,
}

impl ValidationState {
    pub fn set_error(&mut self, id: impl Into<FieldId>, error: impl Into<String>) {
        self.entries.insert(id.into(), error.into());
    }

    pub fn clear_error(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }
}
