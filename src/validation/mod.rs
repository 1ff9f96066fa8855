pub mod cpf;
pub mod validators;

use crate::core::FieldId;
use crate::core::value::Value;
use std::collections::HashMap;

pub use validators::{ValidationError, Validator};

/// One validator per field, fixed when the step is defined.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<FieldId, Validator>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `validator` for `field`, replacing any earlier one.
    pub fn register(&mut self, field: impl Into<FieldId>, validator: Validator) {
        self.validators.insert(field.into(), validator);
    }

    pub fn with(mut self, field: impl Into<FieldId>, validator: Validator) -> Self {
        self.register(field, validator);
        self
    }

    /// `None` means valid; fields without a validator are always valid.
    pub fn validate(&self, field: &str, value: &Value) -> Option<ValidationError> {
        self.validators
            .get(field)
            .and_then(|validator| validator(value).err())
    }

    pub fn has_validator(&self, field: &str) -> bool {
        self.validators.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldId> {
        self.validators.keys()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<&str> = self.validators.keys().map(FieldId::as_str).collect();
        fields.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("fields", &fields)
            .finish()
    }
}
