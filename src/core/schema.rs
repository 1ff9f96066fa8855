use crate::core::FieldId;
use crate::core::value::Value;
use crate::error::FormError;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
// Both accepted formats render to ten characters.
const DATE_INPUT_LEN: usize = 10;

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Date,
    Choice,
    Phone,
    Identifier,
}

impl FieldKind {
    /// Converts display input into the typed value for this kind.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Value::None);
        }

        match self {
            Self::Text => Ok(Value::text(raw)),
            Self::Choice => Ok(Value::choice(trimmed)),
            Self::Phone | Self::Identifier => {
                let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    Err(format!("`{trimmed}` contains no digits"))
                } else {
                    Ok(Value::text(digits))
                }
            }
            Self::Date if trimmed.len() != DATE_INPUT_LEN => {
                Err(format!("`{trimmed}` is not a complete date"))
            }
            Self::Date => NaiveDate::parse_from_str(trimmed, DISPLAY_DATE_FORMAT)
                .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT))
                .map(Value::Date)
                .map_err(|err| format!("`{trimmed}` is not a date: {err}")),
        }
    }

    /// Whether `value` has the variant this kind stores. `Value::None` fits every kind.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::None)
                | (Self::Date, Value::Date(_))
                | (Self::Choice, Value::Choice(_))
                | (Self::Text | Self::Phone | Self::Identifier, Value::Text(_))
        )
    }

    /// Reads a stored JSON value back into the typed value for this kind.
    pub fn decode(self, stored: &serde_json::Value) -> Result<Value, String> {
        let raw = match stored {
            serde_json::Value::Null => return Ok(Value::None),
            serde_json::Value::String(raw) => raw.as_str(),
            other => return Err(format!("expected a string, found `{other}`")),
        };

        match self {
            Self::Date => NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT)
                .map(Value::Date)
                .map_err(|err| format!("`{raw}` is not a date: {err}")),
            Self::Choice => Ok(Value::choice(raw)),
            Self::Text | Self::Phone | Self::Identifier => Ok(Value::text(raw)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyboard {
    #[default]
    Default,
    Numeric,
    Email,
    Phone,
}

/// Display mask tag. Renderers own the formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mask {
    Cpf,
    DateDdMmYyyy,
    Phone,
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Presentation settings handed to input and dropdown renderers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldDisplay {
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub keyboard: Keyboard,
    #[serde(default)]
    pub mask: Option<Mask>,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub display: FieldDisplay,
}

impl FieldSpec {
    pub fn new(kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            display: FieldDisplay {
                label: label.into(),
                ..FieldDisplay::default()
            },
        }
    }

    pub fn text(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Text, label)
    }

    pub fn date(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Date, label)
    }

    pub fn phone(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Phone, label)
    }

    pub fn identifier(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Identifier, label)
    }

    pub fn choice(label: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        let mut spec = Self::new(FieldKind::Choice, label);
        spec.display.options = options;
        spec
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.display.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.display.keyboard = keyboard;
        self
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.display.mask = Some(mask);
        self
    }
}

/// Ordered field declarations of one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    fields: IndexMap<FieldId, FieldSpec>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, id: impl Into<FieldId>, spec: FieldSpec) -> Result<Self, FormError> {
        self.insert(id, spec)?;
        Ok(self)
    }

    pub fn insert(&mut self, id: impl Into<FieldId>, spec: FieldSpec) -> Result<(), FormError> {
        let id = id.into();
        if self.fields.contains_key(&id) {
            return Err(FormError::DuplicateField(id));
        }
        self.fields.insert(id, spec);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &FieldSpec)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
