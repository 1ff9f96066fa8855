use chrono::NaiveDate;
use serde::Serialize;

/// Typed value held by a form field. Validators see this, never the display string.
///
/// Serialized untagged, so the wire form alone cannot tell the variants apart;
/// read stored values back through `FieldKind::decode`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Date(NaiveDate),
    Text(String),
    Choice(String),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    /// `None`, blank text and blank choices count as empty. Dates never do.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(v) | Self::Choice(v) => v.trim().is_empty(),
            Self::Date(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) | Self::Choice(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}
