use crate::core::StepKey;
use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tracing::debug;

/// Validated output of one completed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, JsonValue>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes any serializable struct or map. Scalars and arrays are rejected.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(value).map_err(StoreError::Encode)? {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(StoreError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(JsonValue::Object(self.0.clone()))
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: JsonValue) {
        self.0.insert(name.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Records of completed steps for one wizard session.
#[derive(Debug, Default)]
pub struct WizardStore {
    records: HashMap<StepKey, Record>,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` under `key`, replacing any earlier record. The caller validates first.
    pub fn write(&mut self, key: impl Into<StepKey>, record: Record) {
        let key = key.into();
        let fields = record.len();
        let replaced = self.records.insert(key.clone(), record).is_some();
        debug!(step = %key, fields, replaced, "stored step record");
    }

    pub fn read(&self, key: &str) -> Result<&Record, StoreError> {
        self.records
            .get(key)
            .ok_or_else(|| StoreError::MissingPriorStep(key.into()))
    }

    pub fn read_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, StoreError> {
        self.read(key)?
            .decode()
            .map_err(|source| StoreError::Decode {
                key: key.into(),
                source,
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &StepKey> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn reset(&mut self) {
        let cleared = self.records.len();
        self.records.clear();
        debug!(cleared, "wizard store reset");
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, WizardStore};
    use crate::error::StoreError;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Student {
        registration: String,
        status: String,
    }

    fn student() -> Student {
        Student {
            registration: "2023001".to_string(),
            status: "ACTIVE".to_string(),
        }
    }

    #[test]
    fn reading_an_unwritten_key_is_a_missing_prior_step() {
        let store = WizardStore::new();
        let err = store.read("STUDENT_ID").expect_err("nothing written");
        assert!(matches!(err, StoreError::MissingPriorStep(ref key) if key == "STUDENT_ID"));
    }

    #[test]
    fn write_then_read_returns_the_same_record() {
        let mut store = WizardStore::new();
        let record = Record::from_serializable(&student()).expect("record");
        store.write("STUDENT_ID", record.clone());

        assert_eq!(store.read("STUDENT_ID").expect("read"), &record);
        assert_eq!(
            store.read_as::<Student>("STUDENT_ID").expect("decode"),
            student()
        );
    }

    #[test]
    fn replaying_the_same_write_is_idempotent() {
        let mut store = WizardStore::new();
        let record = Record::from_serializable(&student()).expect("record");
        store.write("STUDENT_ID", record.clone());
        store.write("STUDENT_ID", record.clone());

        assert_eq!(store.len(), 1);
        assert_eq!(store.read("STUDENT_ID").expect("read"), &record);
    }

    #[test]
    fn later_writes_overwrite() {
        let mut store = WizardStore::new();
        store.write("STEP", Record::from_serializable(&json!({"a": 1})).expect("record"));
        store.write("STEP", Record::from_serializable(&json!({"a": 2})).expect("record"));
        assert_eq!(store.read("STEP").expect("read").get("a"), Some(&json!(2)));
    }

    #[test]
    fn decode_mismatch_is_reported_with_key() {
        let mut store = WizardStore::new();
        store.write("STEP", Record::from_serializable(&json!({"a": 1})).expect("record"));
        let err = store.read_as::<Student>("STEP").expect_err("shape mismatch");
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "STEP"));
    }

    #[test]
    fn only_objects_become_records() {
        let err = Record::from_serializable(&json!([1, 2])).expect_err("array");
        assert!(matches!(err, StoreError::NotAnObject("an array")));
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = WizardStore::new();
        store.write("A", Record::new());
        store.write("B", Record::new());
        store.reset();
        assert!(store.is_empty());
        assert!(store.read("A").is_err());
    }
}
