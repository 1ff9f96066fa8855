use crate::core::FieldId;
use crate::core::schema::{FieldDisplay, FieldKind, FieldSchema};
use crate::core::value::Value;
use crate::error::FormError;
use crate::state::store::Record;
use crate::state::validation::ValidationState;
use crate::validation::ValidatorRegistry;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub type FieldObserver = Box<dyn FnMut(&FieldId, &Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Field name to value mapping captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot(IndexMap<FieldId, Value>);

impl Snapshot {
    /// Rebuilds a snapshot from a stored record, typing each value by its schema kind.
    /// Fields absent from the record read as `Value::None`.
    pub fn decode(schema: &FieldSchema, record: &Record) -> Result<Self, FormError> {
        if let Some(unknown) = record.as_map().keys().find(|key| !schema.contains(key)) {
            return Err(FormError::UnknownField(unknown.as_str().into()));
        }

        let mut values = IndexMap::with_capacity(schema.len());
        for (id, spec) in schema.iter() {
            let value = match record.get(id.as_str()) {
                Some(stored) => spec.kind.decode(stored).map_err(|reason| FormError::Parse {
                    field: id.clone(),
                    reason,
                })?,
                None => Value::None,
            };
            values.insert(id.clone(), value);
        }
        Ok(Self(values))
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Handle a renderer uses to read and write one field.
///
/// Registering the same field twice yields equal bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    id: FieldId,
    kind: FieldKind,
    display: FieldDisplay,
}

impl FieldBinding {
    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn display(&self) -> &FieldDisplay {
        &self.display
    }

    pub fn value<'a>(&self, form: &'a FormState) -> &'a Value {
        form.watch(self.id.as_str())
    }

    pub fn error<'a>(&self, form: &'a FormState) -> Option<&'a str> {
        form.error(self.id.as_str())
    }

    pub fn set_value(&self, form: &mut FormState, value: Value) -> Result<(), FormError> {
        form.set_value(self.id.as_str(), value)
    }

    pub fn set_input(&self, form: &mut FormState, raw: &str) -> Result<(), FormError> {
        form.set_input(self.id.as_str(), raw)
    }
}

/// Values and errors of one step, alive while its screen is mounted.
pub struct FormState {
    schema: Arc<FieldSchema>,
    validators: Arc<ValidatorRegistry>,
    values: IndexMap<FieldId, Value>,
    validation: ValidationState,
    observers: Vec<(SubscriptionId, FieldId, FieldObserver)>,
    next_subscription: u64,
    dirty: bool,
}

impl FormState {
    pub fn new(schema: Arc<FieldSchema>, validators: Arc<ValidatorRegistry>) -> Self {
        let values = schema.ids().map(|id| (id.clone(), Value::None)).collect();
        Self {
            schema,
            validators,
            values,
            validation: ValidationState::default(),
            observers: Vec::new(),
            next_subscription: 0,
            dirty: false,
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn register(&self, field: &str) -> Result<FieldBinding, FormError> {
        let spec = self
            .schema
            .get(field)
            .ok_or_else(|| FormError::UnknownField(field.into()))?;
        Ok(FieldBinding {
            id: FieldId::new(field),
            kind: spec.kind,
            display: spec.display.clone(),
        })
    }

    /// Current value without subscribing. Unknown fields read as `Value::None`.
    pub fn watch(&self, field: &str) -> &Value {
        const NONE: &Value = &Value::None;
        self.values.get(field).unwrap_or(NONE)
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.validation.error(field)
    }

    /// Shown errors in schema order.
    pub fn errors(&self) -> Vec<(FieldId, String)> {
        self.values
            .keys()
            .filter_map(|id| {
                self.validation
                    .error(id.as_str())
                    .map(|err| (id.clone(), err.to_string()))
            })
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Stores `value` and notifies observers when it differs from the current one.
    /// A changed field loses its shown error until validations run again.
    /// Values whose variant does not match the field kind are refused.
    pub fn set_value(&mut self, field: &str, value: Value) -> Result<(), FormError> {
        let Some(kind) = self.schema.get(field).map(|spec| spec.kind) else {
            return Err(FormError::UnknownField(field.into()));
        };
        if !kind.accepts(&value) {
            return Err(FormError::TypeMismatch {
                field: field.into(),
                kind,
            });
        }
        let Some((index, id, slot)) = self.values.get_full_mut(field) else {
            return Err(FormError::UnknownField(field.into()));
        };
        if *slot == value {
            return Ok(());
        }

        *slot = value;
        self.dirty = true;
        self.validation.clear_error(field);
        trace!(field = %id, "field value changed");
        self.notify(index);
        Ok(())
    }

    /// Parses display input according to the field kind. Unparseable input clears the value.
    pub fn set_input(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        let kind = self
            .schema
            .get(field)
            .map(|spec| spec.kind)
            .ok_or_else(|| FormError::UnknownField(field.into()))?;

        match kind.parse(raw) {
            Ok(value) => self.set_value(field, value),
            Err(reason) => {
                self.set_value(field, Value::None)?;
                Err(FormError::Parse {
                    field: field.into(),
                    reason,
                })
            }
        }
    }

    pub fn subscribe(
        &mut self,
        field: &str,
        observer: impl FnMut(&FieldId, &Value) + 'static,
    ) -> Result<SubscriptionId, FormError> {
        if !self.values.contains_key(field) {
            return Err(FormError::UnknownField(field.into()));
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers
            .push((id, FieldId::new(field), Box::new(observer)));
        Ok(id)
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _, _)| *id != subscription);
        before != self.observers.len()
    }

    /// Validates every field, replaces the error state and reports whether all passed.
    pub fn apply_validations(&mut self) -> bool {
        let mut failed = 0usize;
        for (id, value) in &self.values {
            match self.validators.validate(id.as_str(), value) {
                Some(error) => {
                    self.validation.set_error(id.clone(), error);
                    failed += 1;
                }
                None => {
                    self.validation.clear_error(id.as_str());
                }
            }
        }

        debug!(fields = self.values.len(), failed, "applied validations");
        failed == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.values.clone())
    }

    fn notify(&mut self, index: usize) {
        let Some((id, value)) = self.values.get_index(index) else {
            return;
        };
        for (_, field, observer) in self.observers.iter_mut() {
            if field == id {
                observer(id, value);
            }
        }
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("values", &self.values)
            .field("validation", &self.validation)
            .field("observers", &self.observers.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
