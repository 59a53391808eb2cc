use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::IntrospectionError;
use crate::type_info::TypeInfo;
use crate::value::{Atomic, Value};

type Accessor = Rc<dyn Fn() -> Result<Value, String>>;

#[derive(Clone)]
enum Slot {
    Stored(Value),
    Accessor(Accessor),
}

#[derive(Clone)]
struct Field {
    name: String,
    slot: Slot,
}

/// A structured value: a runtime type and an ordered list of named fields.
///
/// Fields sit behind interior mutability so that cyclic graphs can be tied
/// after construction:
///
/// ```
/// use std::rc::Rc;
/// use rcmp_types::{Object, TypeInfo, Value};
///
/// let node = Rc::new(Object::new(TypeInfo::new("Node")));
/// node.set("next", Value::Object(node.clone()));
/// ```
pub struct Object {
    type_info: TypeInfo,
    fields: RefCell<Vec<Field>>,
    own_equality: Option<Rc<dyn Atomic>>,
}

impl Object {
    /// Create an object without fields.
    pub fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            fields: RefCell::new(Vec::new()),
            own_equality: None,
        }
    }

    /// Add (or replace) a stored field.
    pub fn with_field(self, name: impl Into<String>, value: Value) -> Self {
        self.put(name.into(), Slot::Stored(value));
        self
    }

    /// Add (or replace) a field read through an accessor. A failing accessor
    /// surfaces as an [`IntrospectionError`] when the field is read.
    pub fn with_accessor<F>(self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn() -> Result<Value, String> + 'static,
    {
        self.put(name.into(), Slot::Accessor(Rc::new(accessor)));
        self
    }

    /// Attach the type's own equality, used as a leaf comparison when the
    /// comparison is configured to honour it.
    pub fn with_own_equality<T: PartialEq + fmt::Debug + 'static>(mut self, value: T) -> Self {
        self.own_equality = Some(Rc::new(value));
        self
    }

    /// Finish construction.
    pub fn into_value(self) -> Value {
        Value::Object(Rc::new(self))
    }

    /// Set a stored field on a shared object, replacing any previous value.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.put(name.into(), Slot::Stored(value));
    }

    fn put(&self, name: String, slot: Slot) {
        let mut fields = self.fields.borrow_mut();
        match fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.slot = slot,
            None => fields.push(Field { name, slot }),
        }
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.borrow().iter().map(|f| f.name.clone()).collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.borrow().iter().any(|f| f.name == name)
    }

    /// Read one field. `Ok(None)` if the object has no such field.
    pub fn read(&self, name: &str) -> Result<Option<Value>, IntrospectionError> {
        let slot = self
            .fields
            .borrow()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.slot.clone());
        slot.map(|slot| self.read_slot(name, slot)).transpose()
    }

    /// Read every field in declaration order.
    pub fn read_all(&self) -> Result<Vec<(String, Value)>, IntrospectionError> {
        // Snapshot first: accessors may touch this object again.
        let fields: Vec<Field> = self.fields.borrow().clone();
        fields
            .into_iter()
            .map(|f| {
                let value = self.read_slot(&f.name, f.slot)?;
                Ok((f.name, value))
            })
            .collect()
    }

    fn read_slot(&self, name: &str, slot: Slot) -> Result<Value, IntrospectionError> {
        match slot {
            Slot::Stored(value) => Ok(value),
            Slot::Accessor(accessor) => accessor().map_err(|reason| {
                IntrospectionError::unreadable(self.type_info.name.clone(), name, reason)
            }),
        }
    }

    /// Moves the stored field values out, leaving the object without
    /// fields.
    pub(crate) fn take_stored_values(&mut self) -> Vec<Value> {
        std::mem::take(self.fields.get_mut())
            .into_iter()
            .filter_map(|field| match field.slot {
                Slot::Stored(value) => Some(value),
                Slot::Accessor(_) => None,
            })
            .collect()
    }

    /// Returns `true` if the type declared its own equality.
    pub fn has_own_equality(&self) -> bool {
        self.own_equality.is_some()
    }

    /// Compare with the type's own equality. `None` if this object has none.
    pub fn own_eq(&self, other: &Object) -> Option<bool> {
        let mine = self.own_equality.as_ref()?;
        Some(
            other
                .own_equality
                .as_ref()
                .is_some_and(|theirs| mine.atomic_eq(&**theirs)),
        )
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        let values = self.take_stored_values();
        if !values.is_empty() {
            crate::value::release(values);
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.type_info.name)
            .field("fields", &self.field_names())
            .finish()
    }
}
