//! Values, sequences and shared composite objects

use crate::scalar::{FromValue, Scalar};
use crate::types::{SequenceKind, TypeKey, ValueClass};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Any mapping endpoint
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,

    /// Simple value, converted directly
    Simple(Scalar),

    /// Ordered sequence
    Sequence(Sequence),

    /// Key/value entries in insertion order
    Associative(Vec<(Value, Value)>),

    /// Shared object, mapped recursively
    Composite(ObjectRef),
}

/// Ordered sequence together with its container kind
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub kind: SequenceKind,
    pub items: Vec<Value>,
}

/// Named fields of one object, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Object {
    pub type_name: String,
    pub fields: Vec<(String, Value)>,
}

/// Shared handle to an [`Object`]
///
/// Equality and hashing are by reference identity, so the same handle can
/// appear several times in one graph, including inside itself.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

/// Reference identity of an [`ObjectRef`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl Value {
    /// String value.
    pub fn string(value: impl Into<String>) -> Self {
        Value::Simple(Scalar::String(value.into()))
    }

    /// Sequence of the given kind.
    pub fn sequence(kind: SequenceKind, items: Vec<Value>) -> Self {
        Value::Sequence(Sequence { kind, items })
    }

    /// `List` sequence.
    pub fn list(items: Vec<Value>) -> Self {
        Self::sequence(SequenceKind::List, items)
    }

    /// Associative container from entries.
    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Associative(entries)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Simple(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Composite(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Associative(entries) => Some(entries),
            _ => None,
        }
    }

    /// Read the value as a Rust type.
    pub fn extract<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Value class, or `None` for null.
    pub fn classify(&self) -> Option<ValueClass> {
        match self {
            Value::Null => None,
            Value::Simple(_) => Some(ValueClass::Simple),
            Value::Sequence(_) => Some(ValueClass::Sequence),
            Value::Associative(_) => Some(ValueClass::Associative),
            Value::Composite(_) => Some(ValueClass::Composite),
        }
    }

    /// Converter lookup key of this value's runtime type.
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            Value::Simple(scalar) => Some(TypeKey::Simple(scalar.simple_type())),
            Value::Composite(object) => Some(TypeKey::Composite(object.type_name())),
            _ => None,
        }
    }

    /// Look up a value in an associative container by key.
    pub fn entry(&self, key: &Value) -> Option<&Value> {
        self.as_entries()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Composite(object)
    }
}

impl From<Sequence> for Value {
    fn from(sequence: Sequence) -> Self {
        Value::Sequence(sequence)
    }
}

impl Sequence {
    pub fn new(kind: SequenceKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Replace an existing field or append a new one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }
}

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Identity of the referenced object.
    pub fn id(&self) -> ObjectId {
        ObjectId(Rc::as_ptr(&self.0) as usize)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn type_name(&self) -> String {
        self.0.borrow().type_name.clone()
    }

    /// Clone of a field value.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.borrow_mut().set(name, value);
    }

    /// Clone of all fields, so the object is not borrowed while they are used.
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.0.borrow().fields.clone()
    }

    /// Borrow the object.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Mutably borrow the object.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(object) => write!(f, "ObjectRef({} @ {:#x})", object.type_name, self.id().0),
            Err(_) => write!(f, "ObjectRef(<borrowed> @ {:#x})", self.id().0),
        }
    }
}
