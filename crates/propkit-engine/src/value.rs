//! Runtime values
//!
//! Every value carries its boxed runtime type: an `Int` is an `Integer` to
//! the assignability rules, and only `Null` has no type at all.

use crate::object::ObjectRef;
use parking_lot::RwLock;
use propkit_types::{Primitive, Type};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A dynamically typed value
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a reference
    Null,
    /// `boolean`
    Boolean(bool),
    /// `char`
    Char(char),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// Character string
    String(String),
    /// Reference to an object instance
    Object(ObjectRef),
    /// Reference to a shared property map
    Map(PropertyMap),
}

/// Integral or floating view of a numeric value, used for narrowing
#[derive(Clone, Copy)]
enum Numeric {
    Integral(i64),
    Floating(f64),
}

impl Value {
    /// Runtime type of the value (boxed for primitives), `None` for null
    pub fn runtime_type(&self) -> Option<Type> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(_) => Type::Boxed(Primitive::Boolean),
            Value::Char(_) => Type::Boxed(Primitive::Char),
            Value::Byte(_) => Type::Boxed(Primitive::Byte),
            Value::Short(_) => Type::Boxed(Primitive::Short),
            Value::Int(_) => Type::Boxed(Primitive::Int),
            Value::Long(_) => Type::Boxed(Primitive::Long),
            Value::Float(_) => Type::Boxed(Primitive::Float),
            Value::Double(_) => Type::Boxed(Primitive::Double),
            Value::String(_) => Type::String,
            Value::Object(obj) => obj.class().as_type(),
            Value::Map(_) => Type::Map,
        })
    }

    /// Primitive kind behind a boxed primitive value
    pub fn primitive_kind(&self) -> Option<Primitive> {
        self.runtime_type().and_then(|t| t.primitive_kind())
    }

    /// Whether this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this is one of the six numeric kinds
    pub fn is_number(&self) -> bool {
        self.numeric().is_some()
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Object payload
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Map payload
    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Integral payload widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self.numeric()? {
            Numeric::Integral(v) => Some(v),
            Numeric::Floating(_) => None,
        }
    }

    /// Numeric payload widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self.numeric()? {
            Numeric::Integral(v) => Some(v as f64),
            Numeric::Floating(v) => Some(v),
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Byte(v) => Some(Numeric::Integral(*v as i64)),
            Value::Short(v) => Some(Numeric::Integral(*v as i64)),
            Value::Int(v) => Some(Numeric::Integral(*v as i64)),
            Value::Long(v) => Some(Numeric::Integral(*v)),
            Value::Float(v) => Some(Numeric::Floating(*v as f64)),
            Value::Double(v) => Some(Numeric::Floating(*v)),
            _ => None,
        }
    }

    /// Convert a number to another numeric kind (`intValue()`, `byteValue()`, ...)
    ///
    /// Integral targets truncate two's-complement; floating sources convert
    /// to `long`/`int` saturating (NaN becomes zero) and reach `short`/`byte`
    /// through `int`. Returns `None` for non-numeric values or targets.
    pub fn narrow(&self, target: Primitive) -> Option<Value> {
        let n = self.numeric()?;
        Some(match (target, n) {
            (Primitive::Long, Numeric::Integral(v)) => Value::Long(v),
            (Primitive::Long, Numeric::Floating(v)) => Value::Long(v as i64),
            (Primitive::Int, Numeric::Integral(v)) => Value::Int(v as i32),
            (Primitive::Int, Numeric::Floating(v)) => Value::Int(v as i32),
            (Primitive::Short, Numeric::Integral(v)) => Value::Short(v as i16),
            (Primitive::Short, Numeric::Floating(v)) => Value::Short((v as i32) as i16),
            (Primitive::Byte, Numeric::Integral(v)) => Value::Byte(v as i8),
            (Primitive::Byte, Numeric::Floating(v)) => Value::Byte((v as i32) as i8),
            (Primitive::Double, Numeric::Integral(v)) => Value::Double(v as f64),
            (Primitive::Double, Numeric::Floating(v)) => Value::Double(v),
            (Primitive::Float, Numeric::Integral(v)) => Value::Float(v as f32),
            (Primitive::Float, Numeric::Floating(v)) => Value::Float(v as f32),
            (Primitive::Boolean | Primitive::Char, _) => return None,
        })
    }

    /// Initial value of a slot declared as `ty`
    pub fn default_for(ty: Type) -> Value {
        match ty {
            Type::Primitive(p) => match p {
                Primitive::Boolean => Value::Boolean(false),
                Primitive::Char => Value::Char('\0'),
                Primitive::Byte => Value::Byte(0),
                Primitive::Short => Value::Short(0),
                Primitive::Int => Value::Int(0),
                Primitive::Long => Value::Long(0),
                Primitive::Float => Value::Float(0.0),
                Primitive::Double => Value::Double(0.0),
            },
            _ => Value::Null,
        }
    }

    /// Whether this value may be stored in a slot declared as `ty`
    ///
    /// Boxed values fit both their primitive and wrapper types; null fits
    /// every reference type.
    pub fn is_instance_of(&self, ty: Type) -> bool {
        match (self, ty) {
            (_, Type::Void) => false,
            (Value::Null, ty) => ty.is_reference(),
            (_, Type::Object) => true,
            (v, Type::Number) => v.is_number(),
            (v, Type::Primitive(p)) | (v, Type::Boxed(p)) => v.primitive_kind() == Some(p),
            (Value::String(_), Type::String) => true,
            (Value::Map(_), Type::Map) => true,
            (Value::Object(obj), Type::Class(id)) => obj.class().is_subclass_of(id),
            _ => false,
        }
    }

    /// Short type label for diagnostics
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Object(obj) => obj.class().name().to_string(),
            other => other
                .runtime_type()
                .map(|t| t.to_string())
                .unwrap_or_default(),
        }
    }
}

fn write_floating(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        write!(f, "{:.1}", v)
    } else {
        write!(f, "{}", v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) if v.is_finite() && v.fract() != 0.0 => write!(f, "{}", v),
            Value::Float(v) => write_floating(f, *v as f64),
            Value::Double(v) => write_floating(f, *v),
            Value::String(s) => f.write_str(s),
            Value::Object(obj) => write!(f, "{}@{:x}", obj.class().name(), obj.id()),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.snapshot().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Boolean,
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    ObjectRef => Object,
    PropertyMap => Map,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Shared name to value container backing map-backed classes
///
/// Clones share storage: a map handed out by an instance is the instance's
/// own container, not a copy.
#[derive(Clone, Default)]
pub struct PropertyMap(Arc<RwLock<BTreeMap<String, Value>>>);

impl PropertyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh container holding a copy of the current entries
    pub fn detached(&self) -> Self {
        PropertyMap(Arc::new(RwLock::new(self.snapshot())))
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// Store a value, returning the previous one
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().insert(key.into(), value)
    }

    /// Remove a value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().remove(key)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Copy of the current entries
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.0.read().clone()
    }

    /// Whether both handles share the same storage
    pub fn ptr_eq(&self, other: &PropertyMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.read().iter()).finish()
    }
}
