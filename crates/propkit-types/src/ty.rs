//! Core type definitions for the propkit type system

use std::fmt;

/// Unique identifier for a registered class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Index into a dense class table
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Primitive value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    /// `boolean`
    Boolean,
    /// `char` (a Unicode scalar value)
    Char,
    /// `byte` (signed 8-bit)
    Byte,
    /// `short` (signed 16-bit)
    Short,
    /// `int` (signed 32-bit)
    Int,
    /// `long` (signed 64-bit)
    Long,
    /// `float` (IEEE 754 single precision)
    Float,
    /// `double` (IEEE 754 double precision)
    Double,
}

impl Primitive {
    /// The numeric primitives in writer preference order
    pub const NUMERIC: [Primitive; 6] = [
        Primitive::Long,
        Primitive::Int,
        Primitive::Short,
        Primitive::Byte,
        Primitive::Double,
        Primitive::Float,
    ];

    /// Every primitive kind
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Char,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    /// Lower-case keyword name (`int`, `boolean`, ...)
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Name of the boxed wrapper (`Integer`, `Boolean`, ...)
    pub fn wrapper_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Char => "Character",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        }
    }

    /// Whether the primitive is one of the six numeric kinds
    pub fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Boolean | Primitive::Char)
    }

    /// Whether the primitive is an integral numeric kind
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Primitive::Byte | Primitive::Short | Primitive::Int | Primitive::Long
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared or runtime type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// No value (method returns only)
    Void,
    /// Unboxed primitive slot; cannot hold null
    Primitive(Primitive),
    /// Boxed wrapper of a primitive; nullable
    Boxed(Primitive),
    /// Abstract supertype of the boxed numeric wrappers
    Number,
    /// Character string
    String,
    /// Root of every reference type
    Object,
    /// Name to value associative container
    Map,
    /// A registered class or interface
    Class(ClassId),
}

impl Type {
    /// Shorthand for `Type::Primitive(Primitive::Boolean)`
    pub const BOOLEAN: Type = Type::Primitive(Primitive::Boolean);
    /// Shorthand for `Type::Primitive(Primitive::Char)`
    pub const CHAR: Type = Type::Primitive(Primitive::Char);
    /// Shorthand for `Type::Primitive(Primitive::Byte)`
    pub const BYTE: Type = Type::Primitive(Primitive::Byte);
    /// Shorthand for `Type::Primitive(Primitive::Short)`
    pub const SHORT: Type = Type::Primitive(Primitive::Short);
    /// Shorthand for `Type::Primitive(Primitive::Int)`
    pub const INT: Type = Type::Primitive(Primitive::Int);
    /// Shorthand for `Type::Primitive(Primitive::Long)`
    pub const LONG: Type = Type::Primitive(Primitive::Long);
    /// Shorthand for `Type::Primitive(Primitive::Float)`
    pub const FLOAT: Type = Type::Primitive(Primitive::Float);
    /// Shorthand for `Type::Primitive(Primitive::Double)`
    pub const DOUBLE: Type = Type::Primitive(Primitive::Double);

    /// Whether this is an unboxed primitive
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Whether this is `void`
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Whether values of this type are references (may be null)
    pub fn is_reference(&self) -> bool {
        !matches!(self, Type::Primitive(_) | Type::Void)
    }

    /// Normalized form: primitives become their wrapper, everything else is unchanged
    pub fn boxed(self) -> Type {
        match self {
            Type::Primitive(p) => Type::Boxed(p),
            other => other,
        }
    }

    /// The primitive kind behind a primitive or wrapper type
    pub fn primitive_kind(&self) -> Option<Primitive> {
        match self {
            Type::Primitive(p) | Type::Boxed(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether this is a numeric primitive or numeric wrapper
    pub fn is_numeric(&self) -> bool {
        self.primitive_kind().is_some_and(Primitive::is_numeric)
    }

    /// Whether this is a boxed numeric wrapper (excludes bare `Number`)
    pub fn is_numeric_wrapper(&self) -> bool {
        matches!(self, Type::Boxed(p) if p.is_numeric())
    }

    /// Class id for class types
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Primitive> for Type {
    fn from(p: Primitive) -> Self {
        Type::Primitive(p)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Primitive(p) => f.write_str(p.name()),
            Type::Boxed(p) => f.write_str(p.wrapper_name()),
            Type::Number => f.write_str("Number"),
            Type::String => f.write_str("String"),
            Type::Object => f.write_str("Object"),
            Type::Map => f.write_str("Map"),
            Type::Class(id) => write!(f, "class#{}", id.0),
        }
    }
}
