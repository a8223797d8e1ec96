//! Object model errors

use propkit_types::TypeError;
use thiserror::Error;

/// Errors raised while registering a class definition
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefineError {
    /// A class with the same name is already registered
    #[error("Duplicate class '{name}'")]
    DuplicateClass {
        /// Class name
        name: String,
    },

    /// An interface was given as a superclass
    #[error("Class '{class}' cannot extend interface '{parent}'")]
    InterfaceAsParent {
        /// Class being defined
        class: String,
        /// Offending parent
        parent: String,
    },

    /// A class was listed among implemented interfaces
    #[error("'{interface}' is not an interface (implemented by '{class}')")]
    NotAnInterface {
        /// Class being defined
        class: String,
        /// Offending entry
        interface: String,
    },

    /// Interfaces may only declare abstract instance methods, static methods
    /// and static fields
    #[error("Interface '{class}' cannot declare {member}")]
    InterfaceMember {
        /// Interface being defined
        class: String,
        /// Offending member description
        member: String,
    },

    /// Concrete class declares a method without a body
    #[error("Concrete class '{class}' declares abstract method {method}")]
    AbstractMethodInConcreteClass {
        /// Class being defined
        class: String,
        /// Method signature
        method: String,
    },

    /// Static method declared without a body
    #[error("Class '{class}' declares static method {method} without a body")]
    AbstractStaticMethod {
        /// Class being defined
        class: String,
        /// Method signature
        method: String,
    },

    /// Concrete class leaves an inherited abstract method unimplemented
    #[error("Concrete class '{class}' does not implement {method}")]
    UnimplementedMethod {
        /// Class being defined
        class: String,
        /// Method signature
        method: String,
    },

    /// Two fields with the same name declared on one class
    #[error("Class '{class}' declares field '{field}' twice")]
    DuplicateField {
        /// Class being defined
        class: String,
        /// Field name
        field: String,
    },
}

/// Errors raised while instantiating objects or invoking their members
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvokeError {
    /// No method with the given name exists on the class
    #[error("Class '{class}' has no method '{method}'")]
    NoSuchMethod {
        /// Class name
        class: String,
        /// Method name
        method: String,
    },

    /// Methods with the name exist but none accepts the arguments
    #[error("No overload of {class}.{method} accepts ({args})")]
    ArgumentMismatch {
        /// Class name
        class: String,
        /// Method name
        method: String,
        /// Runtime types of the supplied arguments
        args: String,
    },

    /// The resolved method has no implementation
    #[error("Method {class}.{method} is abstract")]
    AbstractMethod {
        /// Class name
        class: String,
        /// Method name
        method: String,
    },

    /// Abstract classes and interfaces cannot be instantiated
    #[error("Cannot instantiate '{class}'")]
    NotInstantiable {
        /// Class name
        class: String,
    },

    /// Null passed to a parameter marked not-null
    #[error("Null passed to not-null parameter '{param}' of {class}.{method}")]
    NullArgument {
        /// Class name
        class: String,
        /// Method name
        method: String,
        /// Parameter name
        param: String,
    },

    /// No field with the given name or slot exists
    #[error("Class '{class}' has no field '{field}'")]
    NoSuchField {
        /// Class name
        class: String,
        /// Field name or slot index
        field: String,
    },

    /// Value does not fit the declared type of a slot or parameter
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Checked cast in a bridge accessor failed
    #[error("Cannot cast {actual} to {expected}")]
    ClassCast {
        /// Target type
        expected: String,
        /// Runtime type of the value
        actual: String,
    },

    /// Failure raised by a user-supplied method body
    #[error("{0}")]
    Failed(String),
}
