//! Class model
//!
//! Classes are declared with [`ClassDefinition`] and its member builders,
//! then resolved by the [`ClassRegistry`](crate::ClassRegistry) into an
//! immutable [`Class`]. Instance fields take slots after every inherited
//! slot, in declaration order.

use crate::annotation::{has_annotation, Annotation, NOT_NULL};
use crate::error::{DefineError, InvokeError};
use crate::object::{Object, ObjectRef};
use crate::value::Value;
use parking_lot::RwLock;
use propkit_types::{ClassId, Type};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a resolved class
pub type ClassRef = Arc<Class>;

/// Implementation of a method: receives the target object and the arguments
pub type MethodBody =
    Arc<dyn Fn(&ObjectRef, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// What kind of type a class is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Concrete, instantiable class
    Class,
    /// Abstract class; may leave methods unimplemented
    Abstract,
    /// Interface; abstract methods and static fields only
    Interface,
}

/// Member access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    /// Visible everywhere
    Public,
    /// Visible to subclasses
    Protected,
    /// Visible to the declaring package
    Package,
    /// Visible to the declaring class only
    Private,
}

// ============================================================================
// Definitions
// ============================================================================

/// Definition for a field to be added to a class
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Access level (private unless changed)
    pub visibility: Visibility,
    /// Whether this is a static field
    pub is_static: bool,
    /// Whether this field is final (read-only after construction)
    pub is_final: bool,
    /// Annotations on the field
    pub annotations: Vec<Annotation>,
    /// Initial value (if any); map values are copied per instance
    pub initial_value: Option<Value>,
}

impl FieldDefinition {
    /// Create a private instance field
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            annotations: Vec::new(),
            initial_value: None,
        }
    }

    /// Set the access level
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Make the field public
    pub fn public(self) -> Self {
        self.visibility(Visibility::Public)
    }

    /// Set the initial value
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    /// Mark as static field
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as final
    pub fn as_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Attach an annotation
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Parameter definition for method signatures
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Annotations on the parameter
    pub annotations: Vec<Annotation>,
}

impl ParameterDefinition {
    /// Create a new parameter definition
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    /// Attach an annotation
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Definition for a method to be added to a class
#[derive(Clone)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Parameters in order
    pub params: Vec<ParameterDefinition>,
    /// Return type
    pub return_type: Type,
    /// Access level (public unless changed)
    pub visibility: Visibility,
    /// Whether the method belongs to the class rather than its instances
    pub is_static: bool,
    /// Annotations on the method
    pub annotations: Vec<Annotation>,
    /// Implementation; `None` declares an abstract method
    pub body: Option<MethodBody>,
    /// Signature inherited from a generic ancestor with its type parameter
    /// erased to the bound
    pub erased: bool,
}

impl MethodDefinition {
    /// Create a public abstract `void` method with no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: Type::Void,
            visibility: Visibility::Public,
            is_static: false,
            annotations: Vec::new(),
            body: None,
            erased: false,
        }
    }

    /// Abstract getter `name(): ty`
    pub fn getter(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name).returns(ty)
    }

    /// Abstract setter `name(value: ty): void`
    pub fn setter(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name).with_param("value", ty)
    }

    /// Concrete getter returning the named field
    pub fn field_getter(name: impl Into<String>, field: &str, ty: Type) -> Self {
        let field = field.to_string();
        Self::getter(name, ty).body(move |this, _| this.field(&field))
    }

    /// Concrete setter assigning the named field
    pub fn field_setter(name: impl Into<String>, field: &str, ty: Type) -> Self {
        let field = field.to_string();
        Self::setter(name, ty).body(move |this, args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            this.set_field(&field, value)?;
            Ok(Value::Null)
        })
    }

    /// Add a parameter
    pub fn param(mut self, param: ParameterDefinition) -> Self {
        self.params.push(param);
        self
    }

    /// Add a plain parameter
    pub fn with_param(self, name: impl Into<String>, ty: Type) -> Self {
        self.param(ParameterDefinition::new(name, ty))
    }

    /// Set return type
    pub fn returns(mut self, ty: Type) -> Self {
        self.return_type = ty;
        self
    }

    /// Set the access level
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attach an annotation
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Mark as static; static methods must have a body
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as the erased form of a generic signature
    pub fn erased(mut self) -> Self {
        self.erased = true;
        self
    }

    /// Provide the implementation
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    /// Provide a shared implementation
    pub fn with_body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    fn with_no_body(mut self) -> Self {
        self.body = None;
        self
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("visibility", &self.visibility)
            .field("static", &self.is_static)
            .field("annotations", &self.annotations)
            .field("abstract", &self.body.is_none())
            .field("erased", &self.erased)
            .finish()
    }
}

/// Complete definition of a class, abstract class or interface
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    /// Class name (unique within a registry)
    pub name: String,
    /// Kind of class
    pub kind: ClassKind,
    /// Superclass (never set for interfaces)
    pub parent: Option<ClassRef>,
    /// Implemented (or, for interfaces, extended) interfaces
    pub interfaces: Vec<ClassRef>,
    /// Declared fields
    pub fields: Vec<FieldDefinition>,
    /// Declared methods
    pub methods: Vec<MethodDefinition>,
}

impl ClassDefinition {
    fn with_kind(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Concrete class
    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Class)
    }

    /// Abstract class
    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Abstract)
    }

    /// Interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Interface)
    }

    /// Set the superclass
    pub fn extends(mut self, parent: &ClassRef) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Add an interface implementation
    pub fn implements(mut self, interface: &ClassRef) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    /// Add a field to the definition
    pub fn add_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a method to the definition
    pub fn add_method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }
}

// ============================================================================
// Resolved members
// ============================================================================

/// Field information of a registered class
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Access level
    pub visibility: Visibility,
    /// Whether the field is static
    pub is_static: bool,
    /// Whether the field is final
    pub is_final: bool,
    /// Annotations on the field
    pub annotations: Vec<Annotation>,
    /// Declaring class ID
    pub declaring_class: ClassId,
    /// Instance slot, or index into the declaring class's statics
    pub index: usize,
    initial_value: Option<Value>,
}

impl FieldInfo {
    /// Whether the field carries an annotation with this name
    pub fn has_annotation(&self, name: &str) -> bool {
        has_annotation(&self.annotations, name)
    }

    fn initial(&self) -> Value {
        match &self.initial_value {
            Some(Value::Map(map)) => Value::Map(map.detached()),
            Some(value) => value.clone(),
            None => Value::default_for(self.ty),
        }
    }
}

/// Parameter information of a registered method
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Annotations on the parameter
    pub annotations: Vec<Annotation>,
    /// Parameter index
    pub index: usize,
}

/// Name, parameter types and return type: the identity used for overriding
///
/// The return type takes part so that an erased accessor and its covariant
/// override are distinct methods, each needing an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Method name
    pub name: String,
    /// Parameter types in order
    pub params: Vec<Type>,
    /// Return type
    pub return_type: Type,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")?;
        if !self.return_type.is_void() {
            write!(f, ": {}", self.return_type)?;
        }
        Ok(())
    }
}

/// Method information of a registered class
#[derive(Clone)]
pub struct MethodInfo {
    /// Method name
    pub name: String,
    /// Parameter infos
    pub params: Vec<ParameterInfo>,
    /// Return type
    pub return_type: Type,
    /// Access level
    pub visibility: Visibility,
    /// Whether this is a static method
    pub is_static: bool,
    /// Annotations on the method
    pub annotations: Vec<Annotation>,
    /// Declaring class ID
    pub declaring_class: ClassId,
    /// Whether this is the erased form of a generic signature
    pub erased: bool,
    body: Option<MethodBody>,
}

impl MethodInfo {
    fn resolve(def: MethodDefinition, declaring_class: ClassId) -> Self {
        Self {
            name: def.name,
            params: def
                .params
                .into_iter()
                .enumerate()
                .map(|(index, p)| ParameterInfo {
                    name: p.name,
                    ty: p.ty,
                    annotations: p.annotations,
                    index,
                })
                .collect(),
            return_type: def.return_type,
            visibility: def.visibility,
            is_static: def.is_static,
            annotations: def.annotations,
            declaring_class,
            erased: def.erased,
            body: def.body,
        }
    }

    /// Overriding identity
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.name.clone(),
            params: self.params.iter().map(|p| p.ty).collect(),
            return_type: self.return_type,
        }
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the method has no implementation
    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    /// Whether the method carries an annotation with this name
    pub fn has_annotation(&self, name: &str) -> bool {
        has_annotation(&self.annotations, name)
    }

    /// Whether parameter `index` must not receive null
    ///
    /// True when the parameter or the method itself is annotated [`NOT_NULL`].
    pub fn rejects_null(&self, index: usize) -> bool {
        self.has_annotation(NOT_NULL)
            || self
                .params
                .get(index)
                .is_some_and(|p| has_annotation(&p.annotations, NOT_NULL))
    }

    /// Whether the arguments fit the parameter list
    pub fn accepts(&self, args: &[Value]) -> bool {
        args.len() == self.params.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(p, a)| a.is_instance_of(p.ty))
    }

    /// Run the implementation against `this`
    pub fn invoke(&self, this: &ObjectRef, args: &[Value]) -> Result<Value, InvokeError> {
        match &self.body {
            Some(body) => body(this, args),
            None => Err(InvokeError::AbstractMethod {
                class: this.class().name().to_string(),
                method: self.name.clone(),
            }),
        }
    }

    pub(crate) fn to_definition(&self) -> MethodDefinition {
        MethodDefinition {
            name: self.name.clone(),
            params: self
                .params
                .iter()
                .map(|p| ParameterDefinition {
                    name: p.name.clone(),
                    ty: p.ty,
                    annotations: p.annotations.clone(),
                })
                .collect(),
            return_type: self.return_type,
            visibility: self.visibility,
            is_static: self.is_static,
            annotations: self.annotations.clone(),
            body: None,
            erased: self.erased,
        }
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("visibility", &self.visibility)
            .field("static", &self.is_static)
            .field("declaring_class", &self.declaring_class)
            .field("abstract", &self.is_abstract())
            .field("erased", &self.erased)
            .finish()
    }
}

// ============================================================================
// Class
// ============================================================================

/// A registered class, abstract class or interface
#[derive(Debug)]
pub struct Class {
    id: ClassId,
    name: String,
    kind: ClassKind,
    parent: Option<ClassRef>,
    interfaces: Vec<ClassRef>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    /// Number of instance slots, inherited ones included
    field_count: usize,
    statics: RwLock<Vec<Value>>,
    generated: bool,
}

impl Class {
    /// Validate a definition and lay out its slots
    pub(crate) fn resolve(
        id: ClassId,
        def: ClassDefinition,
        generated: bool,
    ) -> Result<Class, DefineError> {
        let ClassDefinition {
            name,
            kind,
            parent,
            interfaces,
            fields,
            methods,
        } = def;

        if let Some(parent) = &parent {
            if parent.is_interface() || kind == ClassKind::Interface {
                return Err(DefineError::InterfaceAsParent {
                    class: name,
                    parent: parent.name.clone(),
                });
            }
        }
        if let Some(iface) = interfaces.iter().find(|i| !i.is_interface()) {
            return Err(DefineError::NotAnInterface {
                class: name,
                interface: iface.name.clone(),
            });
        }

        let mut seen = FxHashSet::default();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DefineError::DuplicateField {
                    class: name.clone(),
                    field: field.name.clone(),
                });
            }
            if kind == ClassKind::Interface && !field.is_static {
                return Err(DefineError::InterfaceMember {
                    class: name.clone(),
                    member: format!("instance field '{}'", field.name),
                });
            }
        }

        let mut next_slot = parent.as_ref().map_or(0, |p| p.field_count);
        let mut next_static = 0;
        let mut statics = Vec::new();
        let fields: Vec<FieldInfo> = fields
            .into_iter()
            .map(|f| {
                let index = if f.is_static {
                    next_static += 1;
                    next_static - 1
                } else {
                    next_slot += 1;
                    next_slot - 1
                };
                let info = FieldInfo {
                    name: f.name,
                    ty: f.ty,
                    visibility: f.visibility,
                    is_static: f.is_static,
                    is_final: f.is_final,
                    annotations: f.annotations,
                    declaring_class: id,
                    index,
                    initial_value: f.initial_value,
                };
                if info.is_static {
                    statics.push(info.initial());
                }
                info
            })
            .collect();

        let methods: Vec<MethodInfo> = methods
            .into_iter()
            .map(|m| MethodInfo::resolve(m, id))
            .collect();

        if let Some(m) = methods.iter().find(|m| m.is_static && m.is_abstract()) {
            return Err(DefineError::AbstractStaticMethod {
                class: name,
                method: m.signature().to_string(),
            });
        }

        match kind {
            ClassKind::Interface => {
                if let Some(m) = methods.iter().find(|m| !m.is_static && !m.is_abstract()) {
                    return Err(DefineError::InterfaceMember {
                        class: name,
                        member: format!("method body for {}", m.signature()),
                    });
                }
            }
            ClassKind::Class => {
                if let Some(m) = methods.iter().find(|m| m.is_abstract()) {
                    return Err(DefineError::AbstractMethodInConcreteClass {
                        class: name,
                        method: m.signature().to_string(),
                    });
                }
                let pending = pending_abstract_methods(parent.as_ref(), &interfaces, &methods);
                if let Some(m) = pending.first() {
                    return Err(DefineError::UnimplementedMethod {
                        class: name,
                        method: m.signature().to_string(),
                    });
                }
            }
            ClassKind::Abstract => {}
        }

        Ok(Class {
            id,
            name,
            kind,
            parent,
            interfaces,
            fields,
            methods,
            field_count: next_slot,
            statics: RwLock::new(statics),
            generated,
        })
    }

    /// Interface made of the given abstract methods, without validation
    pub(crate) fn bootstrap_interface(
        id: ClassId,
        name: &str,
        methods: Vec<MethodDefinition>,
    ) -> Class {
        Class {
            id,
            name: name.to_string(),
            kind: ClassKind::Interface,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: methods
                .into_iter()
                .map(|m| MethodInfo::resolve(m.with_no_body(), id))
                .collect(),
            field_count: 0,
            statics: RwLock::new(Vec::new()),
            generated: false,
        }
    }

    /// Class ID
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of class
    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// The class as a type
    pub fn as_type(&self) -> Type {
        Type::Class(self.id)
    }

    /// Whether this is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Whether instances cannot be created directly
    pub fn is_abstract(&self) -> bool {
        self.kind != ClassKind::Class
    }

    /// Whether the class was synthesized by the dynamic class builder
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Superclass
    pub fn parent(&self) -> Option<&ClassRef> {
        self.parent.as_ref()
    }

    /// Directly implemented (or extended) interfaces
    pub fn interfaces(&self) -> &[ClassRef] {
        &self.interfaces
    }

    /// Number of instance slots, inherited ones included
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Fields declared on this class
    pub fn declared_fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Methods declared on this class
    pub fn declared_methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// This class followed by each superclass up to the root
    pub fn lineage(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |c| c.parent.as_deref())
    }

    /// Every interface reachable from this class, each listed once
    pub fn all_interfaces(&self) -> Vec<ClassRef> {
        let direct: Vec<ClassRef> = self
            .lineage()
            .flat_map(|c| c.interfaces.iter().cloned())
            .collect();
        transitive_interfaces(&direct)
    }

    /// Whether this class is `id` or inherits from it
    pub fn is_subclass_of(&self, id: ClassId) -> bool {
        self.id == id
            || self.parent.as_ref().is_some_and(|p| p.is_subclass_of(id))
            || self.interfaces.iter().any(|i| i.is_subclass_of(id))
    }

    /// Most-derived instance field with this name, any visibility
    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.lineage()
            .flat_map(|c| c.fields.iter())
            .find(|f| !f.is_static && f.name == name)
    }

    /// Instance field occupying `slot`
    pub fn field_at(&self, slot: usize) -> Option<&FieldInfo> {
        self.lineage()
            .flat_map(|c| c.fields.iter())
            .find(|f| !f.is_static && f.index == slot)
    }

    /// Public instance fields, inherited ones included
    pub fn public_fields(&self) -> Vec<&FieldInfo> {
        self.lineage()
            .flat_map(|c| c.fields.iter())
            .filter(|f| !f.is_static && f.visibility == Visibility::Public)
            .collect()
    }

    /// Public implemented methods, most-derived override first
    pub fn public_methods(&self) -> Vec<&MethodInfo> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for method in self.lineage().flat_map(|c| c.methods.iter()) {
            if !seen.insert(method.signature()) {
                continue;
            }
            if method.visibility == Visibility::Public && !method.is_abstract() {
                out.push(method);
            }
        }
        out
    }

    /// Abstract methods with no implementation anywhere in the class
    pub fn abstract_methods(&self) -> Vec<MethodInfo> {
        pending_abstract_methods(self.parent.as_ref(), &self.interfaces, &self.methods)
    }

    /// Resolve the implementation that will handle `name(args)`
    pub fn resolve_method(&self, name: &str, args: &[Value]) -> Result<&MethodInfo, InvokeError> {
        let mut named = false;
        let mut abstract_match = false;
        for method in self.lineage().flat_map(|c| c.methods.iter()) {
            if method.name != name {
                continue;
            }
            named = true;
            if !method.accepts(args) {
                continue;
            }
            if method.is_abstract() {
                abstract_match = true;
                continue;
            }
            return Ok(method);
        }

        Err(if abstract_match {
            InvokeError::AbstractMethod {
                class: self.name.clone(),
                method: name.to_string(),
            }
        } else if named {
            InvokeError::ArgumentMismatch {
                class: self.name.clone(),
                method: name.to_string(),
                args: args
                    .iter()
                    .map(Value::type_label)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        } else {
            InvokeError::NoSuchMethod {
                class: self.name.clone(),
                method: name.to_string(),
            }
        })
    }

    /// Value of a static field declared on this class or a superclass
    pub fn static_value(&self, name: &str) -> Option<Value> {
        self.lineage().find_map(|c| {
            c.fields
                .iter()
                .find(|f| f.is_static && f.name == name)
                .and_then(|f| c.statics.read().get(f.index).cloned())
        })
    }

    /// Assign a static field declared on this class or a superclass
    pub fn set_static_value(&self, name: &str, value: Value) -> Result<(), InvokeError> {
        for class in self.lineage() {
            if let Some(field) = class.fields.iter().find(|f| f.is_static && f.name == name) {
                if !value.is_instance_of(field.ty) {
                    return Err(slot_mismatch(field.ty, &value));
                }
                if let Some(slot) = class.statics.write().get_mut(field.index) {
                    *slot = value;
                }
                return Ok(());
            }
        }
        Err(InvokeError::NoSuchField {
            class: self.name.clone(),
            field: name.to_string(),
        })
    }

    /// Initial slot values of a fresh instance
    pub(crate) fn instance_defaults(&self) -> Vec<Value> {
        let mut slots = vec![Value::Null; self.field_count];
        for field in self.lineage().flat_map(|c| c.fields.iter()) {
            if !field.is_static {
                if let Some(slot) = slots.get_mut(field.index) {
                    *slot = field.initial();
                }
            }
        }
        slots
    }

    /// Create a new instance with every slot at its initial value
    pub fn instantiate(self: &Arc<Self>) -> Result<ObjectRef, InvokeError> {
        if self.is_abstract() {
            return Err(InvokeError::NotInstantiable {
                class: self.name.clone(),
            });
        }
        Ok(Arc::new(Object::new(self.clone())))
    }
}

pub(crate) fn slot_mismatch(ty: Type, value: &Value) -> InvokeError {
    use propkit_types::TypeError;
    if value.is_null() {
        InvokeError::Type(TypeError::NullPrimitive { ty: ty.to_string() })
    } else {
        InvokeError::Type(TypeError::Mismatch {
            expected: ty.to_string(),
            actual: value.type_label(),
        })
    }
}

/// Interfaces in `roots` plus everything they extend, each listed once
pub(crate) fn transitive_interfaces(roots: &[ClassRef]) -> Vec<ClassRef> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    let mut pending: Vec<ClassRef> = roots.iter().rev().cloned().collect();
    while let Some(iface) = pending.pop() {
        if !seen.insert(iface.id) {
            continue;
        }
        pending.extend(iface.interfaces.iter().rev().cloned());
        out.push(iface);
    }
    out
}

/// Abstract methods a class with this parent, interface list and own
/// methods would leave unimplemented
///
/// Signatures implemented anywhere in the parent chain or by `own` count as
/// implemented; duplicate signatures collapse.
pub(crate) fn pending_abstract_methods(
    parent: Option<&ClassRef>,
    interfaces: &[ClassRef],
    own: &[MethodInfo],
) -> Vec<MethodInfo> {
    let lineage: Vec<&Class> = parent.map(|p| p.lineage().collect()).unwrap_or_default();

    let implemented: FxHashSet<Signature> = own
        .iter()
        .chain(lineage.iter().flat_map(|c| c.methods.iter()))
        .filter(|m| !m.is_abstract())
        .map(MethodInfo::signature)
        .collect();

    let mut roots: Vec<ClassRef> = interfaces.to_vec();
    roots.extend(lineage.iter().flat_map(|c| c.interfaces.iter().cloned()));
    let all_interfaces = transitive_interfaces(&roots);

    let candidates = own
        .iter()
        .chain(lineage.iter().flat_map(|c| c.methods.iter()))
        .chain(all_interfaces.iter().flat_map(|i| i.methods.iter()))
        .filter(|m| m.is_abstract());

    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for method in candidates {
        let signature = method.signature();
        if implemented.contains(&signature) {
            continue;
        }
        if seen.insert(signature) {
            out.push(method.clone());
        }
    }
    out
}
