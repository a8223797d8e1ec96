//! Dynamic Class Builder
//!
//! Synthesizes concrete classes implementing the abstract getters and
//! setters of a primary type and any extra interfaces. The storage behind
//! the accessors comes from an [`AccessorStrategy`]: one field per property
//! ([`FieldBacked`]) or a single property map ([`MapBacked`]).
//!
//! Every shape check runs before the class is registered, so a failed build
//! leaves the registry untouched.

use super::error::BuildError;
use super::key::{reader_property, writer_property};
use super::strategy::{AccessorStrategy, FieldBacked, MapBacked, PropertyPlan, Storage};
use crate::class::{pending_abstract_methods, ClassDefinition, ClassRef, MethodDefinition, MethodInfo};
use crate::class_registry::ClassRegistry;
use crate::error::{DefineError, InvokeError};
use crate::options::BuilderOptions;
use crate::value::Value;
use propkit_types::Type;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessorKind {
    Getter,
    Setter,
}

/// An abstract method recognised as a getter or setter
#[derive(Debug, Clone)]
struct Accessor {
    method: MethodInfo,
    kind: AccessorKind,
    property: String,
    /// Return type of a getter, parameter type of a setter
    ty: Type,
}

/// Builder for creating accessor classes at runtime
#[derive(Debug)]
pub struct DynamicClassBuilder {
    registry: Arc<ClassRegistry>,
    options: BuilderOptions,
    /// Sequence number for generated class names
    counter: AtomicU64,
}

impl DynamicClassBuilder {
    /// Create a builder registering classes in `registry`
    pub fn new(registry: Arc<ClassRegistry>, options: BuilderOptions) -> Self {
        Self {
            registry,
            options,
            counter: AtomicU64::new(0),
        }
    }

    /// The registry generated classes are added to
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Generate a field-backed class implementing `primary` and `interfaces`
    pub fn new_class(
        &self,
        primary: &ClassRef,
        interfaces: &[ClassRef],
    ) -> Result<ClassRef, BuildError> {
        self.build(primary, interfaces, Arc::new(FieldBacked))
    }

    /// Generate a map-backed class implementing `primary` and `interfaces`
    ///
    /// The class also implements `PropertyMapped`.
    pub fn new_mapper_class(
        &self,
        primary: &ClassRef,
        interfaces: &[ClassRef],
    ) -> Result<ClassRef, BuildError> {
        let strategy = MapBacked::new(self.options.map_field.clone());
        self.build(primary, interfaces, Arc::new(strategy))
    }

    /// Generate a class with a custom storage strategy
    pub fn build(
        &self,
        primary: &ClassRef,
        interfaces: &[ClassRef],
        strategy: Arc<dyn AccessorStrategy>,
    ) -> Result<ClassRef, BuildError> {
        if let Some(bad) = interfaces.iter().find(|i| !i.is_interface()) {
            return Err(BuildError::NotAnInterface {
                name: bad.name().to_string(),
            });
        }

        let (parent, mut implemented) = if primary.is_interface() {
            (None, vec![primary.clone()])
        } else {
            (Some(primary.clone()), Vec::new())
        };
        implemented.extend(interfaces.iter().cloned());
        implemented.extend(strategy.extra_interfaces(&self.registry));

        let (claimed, accessors): (Vec<MethodInfo>, Vec<MethodInfo>) =
            pending_abstract_methods(parent.as_ref(), &implemented, &[])
                .into_iter()
                .partition(|m| strategy.handles(m));
        let accessors = accessors
            .into_iter()
            .map(|m| self.classify(m))
            .collect::<Result<Vec<_>, _>>()?;

        let plans = self.plan_properties(&accessors)?;
        let first_slot = parent.as_ref().map_or(0, |p| p.field_count());
        let mut fields = Vec::new();
        let storage = strategy.layout(parent.as_ref(), &plans, first_slot, &mut fields)?;

        let mut supertypes: Vec<ClassRef> = parent.iter().cloned().collect();
        supertypes.extend(implemented.iter().cloned());

        let layout: Vec<(PropertyPlan, Storage)> = plans.into_iter().zip(storage).collect();
        let mut methods = strategy.extra_methods(&claimed, first_slot);
        for accessor in &accessors {
            if let Some((plan, storage)) = layout.iter().find(|(p, _)| p.name == accessor.property) {
                methods.push(self.implement(accessor, plan, storage.clone(), &strategy, &supertypes));
            }
        }

        let mut definition = ClassDefinition::class(String::new());
        definition.parent = parent;
        definition.interfaces = implemented;
        definition.fields = fields;
        definition.methods = methods;

        let class = self.register(primary, definition)?;
        debug!(
            class = class.name(),
            strategy = strategy.name(),
            properties = layout.len(),
            "generated accessor class"
        );
        Ok(class)
    }

    /// Register under the next free `<Primary><suffix><n>` name
    fn register(
        &self,
        primary: &ClassRef,
        mut definition: ClassDefinition,
    ) -> Result<ClassRef, BuildError> {
        loop {
            let n = self.counter.fetch_add(1, Ordering::Relaxed);
            definition.name = format!("{}{}{}", primary.name(), self.options.class_suffix, n);
            match self.registry.define_generated(definition.clone()) {
                Err(DefineError::DuplicateClass { .. }) => continue,
                other => return Ok(other?),
            }
        }
    }

    fn classify(&self, method: MethodInfo) -> Result<Accessor, BuildError> {
        let getter = (method.arity() == 0 && !method.return_type.is_void())
            .then(|| reader_property(&method.name))
            .flatten();
        if let Some(property) = getter {
            let ty = method.return_type;
            return Ok(Accessor {
                method,
                kind: AccessorKind::Getter,
                property,
                ty,
            });
        }

        let setter = (method.arity() == 1)
            .then(|| writer_property(&method.name))
            .flatten();
        if let Some(property) = setter {
            let ty = method.params[0].ty;
            return Ok(Accessor {
                method,
                kind: AccessorKind::Setter,
                property,
                ty,
            });
        }

        Err(BuildError::CannotImplement {
            class: self
                .registry
                .type_name(Type::Class(method.declaring_class)),
            method: method.signature().to_string(),
        })
    }

    /// Fix one storage type per property
    ///
    /// Non-erased accessors must agree exactly. Erased accessors must accept
    /// the storage type; a property with only erased accessors is stored at
    /// the erased type.
    fn plan_properties(&self, accessors: &[Accessor]) -> Result<Vec<PropertyPlan>, BuildError> {
        let mut plans: Vec<PropertyPlan> = Vec::new();
        let exact = accessors.iter().filter(|a| !a.method.erased);
        let erased = accessors.iter().filter(|a| a.method.erased);

        for accessor in exact {
            match plans.iter().find(|p| p.name == accessor.property) {
                Some(plan) if plan.ty != accessor.ty => {
                    return Err(BuildError::FieldTypeMismatch {
                        property: accessor.property.clone(),
                        expected: self.registry.type_name(plan.ty),
                        actual: self.registry.type_name(accessor.ty),
                    })
                }
                Some(_) => {}
                None => plans.push(PropertyPlan {
                    name: accessor.property.clone(),
                    ty: accessor.ty,
                }),
            }
        }

        for accessor in erased {
            match plans.iter().find(|p| p.name == accessor.property) {
                Some(plan) => {
                    if !self
                        .registry
                        .is_assignable(accessor.ty.boxed(), plan.ty.boxed())
                    {
                        return Err(BuildError::FieldTypeMismatch {
                            property: accessor.property.clone(),
                            expected: self.registry.type_name(plan.ty),
                            actual: self.registry.type_name(accessor.ty),
                        });
                    }
                }
                None => plans.push(PropertyPlan {
                    name: accessor.property.clone(),
                    ty: accessor.ty,
                }),
            }
        }
        Ok(plans)
    }

    fn implement(
        &self,
        accessor: &Accessor,
        plan: &PropertyPlan,
        storage: Storage,
        strategy: &Arc<dyn AccessorStrategy>,
        supertypes: &[ClassRef],
    ) -> MethodDefinition {
        let definition = accessor.method.to_definition();
        let strategy = strategy.clone();

        match accessor.kind {
            AccessorKind::Getter => {
                let ty = accessor.ty;
                definition.body(move |this, _| strategy.load(this, &storage, ty))
            }
            AccessorKind::Setter => {
                let returns = accessor.method.return_type;
                let fluent = is_fluent(returns, supertypes);
                let slot_ty = plan.ty;
                let erased = accessor.method.erased;
                let reject_null = accessor.method.rejects_null(0);
                let method_name = accessor.method.name.clone();
                let param_name = accessor.method.params[0].name.clone();

                definition.body(move |this, args| {
                    let value = args.first().cloned().unwrap_or(Value::Null);
                    if reject_null && value.is_null() {
                        return Err(InvokeError::NullArgument {
                            class: this.class().name().to_string(),
                            method: method_name.clone(),
                            param: param_name.clone(),
                        });
                    }
                    if !value.is_instance_of(slot_ty) {
                        return Err(if erased {
                            InvokeError::ClassCast {
                                expected: slot_ty.to_string(),
                                actual: value.type_label(),
                            }
                        } else {
                            crate::class::slot_mismatch(slot_ty, &value)
                        });
                    }
                    strategy.store(this, &storage, value)?;
                    Ok(if fluent {
                        Value::Object(this.clone())
                    } else {
                        Value::default_for(returns)
                    })
                })
            }
        }
    }
}

/// Whether a setter returning `returns` can hand back the generated instance
fn is_fluent(returns: Type, supertypes: &[ClassRef]) -> bool {
    match returns {
        Type::Object => true,
        Type::Class(id) => supertypes.iter().any(|c| c.is_subclass_of(id)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, NOT_NULL};
    use crate::class::{FieldDefinition, Visibility};

    fn builder() -> DynamicClassBuilder {
        DynamicClassBuilder::new(Arc::new(ClassRegistry::new()), BuilderOptions::default())
    }

    fn person(registry: &ClassRegistry) -> ClassRef {
        registry
            .define(
                ClassDefinition::interface("Person")
                    .add_method(MethodDefinition::getter("getName", Type::String))
                    .add_method(MethodDefinition::setter("setName", Type::String))
                    .add_method(MethodDefinition::getter("getAge", Type::INT))
                    .add_method(MethodDefinition::setter("setAge", Type::INT))
                    .add_method(MethodDefinition::getter("isActive", Type::BOOLEAN)),
            )
            .unwrap()
    }

    #[test]
    fn test_field_backed_class() {
        let builder = builder();
        let iface = person(builder.registry());
        let class = builder.new_class(&iface, &[]).unwrap();

        assert_eq!(class.name(), "Person$$Bean0");
        assert!(class.is_generated());
        assert!(class.is_subclass_of(iface.id()));
        assert_eq!(class.field_count(), 3);

        let obj = class.instantiate().unwrap();
        assert_eq!(obj.invoke("getName", &[]).unwrap(), Value::Null);
        assert_eq!(obj.invoke("getAge", &[]).unwrap(), Value::Int(0));
        assert_eq!(obj.invoke("isActive", &[]).unwrap(), Value::Boolean(false));

        obj.invoke("setAge", &[Value::Int(41)]).unwrap();
        assert_eq!(obj.invoke("getAge", &[]).unwrap(), Value::Int(41));
        assert_eq!(obj.field("age").unwrap(), Value::Int(41));
    }

    #[test]
    fn test_every_call_mints_a_class() {
        let builder = builder();
        let iface = person(builder.registry());
        let a = builder.new_class(&iface, &[]).unwrap();
        let b = builder.new_class(&iface, &[]).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(b.name(), "Person$$Bean1");
    }

    #[test]
    fn test_name_collision_skips_ahead() {
        let registry = Arc::new(ClassRegistry::new());
        let iface = person(&registry);
        let first = DynamicClassBuilder::new(registry.clone(), BuilderOptions::default());
        let second = DynamicClassBuilder::new(registry, BuilderOptions::default());

        first.new_class(&iface, &[]).unwrap();
        let class = second.new_class(&iface, &[]).unwrap();
        assert_eq!(class.name(), "Person$$Bean1");
    }

    #[test]
    fn test_non_interface_rejected() {
        let builder = builder();
        let iface = person(builder.registry());
        let class = builder
            .registry()
            .define(ClassDefinition::class("Plain"))
            .unwrap();

        let before = builder.registry().len();
        let err = builder.new_class(&iface, &[class]).unwrap_err();
        assert_eq!(
            err,
            BuildError::NotAnInterface {
                name: "Plain".to_string()
            }
        );
        assert_eq!(builder.registry().len(), before);
    }

    #[test]
    fn test_cannot_implement() {
        let builder = builder();
        let iface = builder
            .registry()
            .define(
                ClassDefinition::interface("Runner")
                    .add_method(MethodDefinition::new("run").with_param("times", Type::INT).with_param("fast", Type::BOOLEAN)),
            )
            .unwrap();

        let err = builder.new_class(&iface, &[]).unwrap_err();
        assert_eq!(
            err,
            BuildError::CannotImplement {
                class: "Runner".to_string(),
                method: "run(int, boolean)".to_string()
            }
        );
    }

    #[test]
    fn test_accessor_type_mismatch() {
        let builder = builder();
        let iface = builder
            .registry()
            .define(
                ClassDefinition::interface("Odd")
                    .add_method(MethodDefinition::getter("getCount", Type::INT))
                    .add_method(MethodDefinition::setter("setCount", Type::LONG)),
            )
            .unwrap();

        let err = builder.new_class(&iface, &[]).unwrap_err();
        assert_eq!(
            err,
            BuildError::FieldTypeMismatch {
                property: "count".to_string(),
                expected: "int".to_string(),
                actual: "long".to_string()
            }
        );
    }

    #[test]
    fn test_abstract_class_primary_reuses_field() {
        let builder = builder();
        let base = builder
            .registry()
            .define(
                ClassDefinition::abstract_class("Entity")
                    .add_field(
                        FieldDefinition::new("id", Type::LONG).visibility(Visibility::Protected),
                    )
                    .add_method(MethodDefinition::getter("getId", Type::LONG))
                    .add_method(MethodDefinition::field_getter("describe", "id", Type::LONG)),
            )
            .unwrap();

        let class = builder.new_class(&base, &[]).unwrap();
        assert_eq!(class.field_count(), 1);
        assert_eq!(class.parent().unwrap().id(), base.id());

        let obj = class.instantiate().unwrap();
        obj.set_field("id", Value::Long(9)).unwrap();
        assert_eq!(obj.invoke("getId", &[]).unwrap(), Value::Long(9));
    }

    #[test]
    fn test_implemented_methods_are_skipped() {
        let builder = builder();
        let base = builder
            .registry()
            .define(
                ClassDefinition::abstract_class("Named")
                    .add_field(FieldDefinition::new("name", Type::String))
                    .add_method(MethodDefinition::field_getter("getName", "name", Type::String))
                    .add_method(MethodDefinition::setter("setName", Type::String)),
            )
            .unwrap();
        let iface = builder
            .registry()
            .define(
                ClassDefinition::interface("HasName")
                    .add_method(MethodDefinition::getter("getName", Type::String)),
            )
            .unwrap();

        let class = builder.new_class(&base, &[iface]).unwrap();
        // only setName needed an implementation; its field is synthesized
        assert_eq!(class.declared_methods().len(), 1);
        assert_eq!(class.declared_fields().len(), 1);
    }

    #[test]
    fn test_fluent_setter_returns_this() {
        let builder = builder();
        let registry = builder.registry();
        let iface = registry
            .define(ClassDefinition::interface("Fluent").add_method(
                MethodDefinition::getter("getTitle", Type::String),
            ))
            .unwrap();
        let fluent = registry
            .define(
                ClassDefinition::interface("FluentTitle")
                    .implements(&iface)
                    .add_method(
                        MethodDefinition::setter("setTitle", Type::String).returns(iface.as_type()),
                    )
                    .add_method(MethodDefinition::setter("setSubtitle", Type::String).returns(Type::INT))
                    .add_method(MethodDefinition::getter("getSubtitle", Type::String)),
            )
            .unwrap();

        let class = builder.new_class(&fluent, &[]).unwrap();
        let obj = class.instantiate().unwrap();
        let returned = obj.invoke("setTitle", &[Value::from("t")]).unwrap();
        assert_eq!(returned, Value::Object(obj.clone()));
        assert_eq!(
            obj.invoke("setSubtitle", &[Value::from("s")]).unwrap(),
            Value::Int(0)
        );
    }

    #[test]
    fn test_not_null_setter() {
        let builder = builder();
        let iface = builder
            .registry()
            .define(
                ClassDefinition::interface("Tagged")
                    .add_method(MethodDefinition::getter("getTag", Type::String))
                    .add_method(
                        MethodDefinition::setter("setTag", Type::String)
                            .annotated(Annotation::marker(NOT_NULL)),
                    ),
            )
            .unwrap();

        let class = builder.new_class(&iface, &[]).unwrap();
        let obj = class.instantiate().unwrap();
        obj.invoke("setTag", &[Value::from("a")]).unwrap();

        let err = obj.invoke("setTag", &[Value::Null]).unwrap_err();
        assert!(matches!(err, InvokeError::NullArgument { .. }));
        assert_eq!(obj.invoke("getTag", &[]).unwrap(), Value::from("a"));
    }

    #[test]
    fn test_erased_accessors_delegate_with_cast() {
        let builder = builder();
        let registry = builder.registry();
        let holder = registry
            .define(
                ClassDefinition::interface("Holder")
                    .add_method(MethodDefinition::getter("getValue", Type::Object).erased())
                    .add_method(MethodDefinition::setter("setValue", Type::Object).erased()),
            )
            .unwrap();
        let text = registry
            .define(
                ClassDefinition::interface("TextHolder")
                    .implements(&holder)
                    .add_method(MethodDefinition::getter("getValue", Type::String))
                    .add_method(MethodDefinition::setter("setValue", Type::String)),
            )
            .unwrap();

        let class = builder.new_class(&text, &[]).unwrap();
        assert_eq!(class.field_count(), 1);
        assert_eq!(class.find_field("value").unwrap().ty, Type::String);

        let obj = class.instantiate().unwrap();
        let erased_setter = class
            .declared_methods()
            .iter()
            .find(|m| m.name == "setValue" && m.erased)
            .unwrap()
            .clone();
        erased_setter.invoke(&obj, &[Value::from("x")]).unwrap();
        assert_eq!(obj.invoke("getValue", &[]).unwrap(), Value::from("x"));

        let err = erased_setter.invoke(&obj, &[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, InvokeError::ClassCast { .. }));
    }

    #[test]
    fn test_erased_type_must_accept_storage() {
        let builder = builder();
        let registry = builder.registry();
        let numeric = registry
            .define(
                ClassDefinition::interface("NumberHolder")
                    .add_method(MethodDefinition::getter("getValue", Type::Number).erased()),
            )
            .unwrap();
        let text = registry
            .define(
                ClassDefinition::interface("TextHolder")
                    .implements(&numeric)
                    .add_method(MethodDefinition::getter("getValue", Type::String)),
            )
            .unwrap();

        let err = builder.new_class(&text, &[]).unwrap_err();
        assert!(matches!(err, BuildError::FieldTypeMismatch { .. }));
    }

    #[test]
    fn test_mapper_class() {
        let builder = builder();
        let iface = person(builder.registry());
        let class = builder.new_mapper_class(&iface, &[]).unwrap();

        assert!(class.is_subclass_of(builder.registry().property_mapped().id()));
        assert_eq!(class.field_count(), 1);
        assert_eq!(class.find_field("properties").unwrap().ty, Type::Map);

        let obj = class.instantiate().unwrap();
        assert_eq!(obj.invoke("getAge", &[]).unwrap(), Value::Int(0));

        obj.invoke("setAge", &[Value::Int(7)]).unwrap();
        let map = obj.property_map().unwrap();
        assert_eq!(map.get("age"), Some(Value::Int(7)));

        map.insert("name", Value::from("Ada"));
        assert_eq!(obj.invoke("getName", &[]).unwrap(), Value::from("Ada"));

        let other = class.instantiate().unwrap();
        assert!(other.property_map().unwrap().is_empty());
    }

    #[test]
    fn test_mapper_field_name_from_options() {
        let options = BuilderOptions {
            class_suffix: "$Impl".to_string(),
            map_field: "values".to_string(),
        };
        let builder = DynamicClassBuilder::new(Arc::new(ClassRegistry::new()), options);
        let iface = person(builder.registry());
        let class = builder.new_mapper_class(&iface, &[]).unwrap();

        assert_eq!(class.name(), "Person$Impl0");
        assert!(class.find_field("values").is_some());
    }
}
