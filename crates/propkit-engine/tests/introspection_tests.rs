use propkit_engine::*;
use propkit_types::{Primitive, Type};
use std::sync::Arc;
use std::thread;

fn bean(engine: &Engine, name: &str, methods: Vec<MethodDefinition>) -> ObjectRef {
    let mut def = ClassDefinition::interface(name);
    for m in methods {
        def = def.add_method(m);
    }
    let iface = engine.registry().define(def).unwrap();
    engine
        .builder()
        .new_class(&iface, &[])
        .unwrap()
        .instantiate()
        .unwrap()
}

// ============================================================================
// Numeric Coercion
// ============================================================================

#[test]
fn test_long_written_to_int_setter_narrows() {
    let engine = Engine::default();
    let obj = bean(
        &engine,
        "Sized",
        vec![
            MethodDefinition::getter("getSize", Type::INT),
            MethodDefinition::setter("setSize", Type::INT),
        ],
    );
    let intro = engine.introspector();

    intro.write(&obj, "size", Value::Long(42)).unwrap();
    assert_eq!(obj.invoke("getSize", &[]).unwrap(), Value::Int(42));

    // out of range: two's-complement truncation, like intValue()
    intro.write(&obj, "size", Value::Long(i64::from(i32::MAX) + 1)).unwrap();
    assert_eq!(obj.invoke("getSize", &[]).unwrap(), Value::Int(i32::MIN));

    intro.write(&obj, "size", Value::Long(0x1_0000_0007)).unwrap();
    assert_eq!(intro.read(&obj, "size", Type::INT).unwrap(), Value::Int(7));

    intro.write(&obj, "size", Value::Double(-3.7)).unwrap();
    assert_eq!(intro.read(&obj, "size", Type::LONG).unwrap(), Value::Long(-3));
}

#[test]
fn test_read_widens_and_narrows() {
    let engine = Engine::default();
    let obj = bean(
        &engine,
        "Measured",
        vec![
            MethodDefinition::getter("getWeight", Type::DOUBLE),
            MethodDefinition::setter("setWeight", Type::DOUBLE),
        ],
    );
    let intro = engine.introspector();

    intro.write(&obj, "weight", Value::Float(2.5)).unwrap();
    assert_eq!(intro.read(&obj, "weight", Type::DOUBLE).unwrap(), Value::Double(2.5));
    assert_eq!(intro.read(&obj, "weight", Type::INT).unwrap(), Value::Int(2));
    assert_eq!(
        intro.read(&obj, "weight", Type::Boxed(Primitive::Short)).unwrap(),
        Value::Short(2)
    );
    assert_eq!(intro.read(&obj, "weight", Type::Number).unwrap(), Value::Double(2.5));
    assert_eq!(intro.read(&obj, "weight", Type::String).unwrap(), Value::from("2.5"));
}

// ============================================================================
// Boolean and String Coercion
// ============================================================================

#[test]
fn test_padded_mixed_case_string_to_boolean() {
    let engine = Engine::default();
    let obj = bean(
        &engine,
        "Toggle",
        vec![
            MethodDefinition::getter("isEnabled", Type::BOOLEAN),
            MethodDefinition::setter("setEnabled", Type::BOOLEAN),
        ],
    );
    let intro = engine.introspector();

    intro.write(&obj, "enabled", Value::from(" TRUE ")).unwrap();
    assert_eq!(intro.read(&obj, "enabled", Type::BOOLEAN).unwrap(), Value::Boolean(true));

    let err = intro
        .write(&obj, "enabled", Value::from("not-a-boolean"))
        .unwrap_err();
    match err {
        IntrospectionError::Coercion { class, key, message } => {
            assert!(class.starts_with("Toggle$$Bean"));
            assert_eq!(key, "'enabled'");
            assert!(message.contains("String"));
            assert!(message.contains("boolean"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // failed write left the value alone
    assert_eq!(obj.invoke("isEnabled", &[]).unwrap(), Value::Boolean(true));
}

#[test]
fn test_string_property_reads_as_boolean() {
    let engine = Engine::default();
    let obj = bean(
        &engine,
        "Raw",
        vec![
            MethodDefinition::getter("getText", Type::String),
            MethodDefinition::setter("setText", Type::String),
        ],
    );
    let intro = engine.introspector();

    intro.write(&obj, "text", Value::Int(12)).unwrap();
    assert_eq!(obj.invoke("getText", &[]).unwrap(), Value::from("12"));

    intro.write(&obj, "text", Value::from("False")).unwrap();
    assert_eq!(intro.read(&obj, "text", Type::BOOLEAN).unwrap(), Value::Boolean(false));

    intro.write(&obj, "text", Value::Null).unwrap();
    assert_eq!(intro.read(&obj, "text", Type::BOOLEAN).unwrap(), Value::Null);
}

#[test]
fn test_overloaded_writers_prefer_exact_type() {
    let engine = Engine::default();
    let class = engine
        .registry()
        .define(
            ClassDefinition::class("Cell")
                .add_field(FieldDefinition::new("text", Type::String))
                .add_field(FieldDefinition::new("raw", Type::Object))
                .add_method(MethodDefinition::field_setter("setValue", "raw", Type::Object))
                .add_method(MethodDefinition::field_setter("setValue", "text", Type::String))
                .add_method(MethodDefinition::field_getter("getValue", "raw", Type::Object)),
        )
        .unwrap();
    let obj = class.instantiate().unwrap();
    let intro = engine.introspector();

    intro.write(&obj, "value", Value::from("s")).unwrap();
    assert_eq!(obj.field("text").unwrap(), Value::from("s"));
    assert_eq!(obj.field("raw").unwrap(), Value::Null);

    intro.write(&obj, "value", Value::Int(3)).unwrap();
    assert_eq!(obj.field("raw").unwrap(), Value::Int(3));
}

// ============================================================================
// Descriptor Caching
// ============================================================================

#[test]
fn test_descriptor_identity() {
    let engine = Engine::default();
    let obj = bean(
        &engine,
        "Cached",
        vec![MethodDefinition::getter("getId", Type::LONG)],
    );
    let intro = engine.introspector();

    let first = intro.descriptor(obj.class()).unwrap();
    let second = intro.descriptor(obj.class()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.is_sealed());

    // a separate introspector builds its own
    let other = Introspector::new(engine.registry().clone(), IntrospectorOptions::default());
    assert!(!Arc::ptr_eq(&first, &other.descriptor(obj.class()).unwrap()));
}

#[test]
fn test_concurrent_descriptor_requests_agree() {
    let engine = Arc::new(Engine::default());
    let obj = bean(
        &engine,
        "Shared",
        vec![
            MethodDefinition::getter("getName", Type::String),
            MethodDefinition::setter("setName", Type::String),
        ],
    );
    let class = obj.class().clone();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            let class = class.clone();
            thread::spawn(move || engine.introspector().descriptor(&class).unwrap())
        })
        .collect();
    let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let cached = engine.introspector().descriptor(&class).unwrap();
    for desc in &descriptors {
        assert!(Arc::ptr_eq(desc, &cached));
    }
    assert_eq!(engine.introspector().cached(), 1);
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn test_missing_property_names_class_and_key() {
    let engine = Engine::default();
    let obj = bean(&engine, "Sparse", vec![]);

    let err = engine
        .introspector()
        .read(&obj, "ghost", Type::String)
        .unwrap_err();
    assert!(matches!(err, IntrospectionError::NoSuchProperty { .. }));
    let message = err.to_string();
    assert!(message.contains("Sparse$$Bean"));
    assert!(message.contains("ghost"));
}

#[test]
fn test_annotated_properties() {
    let engine = Engine::default();
    let column = |name: &str| Annotation::marker("Column").with("name", name);
    let iface = engine
        .registry()
        .define(
            ClassDefinition::interface("Record")
                .add_method(MethodDefinition::getter("getId", Type::LONG).annotated(column("ID")))
                .add_method(MethodDefinition::setter("setId", Type::LONG))
                .add_method(
                    MethodDefinition::getter("getTitle", Type::String).annotated(column("TITLE")),
                )
                .add_method(MethodDefinition::setter("setTitle", Type::String))
                .add_method(
                    MethodDefinition::getter("getSecret", Type::String)
                        .annotated(Annotation::marker(NOT_INTROSPECTED)),
                ),
        )
        .unwrap();
    let class = engine.builder().new_class(&iface, &[]).unwrap();
    let obj = class.instantiate().unwrap();
    obj.invoke("setId", &[Value::Long(3)]).unwrap();

    let desc = engine.introspector().descriptor(&class).unwrap();
    let by_column = desc.property_by_annotation(&column("ID")).unwrap();
    assert_eq!(by_column.read(&obj, Type::LONG).unwrap(), Value::Long(3));
    assert!(!by_column.is_writable());

    assert_eq!(desc.properties_with_annotation("Column").unwrap().len(), 2);
    assert!(desc.property_by_annotation(&column("NAME")).is_err());
    assert!(desc.has_property("title").unwrap());

    // the getter is skipped; only the private backing field remains
    let secret = desc.property("secret").unwrap();
    assert!(secret.readers().iter().all(|r| r.is_field()));
}

#[test]
fn test_mapper_marker_method_not_introspected() {
    let engine = Engine::default();
    let iface = engine
        .registry()
        .define(
            ClassDefinition::interface("Prefs")
                .add_method(MethodDefinition::getter("getLocale", Type::String))
                .add_method(MethodDefinition::setter("setLocale", Type::String)),
        )
        .unwrap();
    let class = engine.builder().new_mapper_class(&iface, &[]).unwrap();
    let obj = class.instantiate().unwrap();
    let intro = engine.introspector();

    let desc = intro.descriptor(&class).unwrap();
    assert!(!desc.has_property("propertyMap").unwrap());

    intro.write(&obj, "locale", Value::from("en_GB")).unwrap();
    assert_eq!(
        obj.property_map().unwrap().get("locale"),
        Some(Value::from("en_GB"))
    );
}
