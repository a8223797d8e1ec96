use propkit_engine::*;
use propkit_types::Type;
use std::io::Write;

#[test]
fn test_options_file_drives_generated_names() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[builder]
class_suffix = "_Impl"
map_field = "store"
"#
    )
    .unwrap();

    let options = EngineOptions::from_file(file.path()).unwrap();
    let engine = Engine::new(options);
    let iface = engine
        .registry()
        .define(
            ClassDefinition::interface("Config")
                .add_method(MethodDefinition::getter("getPort", Type::INT))
                .add_method(MethodDefinition::setter("setPort", Type::INT)),
        )
        .unwrap();

    let bean = engine.builder().new_class(&iface, &[]).unwrap();
    assert_eq!(bean.name(), "Config_Impl0");

    let mapper = engine.builder().new_mapper_class(&iface, &[]).unwrap();
    assert_eq!(mapper.name(), "Config_Impl1");
    let obj = mapper.instantiate().unwrap();
    obj.invoke("setPort", &[Value::Int(8080)]).unwrap();
    match obj.field("store").unwrap() {
        Value::Map(map) => assert_eq!(map.get("port"), Some(Value::Int(8080))),
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn test_fields_excluded_from_introspection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("propkit.toml");
    std::fs::write(&path, "[introspection]\ninclude_fields = false\n").unwrap();

    let engine = Engine::new(EngineOptions::from_file(&path).unwrap());
    let class = engine
        .registry()
        .define(
            ClassDefinition::class("Point")
                .add_field(FieldDefinition::new("x", Type::INT).visibility(Visibility::Public))
                .add_method(MethodDefinition::field_getter("getY", "x", Type::INT)),
        )
        .unwrap();

    let desc = engine.introspector().descriptor(&class).unwrap();
    assert!(!desc.has_property("x").unwrap());
    assert!(desc.has_property("y").unwrap());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineOptions::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, OptionsError::IoError(_)));
}
