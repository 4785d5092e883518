//! Integration test: fatal error classes
//!
//! Recursion limit, deny-listed handle types, unmappable and unknown types.

use objmap_core::{Error, MapConfig, Mapper};
use objmap_ir::{FieldType, HandleKind, Object, ObjectRef, SimpleType, Value};
use objmap_schema::{TypeDescriptor, TypeRegistry};

fn chain(length: i32) -> ObjectRef {
    let head = Object::new("Node").with("Value", 0i32).into_ref();
    let mut tail = head.clone();
    for i in 1..length {
        let next = Object::new("Node").with("Value", i).into_ref();
        tail.set("Next", next.clone());
        tail = next;
    }
    head
}

fn node_registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry
        .register(
            TypeDescriptor::new("NodeVm")
                .with_field("Value", SimpleType::I64)
                .with_field("Next", "NodeVm"),
        )
        .unwrap();
    registry
}

#[test]
fn test_recursion_limit_aborts_deep_graphs() {
    let registry = node_registry();
    let mapper = Mapper::new(&registry);

    assert!(mapper.map(&chain(20).into(), "NodeVm").is_ok());

    match mapper.map(&chain(50).into(), "NodeVm") {
        Err(Error::RecursionLimit { limit, path }) => {
            assert_eq!(limit, 32);
            assert!(path.starts_with("Next.Next."));
        }
        other => panic!("Expected RecursionLimit, got {other:?}"),
    }
}

#[test]
fn test_recursion_limit_is_configurable() {
    let registry = node_registry();
    let config = MapConfig::permissive().with_max_depth(64);
    assert!(
        Mapper::new(&registry)
            .map_with_config(&chain(50).into(), "NodeVm", &config)
            .is_ok()
    );
}

#[test]
fn test_cycles_do_not_count_towards_the_limit() {
    let registry = node_registry();
    let ring = chain(10);
    let mut last = ring.clone();
    while let Some(next) = last.get("Next").and_then(|v| v.as_object().cloned()) {
        last = next;
    }
    last.set("Next", ring.clone());

    let mapped = Mapper::new(&registry).map(&ring.into(), "NodeVm").unwrap();
    assert!(mapped.as_object().is_some());
}

#[test]
fn test_disallowed_field_type() {
    let registry = TypeRegistry::new();
    registry
        .register(
            TypeDescriptor::new("Job")
                .with_field("Name", SimpleType::String)
                .with_field("Callback", FieldType::Handle(HandleKind::Callable)),
        )
        .unwrap();
    let source = Object::new("JobSource")
        .with("Name", "nightly")
        .with("Callback", "rm -rf")
        .into_ref();

    match Mapper::new(&registry).map(&source.into(), "Job") {
        Err(Error::DisallowedType { kind, path, .. }) => {
            assert_eq!(kind, HandleKind::Callable);
            assert_eq!(path, "Callback");
        }
        other => panic!("Expected DisallowedType, got {other:?}"),
    }
}

#[test]
fn test_disallowed_handle_type_as_destination_and_element() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeDescriptor::new("FileStream").as_handle(HandleKind::IoHandle))
        .unwrap();
    let mapper = Mapper::new(&registry);
    let source: Value = Object::new("Anything").into_ref().into();

    assert!(matches!(
        mapper.map(&source, "FileStream"),
        Err(Error::DisallowedType { kind: HandleKind::IoHandle, .. })
    ));
    assert!(matches!(
        mapper.map(&Value::list(vec![source]), FieldType::list_of("FileStream".into())),
        Err(Error::DisallowedType { .. })
    ));
}

#[test]
fn test_disallowed_source_type() {
    let registry = TypeRegistry::new();
    registry
        .register(TypeDescriptor::new("Socket").as_handle(HandleKind::IoHandle))
        .unwrap();
    registry
        .register(TypeDescriptor::new("Holder").with_field("Payload", FieldType::Dynamic))
        .unwrap();
    let source = Object::new("HolderSource")
        .with("Payload", Object::new("Socket").into_ref())
        .into_ref();

    assert!(matches!(
        Mapper::new(&registry).map(&source.into(), "Holder"),
        Err(Error::DisallowedType { .. })
    ));
}

#[test]
fn test_unmappable_type_on_either_side() {
    let registry = TypeRegistry::new();
    registry
        .register(
            TypeDescriptor::new("Secret")
                .with_field("Key", SimpleType::String)
                .mark_unmappable(),
        )
        .unwrap();
    registry
        .register(TypeDescriptor::new("Public").with_field("Key", SimpleType::String))
        .unwrap();
    let mapper = Mapper::new(&registry);

    let plain: Value = Object::new("Plain").with("Key", "k").into_ref().into();
    match mapper.map(&plain, "Secret") {
        Err(Error::UnmappableType(name)) => assert_eq!(name, "Secret"),
        other => panic!("Expected UnmappableType, got {other:?}"),
    }

    let secret: Value = Object::new("Secret").with("Key", "k").into_ref().into();
    assert!(matches!(mapper.map(&secret, "Public"), Err(Error::UnmappableType(_))));
}

#[test]
fn test_unknown_destination_type() {
    let registry = TypeRegistry::new();
    let source: Value = Object::new("Anything").into_ref().into();
    match Mapper::new(&registry).map(&source, "Nowhere") {
        Err(Error::UnknownType(name)) => assert_eq!(name, "Nowhere"),
        other => panic!("Expected UnknownType, got {other:?}"),
    }
}
