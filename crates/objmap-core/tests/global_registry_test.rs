//! Integration test: concurrent mapping through the process-wide registry

use objmap_core::Mapper;
use objmap_ir::{Object, SimpleType};
use objmap_schema::{TypeDescriptor, TypeRegistry};
use std::thread;

#[test]
fn test_concurrent_calls_share_the_global_registry() {
    TypeRegistry::global()
        .register(
            TypeDescriptor::new("SharedVm")
                .with_field("Id", SimpleType::I64)
                .with_field("Name", SimpleType::String),
        )
        .unwrap();

    // values are not Send, so each worker reports plain data
    let results: Vec<Vec<(i64, String)>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8i32)
            .map(|worker| {
                scope.spawn(move || {
                    let mapper = Mapper::global();
                    (0..50i32)
                        .map(|i| {
                            let id = worker * 1000 + i;
                            let source = Object::new("Shared")
                                .with("Id", id)
                                .with("Nmae", format!("w{worker}-{i}"))
                                .into_ref();
                            let mapped = mapper.map(&source.into(), "SharedVm").unwrap();
                            let mapped = mapped.as_object().unwrap();
                            let id = mapped.get("Id").and_then(|v| v.extract::<i64>()).unwrap();
                            let name = mapped.get("Name").and_then(|v| v.extract::<String>()).unwrap();
                            (id, name)
                        })
                        .collect()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (worker, pairs) in (0..8i32).zip(&results) {
        assert_eq!(pairs.len(), 50);
        for (i, (id, name)) in (0..50i32).zip(pairs) {
            assert_eq!(*id, i64::from(worker * 1000 + i));
            assert_eq!(*name, format!("w{worker}-{i}"));
        }
    }
    assert!(TypeRegistry::global().cache().contains("SharedVm"));
}
