use super::*;
use crate::types::ArgKind;

#[test]
fn test_intrinsics_are_not_interned() {
    let interner = TypeInterner::new();
    assert_eq!(
        interner.intern(TypeData::Intrinsic(IntrinsicKind::Int)),
        TypeId::INT
    );
    assert_eq!(
        interner.lookup(TypeId::STR),
        Some(TypeData::Intrinsic(IntrinsicKind::Str))
    );
    assert_eq!(interner.lookup(TypeId(TypeId::FIRST_USER + 500)), None);
}

#[test]
fn test_structural_types_dedupe() {
    let interner = TypeInterner::new();
    let a = interner.tuple(vec![TypeId::INT, TypeId::STR]);
    let b = interner.tuple(vec![TypeId::INT, TypeId::STR]);
    let c = interner.tuple(vec![TypeId::STR, TypeId::INT]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(!a.is_intrinsic());
    assert_eq!(
        interner.tuple_items(a).as_deref(),
        Some(&[TypeId::INT, TypeId::STR][..])
    );
}

#[test]
fn test_union_normalization() {
    let interner = TypeInterner::new();

    assert_eq!(interner.union(vec![]), TypeId::NEVER);
    assert_eq!(interner.union(vec![TypeId::INT]), TypeId::INT);
    assert_eq!(interner.union(vec![TypeId::INT, TypeId::NEVER]), TypeId::INT);
    assert_eq!(interner.union(vec![TypeId::INT, TypeId::ANY]), TypeId::ANY);

    let int_str = interner.union(vec![TypeId::INT, TypeId::STR, TypeId::INT]);
    let Some(TypeData::Union(list)) = interner.lookup(int_str) else {
        panic!("expected a union");
    };
    assert_eq!(&*interner.type_list(list), &[TypeId::INT, TypeId::STR]);

    // Nested unions flatten.
    let nested = interner.union(vec![int_str, TypeId::BYTES]);
    let Some(TypeData::Union(list)) = interner.lookup(nested) else {
        panic!("expected a union");
    };
    assert_eq!(
        &*interner.type_list(list),
        &[TypeId::INT, TypeId::STR, TypeId::BYTES]
    );
}

#[test]
fn test_fresh_type_param_ids_are_unique() {
    let interner = TypeInterner::new();
    let t1 = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let t2 = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    assert_eq!(t1.name, t2.name);
    assert_ne!(t1.id, t2.id);
    assert_ne!(interner.type_var(&t1), interner.type_var(&t2));
}

#[test]
fn test_param_spec_flavors_are_distinct_types() {
    let interner = TypeInterner::new();
    let p = interner.declare_param_spec("P");
    let bare = interner.param_spec(&p, ParamSpecFlavor::Bare);
    let args = interner.param_spec(&p, ParamSpecFlavor::Args);
    let kwargs = interner.param_spec(&p, ParamSpecFlavor::Kwargs);
    assert_ne!(bare, args);
    assert_ne!(args, kwargs);
    assert_eq!(bare, interner.type_param_ref(&TypeParam::ParamSpec(p)));
}

#[test]
fn test_shape_queries() {
    let interner = TypeInterner::new();
    let unpacked = interner.unpack(interner.tuple(vec![TypeId::INT]));
    assert!(interner.is_unpack(unpacked));
    assert!(!interner.is_unpack(TypeId::INT));

    let partial = interner.partial("x");
    assert!(interner.is_partial(partial));
    assert!(!interner.is_partial(unpacked));

    let x = interner.intern_string("x");
    let params = vec![ParamInfo::new(x, ArgKind::Positional, TypeId::INT)];
    let callable = interner.function(FunctionShape::new(params.clone(), TypeId::NONE));
    let bare = interner.parameters(params.clone());
    assert_eq!(interner.callable_params(callable), Some(params.clone()));
    assert_eq!(interner.callable_params(bare), Some(params));
    assert_eq!(interner.callable_params(TypeId::INT), None);
}

#[test]
fn test_concurrent_interning_agrees() {
    let interner = TypeInterner::new();
    let ids: Vec<TypeId> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| interner.tuple(vec![TypeId::INT, TypeId::FLOAT])))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("interning thread panicked"))
            .collect()
    });
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
}
