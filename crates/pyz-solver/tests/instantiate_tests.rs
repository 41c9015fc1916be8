use super::*;
use crate::types::ArgKind;

#[test]
fn test_substitution_basics() {
    let interner = TypeInterner::new();
    let t = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let u = interner.declare_type_var("U", vec![], TypeId::OBJECT);

    let mut subst = TypeSubstitution::new();
    assert!(subst.is_empty());
    subst.insert(t.id, TypeId::INT);
    assert_eq!(subst.len(), 1);
    assert!(subst.contains(t.id));
    assert!(!subst.contains(u.id));
    assert_eq!(subst.get(t.id), Some(TypeId::INT));
    assert_eq!(subst.get(u.id), None);

    // Later insert wins.
    subst.insert(t.id, TypeId::STR);
    assert_eq!(subst.len(), 1);
    assert_eq!(subst.get(t.id), Some(TypeId::STR));
}

#[test]
fn test_type_var_substitution() {
    let interner = TypeInterner::new();
    let t_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let t = interner.type_var(&t_info);

    let mut subst = TypeSubstitution::new();
    subst.insert(t_info.id, TypeId::INT);

    assert_eq!(instantiate_type(&interner, t, &subst), TypeId::INT);

    let list_t = interner.generic_instance("builtins.list", vec![t]);
    let list_int = interner.generic_instance("builtins.list", vec![TypeId::INT]);
    assert_eq!(instantiate_type(&interner, list_t, &subst), list_int);

    let optional_t = interner.union(vec![t, TypeId::NONE]);
    assert_eq!(
        instantiate_type(&interner, optional_t, &subst),
        interner.union(vec![TypeId::INT, TypeId::NONE])
    );

    // The rebuilt union is normalized again.
    let t_or_int = interner.union(vec![t, TypeId::INT]);
    assert_eq!(instantiate_type(&interner, t_or_int, &subst), TypeId::INT);
}

#[test]
fn test_unbound_parameters_are_untouched() {
    let interner = TypeInterner::new();
    let t_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    // Same name, different declaration.
    let shadow_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let shadow = interner.type_var(&shadow_info);

    let mut subst = TypeSubstitution::new();
    subst.insert(t_info.id, TypeId::INT);
    assert_eq!(instantiate_type(&interner, shadow, &subst), shadow);

    let tuple = interner.tuple(vec![shadow, TypeId::STR]);
    assert_eq!(instantiate_type(&interner, tuple, &subst), tuple);

    // Empty substitution short-circuits.
    let t = interner.type_var(&t_info);
    assert_eq!(instantiate_type(&interner, t, &TypeSubstitution::new()), t);
}

#[test]
fn test_instance_base_is_substituted() {
    let interner = TypeInterner::new();
    let t_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let t = interner.type_var(&t_info);
    let name = interner.intern_string("app.Box");
    let boxed = interner.instance(InstanceShape {
        name,
        args: vec![t],
        base: Some(interner.generic_instance("builtins.list", vec![t])),
    });

    let mut subst = TypeSubstitution::new();
    subst.insert(t_info.id, TypeId::BYTES);
    let result = instantiate_type(&interner, boxed, &subst);

    let expected = interner.instance(InstanceShape {
        name,
        args: vec![TypeId::BYTES],
        base: Some(interner.generic_instance("builtins.list", vec![TypeId::BYTES])),
    });
    assert_eq!(result, expected);
}

#[test]
fn test_tuple_splices_type_var_tuple() {
    let interner = TypeInterner::new();
    let ts_info = interner.declare_type_var_tuple("Ts");
    let unpacked = interner.unpack(interner.type_var_tuple(&ts_info));
    let tuple = interner.tuple(vec![TypeId::BOOL, unpacked, TypeId::BYTES]);

    let mut subst = TypeSubstitution::new();
    subst.insert(ts_info.id, interner.tuple(vec![TypeId::INT, TypeId::STR]));

    let result = instantiate_type(&interner, tuple, &subst);
    assert_eq!(
        result,
        interner.tuple(vec![TypeId::BOOL, TypeId::INT, TypeId::STR, TypeId::BYTES])
    );
}

#[test]
fn test_tuple_with_empty_type_var_tuple() {
    let interner = TypeInterner::new();
    let ts_info = interner.declare_type_var_tuple("Ts");
    let unpacked = interner.unpack(interner.type_var_tuple(&ts_info));
    let tuple = interner.tuple(vec![TypeId::INT, unpacked]);

    let mut subst = TypeSubstitution::new();
    subst.insert(ts_info.id, interner.tuple(vec![]));

    assert_eq!(
        instantiate_type(&interner, tuple, &subst),
        interner.tuple(vec![TypeId::INT])
    );
}

#[test]
fn test_single_homogeneous_unpack_collapses() {
    let interner = TypeInterner::new();
    let ts_info = interner.declare_type_var_tuple("Ts");
    let tuple = interner.tuple(vec![interner.unpack(interner.type_var_tuple(&ts_info))]);

    let ints = interner.array(TypeId::INT);
    let mut subst = TypeSubstitution::new();
    subst.insert(ts_info.id, ints);
    assert_eq!(instantiate_type(&interner, tuple, &subst), ints);

    // Any stands for `*tuple[Any, ...]`.
    let mut subst = TypeSubstitution::new();
    subst.insert(ts_info.id, TypeId::ANY);
    assert_eq!(
        instantiate_type(&interner, tuple, &subst),
        interner.array(TypeId::ANY)
    );
}

#[test]
fn test_homogeneous_unpack_with_prefix_stays_unpacked() {
    let interner = TypeInterner::new();
    let ts_info = interner.declare_type_var_tuple("Ts");
    let tuple = interner.tuple(vec![
        TypeId::STR,
        interner.unpack(interner.type_var_tuple(&ts_info)),
    ]);

    let ints = interner.array(TypeId::INT);
    let mut subst = TypeSubstitution::new();
    subst.insert(ts_info.id, ints);

    assert_eq!(
        instantiate_type(&interner, tuple, &subst),
        interner.tuple(vec![TypeId::STR, interner.unpack(ints)])
    );
}

#[test]
fn test_param_spec_rename_keeps_flavor() {
    let interner = TypeInterner::new();
    let p = interner.declare_param_spec("P");
    let q = interner.declare_param_spec("Q");

    let mut subst = TypeSubstitution::new();
    subst.insert(p.id, interner.param_spec(&q, ParamSpecFlavor::Bare));

    let p_args = interner.param_spec(&p, ParamSpecFlavor::Args);
    let p_kwargs = interner.param_spec(&p, ParamSpecFlavor::Kwargs);
    let p_bare = interner.param_spec(&p, ParamSpecFlavor::Bare);

    assert_eq!(
        instantiate_type(&interner, p_args, &subst),
        interner.param_spec(&q, ParamSpecFlavor::Args)
    );
    assert_eq!(
        instantiate_type(&interner, p_kwargs, &subst),
        interner.param_spec(&q, ParamSpecFlavor::Kwargs)
    );
    assert_eq!(
        instantiate_type(&interner, p_bare, &subst),
        interner.param_spec(&q, ParamSpecFlavor::Bare)
    );
}

#[test]
fn test_param_spec_components_wait_for_parameter_splice() {
    let interner = TypeInterner::new();
    let p = interner.declare_param_spec("P");
    let params = interner.parameters(vec![ParamInfo::positional(TypeId::INT)]);

    let mut subst = TypeSubstitution::new();
    subst.insert(p.id, params);

    let p_args = interner.param_spec(&p, ParamSpecFlavor::Args);
    assert_eq!(instantiate_type(&interner, p_args, &subst), p_args);
    assert_eq!(
        instantiate_type(&interner, interner.param_spec(&p, ParamSpecFlavor::Bare), &subst),
        params
    );
}

#[test]
fn test_param_spec_components_take_a_non_callable_binding() {
    let interner = TypeInterner::new();
    let p = interner.declare_param_spec("P");

    let mut subst = TypeSubstitution::new();
    subst.insert(p.id, TypeId::ANY);

    for flavor in [ParamSpecFlavor::Bare, ParamSpecFlavor::Args, ParamSpecFlavor::Kwargs] {
        let component = interner.param_spec(&p, flavor);
        assert_eq!(instantiate_type(&interner, component, &subst), TypeId::ANY);
    }
}

#[test]
fn test_nested_callable_splices_param_spec() {
    let interner = TypeInterner::new();
    let x = interner.intern_string("x");
    let y = interner.intern_string("y");
    let args = interner.intern_string("args");
    let kwargs = interner.intern_string("kwargs");
    let p = interner.declare_param_spec("P");
    let t_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);

    // def (x: int, *args: P.args, **kwargs: P.kwargs) -> T
    let inner = interner.function(FunctionShape::new(
        vec![
            ParamInfo::new(x, ArgKind::Positional, TypeId::INT),
            ParamInfo::new(args, ArgKind::Star, interner.param_spec(&p, ParamSpecFlavor::Args)),
            ParamInfo::new(
                kwargs,
                ArgKind::StarStar,
                interner.param_spec(&p, ParamSpecFlavor::Kwargs),
            ),
        ],
        interner.type_var(&t_info),
    ));

    let mut subst = TypeSubstitution::new();
    subst.insert(
        p.id,
        interner.parameters(vec![ParamInfo::new(y, ArgKind::Named, TypeId::STR)]),
    );
    subst.insert(t_info.id, TypeId::BOOL);

    let expected = interner.function(FunctionShape::new(
        vec![
            ParamInfo::new(x, ArgKind::Positional, TypeId::INT),
            ParamInfo::new(y, ArgKind::Named, TypeId::STR),
        ],
        TypeId::BOOL,
    ));
    assert_eq!(instantiate_type(&interner, inner, &subst), expected);
}

#[test]
fn test_type_guard_is_substituted() {
    let interner = TypeInterner::new();
    let t_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let t = interner.type_var(&t_info);
    let guard = FunctionShape {
        type_guard: Some(t),
        ..FunctionShape::new(vec![ParamInfo::positional(TypeId::OBJECT)], TypeId::BOOL)
    };
    let guard_fn = interner.function(guard.clone());

    let mut subst = TypeSubstitution::new();
    subst.insert(t_info.id, TypeId::STR);

    let expected = interner.function(FunctionShape {
        type_guard: Some(TypeId::STR),
        ..guard
    });
    assert_eq!(instantiate_type(&interner, guard_fn, &subst), expected);
}

#[test]
fn test_erased_types_are_flagged_unless_allowed() {
    let interner = TypeInterner::new();
    let t_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_info.id, TypeId::INT);

    let erased_tuple = interner.tuple(vec![interner.type_var(&t_info), TypeId::ERASED]);
    let expected = interner.tuple(vec![TypeId::INT, TypeId::ERASED]);

    let mut strict = TypeInstantiator::new(&interner, &subst);
    assert_eq!(strict.instantiate(erased_tuple), expected);
    assert!(strict.erased_encountered());

    let mut lenient = TypeInstantiator::new(&interner, &subst).with_allow_erased_callables(true);
    assert_eq!(lenient.instantiate(erased_tuple), expected);
    assert!(!lenient.erased_encountered());

    // The convenience entry point tolerates erased types.
    assert_eq!(instantiate_type(&interner, erased_tuple, &subst), expected);
}

#[test]
fn test_depth_limit_is_reported() {
    let interner = TypeInterner::new();
    let t_info = interner.declare_type_var("T", vec![], TypeId::OBJECT);
    let mut subst = TypeSubstitution::new();
    subst.insert(t_info.id, TypeId::INT);

    let mut deep = interner.type_var(&t_info);
    for _ in 0..(MAX_INSTANTIATION_DEPTH + 5) {
        deep = interner.array(deep);
    }
    let mut instantiator = TypeInstantiator::new(&interner, &subst);
    instantiator.instantiate(deep);
    assert!(instantiator.depth_exceeded());

    let shallow = interner.array(interner.type_var(&t_info));
    let mut instantiator = TypeInstantiator::new(&interner, &subst);
    assert_eq!(instantiator.instantiate(shallow), interner.array(TypeId::INT));
    assert!(!instantiator.depth_exceeded());
}
