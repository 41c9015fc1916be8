//! Helpers for variadic signatures.
//!
//! Two kinds of generic parameter change the arity of a signature when they
//! are substituted:
//!
//! - a type variable tuple behind `*args: *Ts` expands to one positional
//!   argument per type it is bound to
//! - a parameter specification behind `*args: P.args, **kwargs: P.kwargs`
//!   expands to the parameter list it is bound to
//!
//! The functions here locate those regions and rebuild them.

use crate::instantiate::TypeSubstitution;
use crate::intern::TypeInterner;
use crate::types::{
    ArgKind, FunctionShape, ParamInfo, ParamSpecFlavor, ParamSpecInfo, TypeData, TypeId,
};

/// Position of the first unpacked item in a type list.
pub fn find_unpack_in_list(interner: &TypeInterner, items: &[TypeId]) -> Option<usize> {
    items.iter().position(|&item| interner.is_unpack(item))
}

/// What an unpacked type variable tuple stands for under a substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnpackExpansion {
    /// A fixed, ordered list of types (bound to a tuple, or left unbound).
    Items(Vec<TypeId>),
    /// Bound to a variable-length tuple `tuple[X, ...]` (the array type).
    Homogeneous(TypeId),
    /// Bound to `Any`.
    Any,
    /// Bound to something that cannot stand for a pack.
    Invalid(TypeId),
}

impl UnpackExpansion {
    /// A single type describing the expansion, for diagnostics.
    pub fn as_type(&self, interner: &TypeInterner) -> TypeId {
        match self {
            Self::Items(items) => interner.tuple(items.clone()),
            Self::Homogeneous(array) => *array,
            Self::Any => TypeId::ANY,
            Self::Invalid(found) => *found,
        }
    }
}

/// Expand `*Ts` against a substitution.
///
/// `unpack` must be an unpack of a type variable tuple; anything else is
/// returned unchanged as a one-item list. An unbound `Ts` stays as the
/// single item `*Ts`.
pub fn expand_unpack_with_variables(
    interner: &TypeInterner,
    unpack: TypeId,
    substitution: &TypeSubstitution,
) -> UnpackExpansion {
    let Some(TypeData::Unpack(inner)) = interner.lookup(unpack) else {
        return UnpackExpansion::Items(vec![unpack]);
    };
    let Some(TypeData::TypeVarTuple(info)) = interner.lookup(inner) else {
        return UnpackExpansion::Items(vec![unpack]);
    };
    let Some(replacement) = substitution.get(info.id) else {
        return UnpackExpansion::Items(vec![unpack]);
    };
    if replacement.is_any() {
        return UnpackExpansion::Any;
    }

    match interner.lookup(replacement) {
        Some(TypeData::Tuple(list)) => UnpackExpansion::Items(interner.type_list(list).to_vec()),
        Some(TypeData::Array(_)) => UnpackExpansion::Homogeneous(replacement),
        Some(TypeData::TypeVarTuple(_)) => {
            UnpackExpansion::Items(vec![interner.unpack(replacement)])
        }
        Some(TypeData::Unpack(_)) => UnpackExpansion::Items(vec![replacement]),
        _ => UnpackExpansion::Invalid(replacement),
    }
}

/// Replace the `*args` slot with one positional argument per type.
///
/// Signatures without a star argument are returned unchanged.
pub fn replace_star_args(func: &FunctionShape, types: &[TypeId]) -> FunctionShape {
    let Some(star_index) = func.var_arg_index() else {
        return func.clone();
    };

    let mut params = Vec::with_capacity(func.params.len() + types.len());
    params.extend_from_slice(&func.params[..star_index]);
    params.extend(types.iter().map(|&t| ParamInfo::positional(t)));
    params.extend_from_slice(&func.params[star_index + 1..]);

    FunctionShape {
        params,
        ..func.clone()
    }
}

/// Locate `*args: P.args, **kwargs: P.kwargs`.
///
/// Returns the index of the `*args` slot and the specification (as `P`).
pub fn param_spec_position(
    interner: &TypeInterner,
    func: &FunctionShape,
) -> Option<(usize, ParamSpecInfo)> {
    func.params.windows(2).enumerate().find_map(|(index, pair)| {
        if pair[0].kind != ArgKind::Star || pair[1].kind != ArgKind::StarStar {
            return None;
        }
        let Some(TypeData::ParamSpec(args)) = interner.lookup(pair[0].type_id) else {
            return None;
        };
        let Some(TypeData::ParamSpec(kwargs)) = interner.lookup(pair[1].type_id) else {
            return None;
        };
        (args.id == kwargs.id
            && args.flavor == ParamSpecFlavor::Args
            && kwargs.flavor == ParamSpecFlavor::Kwargs)
            .then(|| (index, args.with_flavor(ParamSpecFlavor::Bare)))
    })
}

/// The parameter specification a signature's argument list is built around.
pub fn param_spec(interner: &TypeInterner, func: &FunctionShape) -> Option<ParamSpecInfo> {
    param_spec_position(interner, func).map(|(_, spec)| spec)
}

/// Splice the parameters carried by `replacement` over the
/// `*args: P.args, **kwargs: P.kwargs` pair.
///
/// Returns `None` when the signature has no such pair or `replacement` is
/// neither a callable nor a bare parameter list.
pub fn expand_param_spec(
    interner: &TypeInterner,
    func: &FunctionShape,
    replacement: TypeId,
) -> Option<FunctionShape> {
    let (index, _) = param_spec_position(interner, func)?;
    let spliced = interner.callable_params(replacement)?;

    let mut params = Vec::with_capacity(func.params.len() + spliced.len());
    params.extend_from_slice(&func.params[..index]);
    params.extend(spliced);
    params.extend_from_slice(&func.params[index + 2..]);

    Some(FunctionShape {
        params,
        ..func.clone()
    })
}

#[cfg(test)]
#[path = "../tests/variadic_tests.rs"]
mod tests;
