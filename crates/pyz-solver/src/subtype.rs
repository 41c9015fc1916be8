//! Subtype and same-type queries.
//!
//! The applicator only needs two answers from the type system: "is `a` a
//! subtype of `b`" and "are `a` and `b` the same type". [`SubtypeOracle`] is
//! that boundary; [`SubtypeChecker`] is the structural implementation over a
//! [`TypeInterner`].

use crate::intern::TypeInterner;
use crate::types::{ArgKind, IntrinsicKind, ParamInfo, TypeData, TypeId};
use pyz_common::limits::MAX_SUBTYPE_DEPTH;
use tracing::trace;

/// Subtype decision procedure consulted while resolving type arguments.
pub trait SubtypeOracle {
    /// `source <: target`.
    fn is_subtype(&self, source: TypeId, target: TypeId) -> bool;

    /// `a` and `b` denote the same type.
    fn is_same_type(&self, a: TypeId, b: TypeId) -> bool;
}

/// Structural subtype checker.
///
/// Rules:
/// - `Any` and the error type are compatible in both directions
/// - `Never` is a subtype of everything; everything is a subtype of `object`
/// - `bool <: int`
/// - instances follow their base chain; type arguments are invariant
/// - tuples and variable-length tuples are covariant
/// - callables are contravariant in parameters and covariant in return type
/// - a type variable is a subtype of whatever its values (or bound) are
pub struct SubtypeChecker<'a> {
    db: &'a TypeInterner,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(db: &'a TypeInterner) -> Self {
        Self { db }
    }

    fn check(&self, source: TypeId, target: TypeId, depth: u32) -> bool {
        if depth > MAX_SUBTYPE_DEPTH {
            trace!(source = source.0, target = target.0, "subtype depth exceeded");
            return false;
        }
        if source == target {
            return true;
        }
        if source.is_any() || target.is_any() || source.is_error() || target.is_error() {
            return true;
        }
        if source.is_never() || target == TypeId::OBJECT {
            return true;
        }

        let (Some(s), Some(t)) = (self.db.lookup(source), self.db.lookup(target)) else {
            return false;
        };
        let depth = depth + 1;

        match (&s, &t) {
            (TypeData::Union(list), _) => self
                .db
                .type_list(*list)
                .iter()
                .all(|&member| self.check(member, target, depth)),

            // Before the target-union arm: a constrained variable may fit a
            // union only as a whole (`T: (int, str)` <: `int | str`).
            (TypeData::TypeParameter(var), other) => {
                if let TypeData::TypeParameter(target_var) = other
                    && target_var.id == var.id
                {
                    return true;
                }
                if let TypeData::Union(list) = other
                    && self.db.type_list(*list).contains(&source)
                {
                    return true;
                }
                if var.has_values() {
                    var.values.iter().all(|&v| self.check(v, target, depth))
                } else {
                    self.check(var.upper_bound, target, depth)
                }
            }

            (_, TypeData::Union(list)) => self
                .db
                .type_list(*list)
                .iter()
                .any(|&member| self.check(source, member, depth)),
            (TypeData::ParamSpec(a), TypeData::ParamSpec(b)) => {
                a.id == b.id && a.flavor == b.flavor
            }
            (TypeData::TypeVarTuple(a), TypeData::TypeVarTuple(b)) => a.id == b.id,

            (TypeData::Intrinsic(a), TypeData::Intrinsic(b)) => {
                matches!((a, b), (IntrinsicKind::Bool, IntrinsicKind::Int))
            }

            (TypeData::Instance(shape_id), _) => {
                let Some(shape) = self.db.instance_shape(*shape_id) else {
                    return false;
                };
                if let TypeData::Instance(target_id) = &t
                    && let Some(target_shape) = self.db.instance_shape(*target_id)
                    && target_shape.name == shape.name
                {
                    return shape.args.len() == target_shape.args.len()
                        && shape
                            .args
                            .iter()
                            .zip(target_shape.args.iter())
                            .all(|(&a, &b)| self.same(a, b, depth));
                }
                match shape.base {
                    Some(base) => self.check(base, target, depth),
                    None => false,
                }
            }

            (TypeData::Tuple(s_list), TypeData::Tuple(t_list)) => {
                let s_items = self.db.type_list(*s_list);
                let t_items = self.db.type_list(*t_list);
                s_items.len() == t_items.len()
                    && s_items
                        .iter()
                        .zip(t_items.iter())
                        .all(|(&a, &b)| self.check(a, b, depth))
            }
            (TypeData::Tuple(s_list), TypeData::Array(element)) => self
                .db
                .type_list(*s_list)
                .iter()
                .all(|&item| self.tuple_item_fits(item, *element, depth)),
            (TypeData::Array(a), TypeData::Array(b)) => self.check(*a, *b, depth),

            (TypeData::Unpack(a), TypeData::Unpack(b)) => self.check(*a, *b, depth),

            (TypeData::Function(a), TypeData::Function(b)) => {
                let a = self.db.function_shape(*a);
                let b = self.db.function_shape(*b);
                self.params_compatible(&a.params, &b.params, depth)
                    && self.check(a.return_type, b.return_type, depth)
            }
            (TypeData::Parameters(a), TypeData::Parameters(b)) => {
                let a = self.db.parameters_shape(*a);
                let b = self.db.parameters_shape(*b);
                self.params_compatible(&a.params, &b.params, depth)
            }

            _ => false,
        }
    }

    /// An item of a fixed tuple against the element type of `tuple[E, ...]`.
    fn tuple_item_fits(&self, item: TypeId, element: TypeId, depth: u32) -> bool {
        match self.db.lookup(item) {
            Some(TypeData::Unpack(inner)) => match self.db.lookup(inner) {
                Some(TypeData::Array(inner_element)) => self.check(inner_element, element, depth),
                _ => false,
            },
            _ => self.check(item, element, depth),
        }
    }

    /// Parameters of `source` accept everything parameters of `target` accept.
    fn params_compatible(&self, source: &[ParamInfo], target: &[ParamInfo], depth: u32) -> bool {
        source.len() == target.len()
            && source.iter().zip(target.iter()).all(|(s, t)| {
                kinds_compatible(s.kind, t.kind) && self.check(t.type_id, s.type_id, depth)
            })
    }

    fn same(&self, a: TypeId, b: TypeId, depth: u32) -> bool {
        a == b || (!a.is_any() && !b.is_any() && self.check(a, b, depth) && self.check(b, a, depth))
    }
}

fn kinds_compatible(source: ArgKind, target: ArgKind) -> bool {
    source == target || (source == ArgKind::Optional && target == ArgKind::Positional)
}

impl SubtypeOracle for SubtypeChecker<'_> {
    fn is_subtype(&self, source: TypeId, target: TypeId) -> bool {
        self.check(source, target, 0)
    }

    fn is_same_type(&self, a: TypeId, b: TypeId) -> bool {
        self.same(a, b, 0)
    }
}

/// Convenience entry point for one-off subtype queries.
pub fn is_subtype_of(db: &TypeInterner, source: TypeId, target: TypeId) -> bool {
    SubtypeChecker::new(db).is_subtype(source, target)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
