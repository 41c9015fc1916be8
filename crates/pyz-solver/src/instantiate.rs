//! Generic type instantiation and substitution.
//!
//! This module handles type parameter substitution:
//! - Replacing plain type variables with their bound types
//! - Renaming parameter specifications (`P.args` -> `Q.args`)
//! - Splicing parameter lists bound to a parameter specification into nested callables
//! - Flattening unpacked tuples and variable tuples inside tuple types
//!
//! Substitution is keyed by [`TypeParamId`], never by name, so same-named
//! parameters from different scopes cannot capture each other.

use crate::intern::TypeInterner;
use crate::types::{
    FunctionShape, InstanceShape, ParamInfo, ParamSpecFlavor, ParamSpecInfo, TypeData, TypeId,
    TypeParamId,
};
use crate::variadic::{expand_param_spec, param_spec_position};
use pyz_common::limits::MAX_INSTANTIATION_DEPTH;
use rustc_hash::FxHashMap;
use tracing::trace;

/// A substitution map from type parameter ids to types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeParamId, TypeId>,
}

impl TypeSubstitution {
    /// Create an empty substitution.
    pub fn new() -> Self {
        TypeSubstitution {
            map: FxHashMap::default(),
        }
    }

    /// Add a single substitution. A later insert for the same id replaces the earlier one.
    pub fn insert(&mut self, id: TypeParamId, type_id: TypeId) {
        self.map.insert(id, type_id);
    }

    /// Get the substitution for a type parameter.
    pub fn get(&self, id: TypeParamId) -> Option<TypeId> {
        self.map.get(&id).copied()
    }

    pub fn contains(&self, id: TypeParamId) -> bool {
        self.map.contains_key(&id)
    }

    /// Check if substitution is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of substitutions.
    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Instantiator for applying type substitutions.
pub struct TypeInstantiator<'a> {
    interner: &'a TypeInterner,
    substitution: &'a TypeSubstitution,
    /// Current recursion depth.
    depth: u32,
    /// Whether an erased type may appear in the walked types.
    allow_erased_callables: bool,
    erased_encountered: bool,
    depth_exceeded: bool,
}

impl<'a> TypeInstantiator<'a> {
    pub fn new(interner: &'a TypeInterner, substitution: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            interner,
            substitution,
            depth: 0,
            allow_erased_callables: false,
            erased_encountered: false,
            depth_exceeded: false,
        }
    }

    #[must_use]
    pub fn with_allow_erased_callables(mut self, allow: bool) -> Self {
        self.allow_erased_callables = allow;
        self
    }

    /// An erased type was walked while erased callables are disallowed.
    pub fn erased_encountered(&self) -> bool {
        self.erased_encountered
    }

    pub fn depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    /// Apply the substitution to a type.
    pub fn instantiate(&mut self, type_id: TypeId) -> TypeId {
        if type_id == TypeId::ERASED {
            if !self.allow_erased_callables {
                self.erased_encountered = true;
            }
            return type_id;
        }
        if type_id.is_intrinsic() {
            return type_id;
        }
        if self.depth >= MAX_INSTANTIATION_DEPTH {
            self.depth_exceeded = true;
            trace!(type_id = type_id.0, "instantiation depth exceeded");
            return type_id;
        }

        self.depth += 1;
        let result = self.instantiate_inner(type_id);
        self.depth -= 1;
        result
    }

    fn instantiate_inner(&mut self, type_id: TypeId) -> TypeId {
        let Some(data) = self.interner.lookup(type_id) else {
            return type_id;
        };

        match data {
            TypeData::Intrinsic(_) | TypeData::Partial(_) => type_id,
            TypeData::TypeParameter(info) => self.substitution.get(info.id).unwrap_or(type_id),
            TypeData::TypeVarTuple(info) => self.substitution.get(info.id).unwrap_or(type_id),
            TypeData::ParamSpec(info) => self.instantiate_param_spec(type_id, &info),
            TypeData::Instance(shape_id) => {
                let Some(shape) = self.interner.instance_shape(shape_id) else {
                    return type_id;
                };
                let args = self.instantiate_all(&shape.args);
                let base = shape.base.map(|base| self.instantiate(base));
                if args == shape.args && base == shape.base {
                    return type_id;
                }
                self.interner.instance(InstanceShape {
                    name: shape.name,
                    args,
                    base,
                })
            }
            TypeData::Union(list) => {
                let members = self.interner.type_list(list);
                let members = self.instantiate_all(&members);
                self.interner.union(members)
            }
            TypeData::Tuple(list) => {
                let items = self.interner.type_list(list);
                self.instantiate_tuple(&items)
            }
            TypeData::Array(element) => {
                let element = self.instantiate(element);
                self.interner.array(element)
            }
            TypeData::Unpack(inner) => {
                let inner = self.instantiate(inner);
                self.interner.unpack(inner)
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                let shape = self.instantiate_function(&shape);
                self.interner.function(shape)
            }
            TypeData::Parameters(shape_id) => {
                let shape = self.interner.parameters_shape(shape_id);
                let params = self.instantiate_params(&shape.params);
                self.interner.parameters(params)
            }
        }
    }

    fn instantiate_all(&mut self, types: &[TypeId]) -> Vec<TypeId> {
        types.iter().map(|&t| self.instantiate(t)).collect()
    }

    fn instantiate_params(&mut self, params: &[ParamInfo]) -> Vec<ParamInfo> {
        params
            .iter()
            .map(|p| p.with_type(self.instantiate(p.type_id)))
            .collect()
    }

    /// `P` binds to whatever the substitution says. `P.args` / `P.kwargs`
    /// follow a rename, are left for the enclosing callable to splice when
    /// bound to a parameter list, and otherwise become the bound type itself.
    fn instantiate_param_spec(&mut self, type_id: TypeId, info: &ParamSpecInfo) -> TypeId {
        let Some(target) = self.substitution.get(info.id) else {
            return type_id;
        };
        match self.interner.lookup(target) {
            Some(TypeData::ParamSpec(renamed)) => self
                .interner
                .intern(TypeData::ParamSpec(renamed.with_flavor(info.flavor))),
            Some(TypeData::Function(_) | TypeData::Parameters(_))
                if info.flavor != ParamSpecFlavor::Bare =>
            {
                type_id
            }
            _ => target,
        }
    }

    /// Substitute tuple items, splicing unpacked tuples in place.
    ///
    /// `tuple[*tuple[X, ...]]` collapses to `tuple[X, ...]`.
    fn instantiate_tuple(&mut self, items: &[TypeId]) -> TypeId {
        let mut result = Vec::with_capacity(items.len());
        for &item in items {
            let Some(TypeData::Unpack(inner)) = self.interner.lookup(item) else {
                result.push(self.instantiate(item));
                continue;
            };
            let expanded = self.instantiate(inner);
            if expanded.is_any() {
                let any_tuple = self.interner.array(TypeId::ANY);
                result.push(self.interner.unpack(any_tuple));
                continue;
            }
            match self.interner.lookup(expanded) {
                Some(TypeData::Tuple(list)) => {
                    result.extend(self.interner.type_list(list).iter().copied());
                }
                _ => result.push(self.interner.unpack(expanded)),
            }
        }

        if let [single] = result.as_slice()
            && let Some(TypeData::Unpack(inner)) = self.interner.lookup(*single)
            && matches!(self.interner.lookup(inner), Some(TypeData::Array(_)))
        {
            return inner;
        }
        self.interner.tuple(result)
    }

    /// Substitute a nested callable, splicing its parameter specification first.
    fn instantiate_function(&mut self, shape: &FunctionShape) -> FunctionShape {
        let spliced = param_spec_position(self.interner, shape)
            .and_then(|(_, spec)| self.substitution.get(spec.id))
            .and_then(|target| expand_param_spec(self.interner, shape, target));
        let shape = spliced.as_ref().unwrap_or(shape);

        FunctionShape {
            name: shape.name,
            type_params: shape.type_params.clone(),
            params: self.instantiate_params(&shape.params),
            return_type: self.instantiate(shape.return_type),
            type_guard: shape.type_guard.map(|guard| self.instantiate(guard)),
        }
    }
}

/// Instantiate a type with a substitution.
///
/// Erased types are left in place; use [`TypeInstantiator`] directly to
/// detect them.
pub fn instantiate_type(
    interner: &TypeInterner,
    type_id: TypeId,
    substitution: &TypeSubstitution,
) -> TypeId {
    if substitution.is_empty() {
        return type_id;
    }
    TypeInstantiator::new(interner, substitution)
        .with_allow_erased_callables(true)
        .instantiate(type_id)
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
