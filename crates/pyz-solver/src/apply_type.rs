//! Applying inferred type arguments to a generic signature.
//!
//! Given `def [T, **P, *Ts] (...)` and one inferred type per type parameter
//! (each possibly absent), build the signature with those parameters
//! substituted:
//!
//! 1. Each proposed type is checked against its parameter's value list or
//!    upper bound ([`resolve_target_type`]) and recorded in a fresh
//!    [`TypeSubstitution`].
//! 2. A parameter specification bound to a parameter list is spliced over
//!    `*args: P.args, **kwargs: P.kwargs`.
//! 3. An unpacked `*args` is expanded into one positional argument per type.
//! 4. Argument types, the return type and the type guard are substituted.
//!
//! Parameters whose proposed type was absent (or skipped) stay in the
//! result's type parameter list, in declaration order.
//!
//! Unsatisfied constraints are recoverable: they are reported and the
//! original type is substituted anyway, or (with `skip_unsatisfied`) the
//! parameter is left unresolved. Malformed input from inference is not:
//! it is a [`ContractViolation`].

use crate::diagnostics::TypeArgumentReporter;
use crate::format::TypeFormatter;
use crate::instantiate::{TypeInstantiator, TypeSubstitution};
use crate::intern::TypeInterner;
use crate::subtype::SubtypeOracle;
use crate::types::{FunctionShape, ParamInfo, TypeData, TypeId, TypeParam};
use crate::variadic::{
    UnpackExpansion, expand_param_spec, expand_unpack_with_variables, find_unpack_in_list,
    param_spec_position, replace_star_args,
};
use pyz_common::span::SourceSpan;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

// =============================================================================
// Configuration and errors
// =============================================================================

/// Policy knobs for one application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Leave parameters whose proposed type violates their constraints
    /// unresolved instead of reporting them.
    pub skip_unsatisfied: bool,
    /// Tolerate erased types inside the signature being substituted.
    pub allow_erased_callables: bool,
}

impl ApplyOptions {
    #[must_use]
    pub const fn skip_unsatisfied(mut self, skip: bool) -> Self {
        self.skip_unsatisfied = skip;
        self
    }

    #[must_use]
    pub const fn allow_erased_callables(mut self, allow: bool) -> Self {
        self.allow_erased_callables = allow;
        self
    }
}

/// Malformed input to [`apply_generic_arguments`].
///
/// These indicate a bug in the caller (type inference), never a user error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("expected {expected} type arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("partial type supplied for type parameter #{index}")]
    PartialTypeArgument { index: usize },
    #[error("unpacked star argument tuple became `{found}` after substitution")]
    StarTupleCollapsed { found: String },
    #[error("expanded type variable tuple still contains an unpack at position {position}")]
    UnpackInExpandedTuple { position: usize },
    #[error("type variable tuple expanded to `{found}` instead of a list of types")]
    VariadicNotList { found: String },
    #[error("unhandled unpacked star argument type `{found}`")]
    UnhandledStarShape { found: String },
    #[error("erased type encountered while erased callables are disallowed")]
    ErasedType,
}

// =============================================================================
// Applicator
// =============================================================================

/// Applies type arguments with an explicit subtype oracle.
pub struct GenericApplicator<'a, S: SubtypeOracle + ?Sized> {
    interner: &'a TypeInterner,
    oracle: &'a S,
    options: ApplyOptions,
}

impl<'a, S: SubtypeOracle + ?Sized> GenericApplicator<'a, S> {
    pub fn new(interner: &'a TypeInterner, oracle: &'a S) -> Self {
        GenericApplicator {
            interner,
            oracle,
            options: ApplyOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ApplyOptions {
        self.options
    }

    /// Decide what a proposed type resolves to for one type parameter.
    ///
    /// Returns `None` only when the proposed type is unsatisfied and
    /// `skip_unsatisfied` is set.
    pub fn resolve_target_type<R: TypeArgumentReporter + ?Sized>(
        &self,
        param: &TypeParam,
        proposed: TypeId,
        func: &FunctionShape,
        reporter: &mut R,
        context: &SourceSpan,
    ) -> Option<TypeId> {
        let var = match param {
            TypeParam::ParamSpec(_) | TypeParam::VarTuple(_) => return Some(proposed),
            TypeParam::Var(var) => var,
        };

        let satisfied = if var.has_values() {
            if proposed.is_any() {
                return Some(proposed);
            }
            // Substituting one constrained variable for another is fine when
            // every value of the proposed variable is a value of this one.
            if let Some(TypeData::TypeParameter(other)) = self.interner.lookup(proposed)
                && other.has_values()
                && other.values.iter().all(|&v1| {
                    var.values
                        .iter()
                        .any(|&v| self.oracle.is_same_type(v, v1))
                })
            {
                return Some(proposed);
            }

            let matching: SmallVec<[TypeId; 4]> = var
                .values
                .iter()
                .copied()
                .filter(|&value| self.oracle.is_subtype(proposed, value))
                .collect();
            if let Some((&first, rest)) = matching.split_first() {
                // Narrowest match, left to right: a later match replaces the
                // current one only when it is a subtype of it.
                let mut best = first;
                for &candidate in rest {
                    if self.oracle.is_subtype(candidate, best) {
                        best = candidate;
                    }
                }
                trace!(
                    param = var.id.0,
                    proposed = proposed.0,
                    best = best.0,
                    candidates = matching.len(),
                    "narrowed to declared value"
                );
                return Some(best);
            }
            false
        } else {
            self.oracle.is_subtype(proposed, var.upper_bound)
        };

        if !satisfied {
            if self.options.skip_unsatisfied {
                debug!(
                    param = var.id.0,
                    proposed = proposed.0,
                    "skipping unsatisfied type argument"
                );
                return None;
            }
            reporter.report_incompatible_value(func, proposed, var.name, context);
        }
        Some(proposed)
    }

    /// Apply `orig_types` (one per declared type parameter) to `func`.
    pub fn apply<R: TypeArgumentReporter + ?Sized>(
        &self,
        func: &FunctionShape,
        orig_types: &[Option<TypeId>],
        reporter: &mut R,
        context: &SourceSpan,
    ) -> Result<FunctionShape, ContractViolation> {
        let type_params = &func.type_params;
        if type_params.len() != orig_types.len() {
            return Err(ContractViolation::ArityMismatch {
                expected: type_params.len(),
                actual: orig_types.len(),
            });
        }
        if let Some(index) = orig_types
            .iter()
            .position(|t| t.is_some_and(|t| self.interner.is_partial(t)))
        {
            return Err(ContractViolation::PartialTypeArgument { index });
        }

        let substitution = self.build_substitution(func, orig_types, reporter, context);
        debug!(
            declared = type_params.len(),
            resolved = substitution.len(),
            "applying generic arguments"
        );

        let callable = self.expand_param_spec(func, &substitution);

        let mut instantiator = TypeInstantiator::new(self.interner, &substitution)
            .with_allow_erased_callables(self.options.allow_erased_callables);

        let unpacked_star = callable
            .var_arg_index()
            .and_then(|index| match self.interner.lookup(callable.params[index].type_id) {
                Some(TypeData::Unpack(inner)) => Some((index, inner)),
                _ => None,
            });
        let params = match unpacked_star {
            Some((star_index, inner)) => self.expand_star_args(
                &callable,
                star_index,
                inner,
                &substitution,
                &mut instantiator,
            )?,
            None => callable
                .params
                .iter()
                .map(|p| p.with_type(instantiator.instantiate(p.type_id)))
                .collect(),
        };

        let type_guard = callable
            .type_guard
            .map(|guard| instantiator.instantiate(guard));
        let return_type = instantiator.instantiate(callable.return_type);
        if instantiator.erased_encountered() {
            return Err(ContractViolation::ErasedType);
        }

        let remaining: Vec<TypeParam> = type_params
            .iter()
            .filter(|param| !substitution.contains(param.id()))
            .cloned()
            .collect();

        Ok(FunctionShape {
            type_params: remaining,
            params,
            return_type,
            type_guard,
            ..callable
        })
    }

    fn build_substitution<R: TypeArgumentReporter + ?Sized>(
        &self,
        func: &FunctionShape,
        orig_types: &[Option<TypeId>],
        reporter: &mut R,
        context: &SourceSpan,
    ) -> TypeSubstitution {
        let mut substitution = TypeSubstitution::new();
        for (param, proposed) in func.type_params.iter().zip(orig_types) {
            let Some(proposed) = *proposed else {
                continue;
            };
            if let Some(target) =
                self.resolve_target_type(param, proposed, func, reporter, context)
            {
                substitution.insert(param.id(), target);
            }
        }
        substitution
    }

    /// Splice the parameter list bound to the signature's parameter
    /// specification, if any.
    fn expand_param_spec(
        &self,
        func: &FunctionShape,
        substitution: &TypeSubstitution,
    ) -> FunctionShape {
        let expanded = param_spec_position(self.interner, func).and_then(|(index, spec)| {
            let target = substitution.get(spec.id)?;
            let expanded = expand_param_spec(self.interner, func, target)?;
            trace!(
                param = spec.id.0,
                position = index,
                arity = expanded.params.len(),
                "spliced parameter specification"
            );
            Some(expanded)
        });
        expanded.unwrap_or_else(|| func.clone())
    }

    /// Substitute around an unpacked `*args` and expand the star slot.
    fn expand_star_args(
        &self,
        callable: &FunctionShape,
        star_index: usize,
        unpacked: TypeId,
        substitution: &TypeSubstitution,
        instantiator: &mut TypeInstantiator<'_>,
    ) -> Result<Vec<ParamInfo>, ContractViolation> {
        let params: Vec<ParamInfo> = callable
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == star_index {
                    p.clone()
                } else {
                    p.with_type(instantiator.instantiate(p.type_id))
                }
            })
            .collect();
        let callable = FunctionShape {
            params,
            ..callable.clone()
        };
        let star_type = callable.params[star_index].type_id;

        let Some(inner) = self.interner.lookup(unpacked) else {
            return Err(self.unhandled_star(unpacked));
        };
        match inner {
            TypeData::Tuple(_) => {
                let mut tuple_instantiator = TypeInstantiator::new(self.interner, substitution);
                let expanded = tuple_instantiator.instantiate(unpacked);
                if tuple_instantiator.erased_encountered() {
                    return Err(ContractViolation::ErasedType);
                }
                let Some(items) = self.interner.tuple_items(expanded) else {
                    return Err(ContractViolation::StarTupleCollapsed {
                        found: self.display(expanded),
                    });
                };
                if find_unpack_in_list(self.interner, &items).is_some() {
                    trace!(star_index, "star tuple keeps an unpack; not flattened");
                    let mut params = callable.params;
                    params[star_index] = params[star_index].with_type(expanded);
                    Ok(params)
                } else {
                    trace!(star_index, count = items.len(), "star tuple spliced");
                    Ok(replace_star_args(&callable, &items).params)
                }
            }
            TypeData::TypeVarTuple(_) => {
                match expand_unpack_with_variables(self.interner, star_type, substitution) {
                    UnpackExpansion::Items(items) => {
                        if let Some(position) = find_unpack_in_list(self.interner, &items) {
                            return Err(ContractViolation::UnpackInExpandedTuple { position });
                        }
                        trace!(star_index, count = items.len(), "type variable tuple spliced");
                        Ok(replace_star_args(&callable, &items).params)
                    }
                    other => Err(ContractViolation::VariadicNotList {
                        found: self.display(other.as_type(self.interner)),
                    }),
                }
            }
            TypeData::Intrinsic(_)
            | TypeData::Instance(_)
            | TypeData::Union(_)
            | TypeData::Array(_)
            | TypeData::Unpack(_)
            | TypeData::TypeParameter(_)
            | TypeData::ParamSpec(_)
            | TypeData::Function(_)
            | TypeData::Parameters(_)
            | TypeData::Partial(_) => Err(self.unhandled_star(unpacked)),
        }
    }

    fn unhandled_star(&self, found: TypeId) -> ContractViolation {
        ContractViolation::UnhandledStarShape {
            found: self.display(found),
        }
    }

    fn display(&self, type_id: TypeId) -> String {
        TypeFormatter::new(self.interner).format(type_id)
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Resolve one proposed type against one type parameter.
///
/// See [`GenericApplicator::resolve_target_type`].
pub fn resolve_target_type<S, R>(
    interner: &TypeInterner,
    oracle: &S,
    param: &TypeParam,
    proposed: TypeId,
    func: &FunctionShape,
    reporter: &mut R,
    context: &SourceSpan,
    skip_unsatisfied: bool,
) -> Option<TypeId>
where
    S: SubtypeOracle + ?Sized,
    R: TypeArgumentReporter + ?Sized,
{
    GenericApplicator::new(interner, oracle)
        .with_options(ApplyOptions::default().skip_unsatisfied(skip_unsatisfied))
        .resolve_target_type(param, proposed, func, reporter, context)
}

/// Apply generic type arguments to a signature, reporting contract
/// violations as errors.
pub fn try_apply_generic_arguments<S, R>(
    interner: &TypeInterner,
    oracle: &S,
    func: &FunctionShape,
    orig_types: &[Option<TypeId>],
    reporter: &mut R,
    context: &SourceSpan,
    options: ApplyOptions,
) -> Result<FunctionShape, ContractViolation>
where
    S: SubtypeOracle + ?Sized,
    R: TypeArgumentReporter + ?Sized,
{
    GenericApplicator::new(interner, oracle)
        .with_options(options)
        .apply(func, orig_types, reporter, context)
}

/// Apply generic type arguments to a signature.
///
/// For example, applying `[int]` to `def [T] (T) -> T` results in
/// `def (int) -> int`. Each type can be `None`; in that case it is not applied.
///
/// # Panics
///
/// On a [`ContractViolation`]: these are bugs in the caller and no
/// meaningful signature can be produced.
pub fn apply_generic_arguments<S, R>(
    interner: &TypeInterner,
    oracle: &S,
    func: &FunctionShape,
    orig_types: &[Option<TypeId>],
    reporter: &mut R,
    context: &SourceSpan,
    options: ApplyOptions,
) -> FunctionShape
where
    S: SubtypeOracle + ?Sized,
    R: TypeArgumentReporter + ?Sized,
{
    let result =
        try_apply_generic_arguments(interner, oracle, func, orig_types, reporter, context, options);
    match result {
        Ok(applied) => applied,
        Err(violation) => panic!("invariant violation: {violation}"),
    }
}

#[cfg(test)]
#[path = "../tests/apply_type_tests.rs"]
mod tests;
