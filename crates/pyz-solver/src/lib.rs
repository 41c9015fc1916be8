//! Generic Argument Application
//!
//! This crate turns a generic signature plus inferred type arguments into a
//! concrete signature. It uses:
//!
//! - **Interning**: structural types stored once, compared by `TypeId`
//! - **Substitution by id**: type parameters are keyed by a process-unique
//!   `TypeParamId`, so same-named parameters never capture each other
//! - **Explicit collaborators**: the subtype oracle and the diagnostic
//!   reporter are passed in, never looked up globally
//!
//! Key behaviors:
//! - Constrained type variables narrow to the leftmost narrowest declared value
//! - Parameter specifications and type variable tuples change the arity of
//!   the signature they are substituted into
//! - Unsatisfied constraints are reported or skipped, never fatal
mod apply_type;
mod diagnostics;
mod format;
mod instantiate;
mod intern;
mod subtype;
pub mod types;
pub mod variadic;

pub use apply_type::{
    ApplyOptions, ContractViolation, GenericApplicator, apply_generic_arguments,
    resolve_target_type, try_apply_generic_arguments,
};
pub use diagnostics::{
    DiagnosticArg, DiagnosticCollector, PendingDiagnostic, TypeArgumentReporter,
};
pub use format::TypeFormatter;
pub use instantiate::{TypeInstantiator, TypeSubstitution, instantiate_type};
pub use intern::TypeInterner;
pub use subtype::{SubtypeChecker, SubtypeOracle, is_subtype_of};
pub use types::{
    ArgKind, FunctionShape, InstanceShape, IntrinsicKind, ParamInfo, ParamSpecFlavor,
    ParamSpecInfo, ParametersShape, TypeData, TypeId, TypeParam, TypeParamId, TypeVarInfo,
    TypeVarTupleInfo,
};
pub use variadic::{
    UnpackExpansion, expand_param_spec, expand_unpack_with_variables, find_unpack_in_list,
    param_spec, param_spec_position, replace_star_args,
};

// Test modules: each is loaded by its source file via #[path = "../tests/..."].
// apply_type_tests: loaded from apply_type.rs
// diagnostics_tests: loaded from diagnostics.rs
// format_tests: loaded from format.rs
// instantiate_tests: loaded from instantiate.rs
// intern_tests: loaded from intern.rs
// subtype_tests: loaded from subtype.rs
// variadic_tests: loaded from variadic.rs
#[cfg(test)]
#[path = "../tests/application_scenarios.rs"]
mod application_scenarios;
