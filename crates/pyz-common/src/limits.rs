//! Centralized limits and thresholds for the solver.
//!
//! Both the subtype oracle and the instantiation engine walk arbitrarily
//! nested types. These constants bound that recursion so a pathological or
//! self-referential type cannot overflow the stack.

/// Maximum depth for generic type instantiation.
///
/// Prevents infinite recursion when the instantiation engine walks deeply
/// nested types. When the depth is exceeded the engine stops descending and
/// returns the type it was given, unsubstituted.
///
/// # Python example
///
/// ```python
/// # Callables nested inside callables inside tuples:
/// def f(x: Callable[[Callable[[tuple[T, ...]], T]], T]) -> T: ...
/// ```
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum depth for subtype checking.
///
/// Prevents infinite recursion when comparing nested types. A check that
/// exceeds the limit answers `false`.
///
/// # Python example
///
/// ```python
/// # Deep structural comparison of nested tuples and callables:
/// x: tuple[tuple[tuple[Callable[[int], int], ...], ...], ...]
/// ```
pub const MAX_SUBTYPE_DEPTH: u32 = 100;
