//! Common types and utilities for the pyz type checker.
//!
//! This crate provides foundational types used across all pyz crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`SourceSpan`)
//! - Diagnostic data and message templates
//! - Solver limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::SourceSpan;

// Centralized limits and thresholds
pub mod limits;

// Diagnostic types and message lookup
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, format_message};
