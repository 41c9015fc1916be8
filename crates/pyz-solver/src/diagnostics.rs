//! Diagnostic reporting for type argument application.
//!
//! ## Architecture: Lazy Diagnostics
//!
//! Applying type arguments happens speculatively (for example while trying
//! overloads), so reporters store structured data in a [`PendingDiagnostic`]
//! and only format strings when the diagnostic is rendered. Discarded
//! candidates never pay for `TypeFormatter` calls.

use crate::format::TypeFormatter;
use crate::intern::TypeInterner;
use crate::types::{FunctionShape, TypeId};
use pyz_common::diagnostics::{Diagnostic, diagnostic_codes, format_message, get_message_template};
use pyz_common::interner::Atom;
use pyz_common::span::SourceSpan;
use tracing::debug;

/// Receives type arguments that violate a type variable's values or bound.
///
/// Called at most once per offending parameter per application.
pub trait TypeArgumentReporter {
    fn report_incompatible_value(
        &mut self,
        func: &FunctionShape,
        offending: TypeId,
        param_name: Atom,
        context: &SourceSpan,
    );
}

impl<F> TypeArgumentReporter for F
where
    F: FnMut(&FunctionShape, TypeId, Atom, &SourceSpan),
{
    fn report_incompatible_value(
        &mut self,
        func: &FunctionShape,
        offending: TypeId,
        param_name: Atom,
        context: &SourceSpan,
    ) {
        self(func, offending, param_name, context);
    }
}

/// A structured diagnostic argument, formatted at render time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticArg {
    Type(TypeId),
    Symbol(Atom),
    /// The called signature's name, or `None` for an anonymous callable.
    Callee(Option<Atom>),
    Text(String),
}

/// A diagnostic whose message has not been formatted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDiagnostic {
    pub code: u32,
    pub span: SourceSpan,
    pub args: Vec<DiagnosticArg>,
}

impl PendingDiagnostic {
    pub fn new(code: u32, span: SourceSpan, args: Vec<DiagnosticArg>) -> Self {
        PendingDiagnostic { code, span, args }
    }

    /// Format the message and attach the source location.
    pub fn render(&self, interner: &TypeInterner) -> Diagnostic {
        let formatter = TypeFormatter::new(interner);
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| match arg {
                DiagnosticArg::Type(type_id) => formatter.format(*type_id),
                DiagnosticArg::Symbol(atom) => interner.resolve_atom(*atom).to_string(),
                DiagnosticArg::Callee(Some(atom)) => {
                    format!("\"{}\"", interner.resolve_atom(*atom))
                }
                DiagnosticArg::Callee(None) => "function".to_string(),
                DiagnosticArg::Text(text) => text.clone(),
            })
            .collect();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let message = match get_message_template(self.code) {
            Some(template) => format_message(template, &arg_refs),
            None => arg_refs.join(" "),
        };
        Diagnostic::at_span(&self.span, message, self.code)
    }
}

/// Collects pending diagnostics for later rendering.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    pending: Vec<PendingDiagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: PendingDiagnostic) {
        self.pending.push(diagnostic);
    }

    pub fn pending(&self) -> &[PendingDiagnostic] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Render every collected diagnostic, in report order.
    pub fn into_diagnostics(self, interner: &TypeInterner) -> Vec<Diagnostic> {
        self.pending.iter().map(|d| d.render(interner)).collect()
    }
}

impl TypeArgumentReporter for DiagnosticCollector {
    fn report_incompatible_value(
        &mut self,
        func: &FunctionShape,
        offending: TypeId,
        param_name: Atom,
        context: &SourceSpan,
    ) {
        debug!(
            offending = offending.0,
            param_name = param_name.0,
            file = %context.file,
            start = context.start,
            "incompatible type variable value"
        );
        self.push(PendingDiagnostic::new(
            diagnostic_codes::INCOMPATIBLE_TYPE_VAR_VALUE,
            context.clone(),
            vec![
                DiagnosticArg::Symbol(param_name),
                DiagnosticArg::Callee(func.name),
                DiagnosticArg::Type(offending),
            ],
        ));
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
