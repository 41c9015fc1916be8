//! Source locations attached to diagnostics.

use serde::Serialize;

/// A byte range inside a named source file.
///
/// This is the "context" handed to diagnostic reporters: it tells the
/// reporter where the offending call or reference lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourceSpan {
    pub file: String,
    pub start: u32,
    pub length: u32,
}

impl SourceSpan {
    #[must_use]
    pub fn new(file: impl Into<String>, start: u32, length: u32) -> Self {
        Self {
            file: file.into(),
            start,
            length,
        }
    }

    /// A span with no file, for synthesized signatures.
    #[must_use]
    pub fn synthetic() -> Self {
        Self::default()
    }
}
