//! Diagnostic message table.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const INCOMPATIBLE_TYPE_VAR_VALUE: u32 = 2001;
}

pub mod diagnostic_messages {
    pub const INCOMPATIBLE_TYPE_VAR_VALUE: &str =
        "Value of type variable \"{0}\" of {1} cannot be \"{2}\"";
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::INCOMPATIBLE_TYPE_VAR_VALUE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::INCOMPATIBLE_TYPE_VAR_VALUE,
    },
];
