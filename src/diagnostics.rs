//! Batched compiler diagnostics.
//!
//! Nothing in the compiler fails fast on user input: each pass appends to a
//! [`DiagnosticSink`] and keeps going so a single run reports every problem
//! in a class. Fatal codes suppress descriptor and bridge emission for the
//! offending class only; sibling classes are unaffected.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_PROP_NOT_VISIBLE: &str = "L-ERR-PROP-001";
pub const ERR_HOOK_NOT_VISIBLE: &str = "L-ERR-HOOK-001";
pub const ERR_UNKNOWN_PROP_REF: &str = "L-ERR-PROP-REF-001";
pub const ERR_DUPLICATE_COMPUTED: &str = "L-ERR-COMPUTED-001";
pub const ERR_UNKNOWN_CLASS: &str = "L-ERR-CLASS-001";
pub const WARN_UNKNOWN_WATCH_ROOT: &str = "L-WARN-WATCH-001";
pub const WARN_UNKNOWN_HOOK_EVENT: &str = "L-WARN-HOOK-001";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_PROP_NOT_VISIBLE => "Props are always addressable by the runtime.",
        ERR_HOOK_NOT_VISIBLE => "Hook methods are always addressable by the runtime.",
        ERR_UNKNOWN_PROP_REF => "Validators and defaults always reference a declared prop.",
        ERR_DUPLICATE_COMPUTED => "A computed property has at most one getter and one setter.",
        ERR_UNKNOWN_CLASS => "Every compiled unit names a registered component class.",
        WARN_UNKNOWN_WATCH_ROOT => "Watched paths are anchored to a declared member.",
        WARN_UNKNOWN_HOOK_EVENT => "Hook methods bind to a lifecycle event the runtime fires.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub guarantee: String,
    pub class_name: String,
    pub member: Option<String>,
}

impl Diagnostic {
    pub fn error(code: &str, message: &str, class_name: &str, member: Option<&str>) -> Self {
        Self::with_severity(Severity::Error, code, message, class_name, member)
    }

    pub fn warning(code: &str, message: &str, class_name: &str, member: Option<&str>) -> Self {
        Self::with_severity(Severity::Warning, code, message, class_name, member)
    }

    fn with_severity(
        severity: Severity,
        code: &str,
        message: &str,
        class_name: &str,
        member: Option<&str>,
    ) -> Self {
        Diagnostic {
            code: code.to_string(),
            severity,
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            class_name: class_name.to_string(),
            member: member.map(|m| m.to_string()),
        }
    }
}

/// Collects diagnostics across passes and tracks which classes hit a fatal
/// condition. Errors are fatal to their class; warnings never are.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    fatal_classes: HashSet<String>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, code: &str, message: &str, class_name: &str, member: Option<&str>) {
        self.fatal_classes.insert(class_name.to_string());
        self.diagnostics
            .push(Diagnostic::error(code, message, class_name, member));
    }

    pub fn warning(&mut self, code: &str, message: &str, class_name: &str, member: Option<&str>) {
        self.diagnostics
            .push(Diagnostic::warning(code, message, class_name, member));
    }

    /// True when `class_name` hit a condition that suppresses emission.
    pub fn is_fatal(&self, class_name: &str) -> bool {
        self.fatal_classes.contains(class_name)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.fatal_classes.is_empty()
    }
}
