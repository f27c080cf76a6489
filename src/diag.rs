//! Structured diagnostics for the synthesis pipeline.
//!
//! Every fallible step in the pipeline returns an empty or absent result and
//! attaches a [`Diagnostic`] to the shared [`DiagnosticSink`]; nothing panics
//! in non-test code. The sink is the channel the host drains after a round:
//! the round as a whole fails when any collected diagnostic carries
//! [`Severity::Error`], while individual failures never stop other types'
//! pipelines.

use std::fmt;

use thiserror::Error;

/// How serious a diagnostic is.
///
/// An `Error` fails the overall round; a `Note` is informational and does
/// not affect the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending element cannot be synthesized; the round fails.
    Error,
    /// Additional information attached to an element.
    Note,
}

/// The category of a diagnostic.
///
/// This is the full failure taxonomy of the pipeline; every diagnostic falls
/// into exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// The type's shape is not one the classifier supports.
    #[error("unsupported type shape")]
    ClassificationFailure,
    /// A required strategy hint is absent.
    #[error("missing strategy hint")]
    HintMissing,
    /// A strategy hint is present but invalid for its element.
    #[error("invalid strategy hint")]
    HintInvalid,
    /// No container shape matched and no explicit override was given.
    #[error("container shape not detected")]
    ContainerUndetectable,
    /// A named field could not be resolved on the source type.
    #[error("field not found")]
    FieldNotFound,
    /// Writing an emitted file failed.
    #[error("emission failed")]
    IoFailure,
}

/// A single structured message attached to a declarative element.
///
/// `element` names the offending element the way the host knows it (a type
/// path, a `Type::method` pair, a hint attribute); `message` carries the
/// content, including the supported alternatives where the taxonomy calls
/// for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Error or note.
    pub severity: Severity,
    /// Which category of failure this is.
    pub kind: DiagnosticKind,
    /// The element the message is attached to.
    pub element: String,
    /// Human-readable content.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Note => "note",
        };
        write!(f, "{tag}[{}]: {}: {}", self.kind, self.element, self.message)
    }
}

/// Collects diagnostics for one generation round.
///
/// The sink is owned by the host and threaded mutably through the pipeline,
/// mirroring a compiler's messager: producers append, nobody removes.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Vec<Diagnostic>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an error-severity diagnostic to `element`.
    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        element: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            kind,
            element: element.into(),
            message: message.into(),
        });
    }

    /// Attaches a note-severity diagnostic to `element`.
    pub fn note(
        &mut self,
        kind: DiagnosticKind,
        element: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.entries.push(Diagnostic {
            severity: Severity::Note,
            kind,
            element: element.into(),
            message: message.into(),
        });
    }

    /// All collected diagnostics, in attachment order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Whether any collected diagnostic is error-severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    /// The number of error-severity diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count()
    }

    /// Whether the sink is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_distinguishes_errors_from_notes() {
        let mut sink = DiagnosticSink::new();
        sink.note(DiagnosticKind::ContainerUndetectable, "Order.tags", "raw container");
        assert!(!sink.has_errors());

        sink.error(DiagnosticKind::HintMissing, "OrderSpec::total", "no copy strategy");
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn display_names_the_element() {
        let mut sink = DiagnosticSink::new();
        sink.error(DiagnosticKind::FieldNotFound, "Game::players", "no such field");
        let rendered = sink.diagnostics()[0].to_string();
        assert!(rendered.contains("Game::players"));
        assert!(rendered.contains("field not found"));
    }
}
