//! Front-end error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Error raised before evaluation starts
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Lexer error at {span}: {message}")]
    Lexer { message: String, span: Span },

    /// No grammar alternative matched, or input was left unconsumed.
    /// `span` is the furthest position any alternative reached and
    /// `expected` the tokens that would have been accepted there.
    #[error("Parser error at {span}: {message}")]
    Parser {
        message: String,
        span: Span,
        expected: Vec<String>,
    },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span, expected: Vec<String>) -> Self {
        Self::Parser {
            message: message.into(),
            span,
            expected,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } => Some(*span),
            Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } => message,
            Self::Parser { message, .. } => message,
            Self::Io { message } => message,
        }
    }

    /// Expected-token set of a parse failure (empty for other errors)
    pub fn expected(&self) -> &[String] {
        match self {
            Self::Parser { expected, .. } => expected,
            _ => &[],
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::io_error(err.to_string())
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        CompileError::Lexer { .. } => "Lexer",
        CompileError::Parser { .. } => "Parser",
        CompileError::Io { .. } => "IO",
    };

    let report = if let Some(span) = error.span() {
        // ariadne wants a non-empty range to draw a label
        let end = if span.end > span.start { span.end } else { span.start + 1 };
        Report::build(ReportKind::Error, (filename, span.start..end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
    };

    if report.eprint((filename, Source::from(source))).is_err() {
        eprintln!("{kind} error: {}", error.message());
    }
}
