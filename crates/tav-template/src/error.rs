//! Error types for template parsing and sampling.

use crate::lexer::Span;

/// Errors that can occur while parsing a template or producing samples.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A field line or statement violates the grammar.
    #[error("parse error: {message}")]
    Parse {
        /// Byte range of the offending input in the template source.
        span: Span,
        /// Human-readable description of the grammar violation.
        message: String,
    },

    /// A template or list file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path of the file that failed to open or read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A list source contained no usable (length >= 2) lines.
    #[error("list '{0}' has no usable lines")]
    EmptySource(String),

    /// A without-replacement repeat ran out of attempts before collecting
    /// enough distinct values — the inner generator's domain is too small.
    #[error(
        "repeat wanted {wanted} distinct values but found only {found} \
         after {attempts} attempts"
    )]
    RepeatExhausted {
        /// How many distinct values the repeat asked for.
        wanted: usize,
        /// How many distinct values were actually collected.
        found: usize,
        /// The attempt bound that was hit (`EvalOptions::max_repeat_attempts`).
        attempts: usize,
    },
}

impl TemplateError {
    /// Spanned parse error constructor.
    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self::Parse {
            span,
            message: message.into(),
        }
    }

    /// The source span this error points at, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parse { span, .. } => Some(span.clone()),
            _ => None,
        }
    }
}

/// Convenience result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
