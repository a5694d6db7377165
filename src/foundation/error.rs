use serde::{Deserialize, Serialize};

/// Convenience result type used across the crate.
pub type EasingResult<T> = Result<T, EasingError>;

/// Scheme prefix of the name under which untrusted scripts are loaded.
///
/// Error locations are only surfaced to users when they point into this source.
pub const SANDBOX_SOURCE_SCHEME: &str = "data:";

/// Location recovered from an engine stack trace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// File (or source) name of the failing frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// 1-based line number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    /// 1-based column number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    /// Name of the function executing in the failing frame, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

impl SourceLocation {
    /// `true` when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none()
            && self.line_number.is_none()
            && self.column_number.is_none()
            && self.function_name.is_none()
    }

    /// `true` when the frame points into the sandboxed user source.
    pub fn is_sandboxed_source(&self) -> bool {
        self.file_name
            .as_deref()
            .is_some_and(|f| f.starts_with(SANDBOX_SOURCE_SCHEME))
    }

    /// ` at line L, column C` when the location is displayable to the user.
    pub fn display_suffix(&self) -> Option<String> {
        if !self.is_sandboxed_source() {
            return None;
        }
        match (self.line_number, self.column_number) {
            (Some(line), Some(column)) => Some(format!(" at line {line}, column {column}")),
            _ => None,
        }
    }
}

/// Stable, serializable discriminant of [`EasingError`].
///
/// This is what crosses the sandbox boundary; the typed error is rebuilt from it on the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Script,
    NoEasingFunctionFound,
    AmbiguousEasingFunction,
    InvalidPathData,
    ZeroLengthPath,
    WorkerAlreadyUsed,
    WorkerBusy,
    Aborted,
    NonFiniteValue,
    Sandbox,
    Validation,
    Other,
}

/// Top-level error taxonomy.
#[derive(thiserror::Error, Debug)]
pub enum EasingError {
    /// The user script failed to parse or threw while running.
    #[error("{message}")]
    Script {
        /// Engine message, without position decoration.
        message: String,
        /// Engine-rendered stack text, innermost frame first.
        stack: Option<String>,
        /// Location resolved from `stack`, if any.
        location: Option<SourceLocation>,
    },

    /// The script did not define any callable global.
    #[error("cannot find an easing function: define exactly one function, ideally named `easing`")]
    NoEasingFunctionFound,

    /// The script defined several callable globals and none of them is `easing`.
    #[error("cannot pick an easing function, found several candidates: {}", candidates.join(", "))]
    AmbiguousEasingFunction {
        /// Candidate names, sorted.
        candidates: Vec<String>,
    },

    /// SVG path data is malformed or not usable as a CSS path.
    #[error("invalid path data: {0}")]
    InvalidPathData(String),

    /// SVG path has no length to sample.
    #[error("path is zero length")]
    ZeroLengthPath,

    /// A one-shot worker received a second evaluation.
    #[error("worker already used")]
    WorkerAlreadyUsed,

    /// A worker was started while another one is still active.
    #[error("worker already running")]
    WorkerBusy,

    /// Evaluation was superseded or cancelled. Not a user-facing failure.
    #[error("evaluation aborted")]
    Aborted,

    /// The sampled curve contains a non-finite coordinate.
    #[error("easing produced a non-finite value at position {pos}")]
    NonFiniteValue {
        /// Input position of the first offending sample.
        pos: f64,
    },

    /// Worker transport or protocol failure.
    #[error("sandbox error: {0}")]
    Sandbox(String),

    /// Invalid configuration or parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EasingError {
    /// Build an [`EasingError::Script`] value without a resolved location.
    pub fn script(message: impl Into<String>, stack: Option<String>) -> Self {
        Self::Script {
            message: message.into(),
            stack,
            location: None,
        }
    }

    /// Build an [`EasingError::InvalidPathData`] value.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPathData(msg.into())
    }

    /// Build an [`EasingError::Sandbox`] value.
    pub fn sandbox(msg: impl Into<String>) -> Self {
        Self::Sandbox(msg.into())
    }

    /// Build an [`EasingError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for superseded/cancelled evaluations, which callers should not display.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Serializable discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Script { .. } => ErrorKind::Script,
            Self::NoEasingFunctionFound => ErrorKind::NoEasingFunctionFound,
            Self::AmbiguousEasingFunction { .. } => ErrorKind::AmbiguousEasingFunction,
            Self::InvalidPathData(_) => ErrorKind::InvalidPathData,
            Self::ZeroLengthPath => ErrorKind::ZeroLengthPath,
            Self::WorkerAlreadyUsed => ErrorKind::WorkerAlreadyUsed,
            Self::WorkerBusy => ErrorKind::WorkerBusy,
            Self::Aborted => ErrorKind::Aborted,
            Self::NonFiniteValue { .. } => ErrorKind::NonFiniteValue,
            Self::Sandbox(_) => ErrorKind::Sandbox,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Resolved script location, if any.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Script { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// Message as shown to the user, with a location suffix for script errors.
    pub fn user_message(&self) -> String {
        let mut out = self.to_string();
        if let Some(suffix) = self.location().and_then(SourceLocation::display_suffix) {
            out.push_str(&suffix);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
