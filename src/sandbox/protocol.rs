use serde::{Deserialize, Serialize};

use crate::foundation::config::ScriptLimits;
use crate::foundation::core::{Evaluation, InputKind};
use crate::foundation::error::{EasingError, ErrorKind, SourceLocation};

/// Host-to-worker message. One JSON object per line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum WorkerRequest {
    /// Sample an easing script.
    ProcessScript {
        source: String,
        #[serde(default)]
        limits: ScriptLimits,
    },
    /// Sample SVG path data.
    ProcessSvg { source: String },
    /// Exit without replying.
    TerminateWorker,
}

impl WorkerRequest {
    /// Evaluation request for `kind`.
    pub fn evaluation(kind: InputKind, source: impl Into<String>, limits: ScriptLimits) -> Self {
        let source = source.into();
        match kind {
            InputKind::Script => Self::ProcessScript { source, limits },
            InputKind::SvgPath => Self::ProcessSvg { source },
        }
    }
}

/// Worker-to-host message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkerReply {
    /// Dense samples plus carrier name.
    Result(Evaluation),
    /// Structured failure.
    Error(ErrorReply),
}

/// Serialized form of [`EasingError`] crossing the sandbox boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReply {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<f64>,
    #[serde(flatten)]
    pub location: SourceLocation,
}

impl From<&EasingError> for ErrorReply {
    fn from(err: &EasingError) -> Self {
        let (stack, candidates, pos) = match err {
            EasingError::Script { stack, .. } => (stack.clone(), Vec::new(), None),
            EasingError::AmbiguousEasingFunction { candidates } => {
                (None, candidates.clone(), None)
            }
            EasingError::NonFiniteValue { pos } => (None, Vec::new(), Some(*pos)),
            _ => (None, Vec::new(), None),
        };
        let message = match err {
            EasingError::Script { message, .. } => message.clone(),
            EasingError::InvalidPathData(detail) => detail.clone(),
            EasingError::Sandbox(detail) | EasingError::Validation(detail) => detail.clone(),
            other => other.to_string(),
        };
        Self {
            kind: err.kind(),
            message,
            stack,
            candidates,
            pos,
            location: err.location().cloned().unwrap_or_default(),
        }
    }
}

impl From<ErrorReply> for EasingError {
    fn from(reply: ErrorReply) -> Self {
        let ErrorReply {
            kind,
            message,
            stack,
            candidates,
            pos,
            location,
        } = reply;
        match kind {
            ErrorKind::Script => EasingError::Script {
                message,
                stack,
                location: (!location.is_empty()).then_some(location),
            },
            ErrorKind::NoEasingFunctionFound => EasingError::NoEasingFunctionFound,
            ErrorKind::AmbiguousEasingFunction => {
                EasingError::AmbiguousEasingFunction { candidates }
            }
            ErrorKind::InvalidPathData => EasingError::InvalidPathData(message),
            ErrorKind::ZeroLengthPath => EasingError::ZeroLengthPath,
            ErrorKind::WorkerAlreadyUsed => EasingError::WorkerAlreadyUsed,
            ErrorKind::WorkerBusy => EasingError::WorkerBusy,
            ErrorKind::Aborted => EasingError::Aborted,
            ErrorKind::NonFiniteValue => EasingError::NonFiniteValue {
                pos: pos.unwrap_or(f64::NAN),
            },
            ErrorKind::Sandbox => EasingError::Sandbox(message),
            ErrorKind::Validation => EasingError::Validation(message),
            ErrorKind::Other => EasingError::Other(anyhow::anyhow!(message)),
        }
    }
}

impl From<EasingError> for WorkerReply {
    fn from(err: EasingError) -> Self {
        Self::Error(ErrorReply::from(&err))
    }
}

impl WorkerReply {
    /// Convert into the evaluation result the host hands to callers.
    pub fn into_result(self) -> Result<Evaluation, EasingError> {
        match self {
            Self::Result(evaluation) => Ok(evaluation),
            Self::Error(reply) => Err(reply.into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/protocol.rs"]
mod tests;
