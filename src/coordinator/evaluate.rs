use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell, oneshot, watch};

use crate::foundation::cancel::CancelToken;
use crate::foundation::config::{ChunkPolicy, Config, PathMode};
use crate::foundation::core::{Evaluation, InputKind};
use crate::foundation::error::{EasingError, EasingResult};
use crate::sample::path::{sample_path_cooperative, validate_path_data};
use crate::sandbox::host::{SandboxHost, WorkerProgram};
use crate::sandbox::stack::resolve_stack;

/// Lifecycle of one evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationState {
    #[default]
    Idle,
    Queued,
    SandboxStarting,
    Sampling,
    Completed,
    Failed,
    Cancelled,
}

impl EvaluationState {
    /// `true` for `Completed`, `Failed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Besides the main chain `Idle -> Queued -> SandboxStarting -> Sampling -> Completed`,
    /// `Idle -> Failed` covers path data rejected before queuing and `Queued -> Sampling`
    /// covers calling-side path sampling.
    pub fn can_advance_to(self, next: Self) -> bool {
        use EvaluationState::*;
        match (self, next) {
            (Idle, Queued) | (Queued, SandboxStarting) | (SandboxStarting, Sampling) => true,
            (Queued, Sampling) => true,
            (Sampling, Completed) => true,
            (Idle | Queued | SandboxStarting | Sampling, Failed) => true,
            (Queued | SandboxStarting | Sampling, Cancelled) => true,
            _ => false,
        }
    }
}

/// One call to [`Coordinator::evaluate`].
#[derive(Debug)]
pub struct EvaluationRequest {
    /// Kind of `source`.
    pub kind: InputKind,
    /// Script text or SVG path data.
    pub source: String,
    /// Cancels this evaluation.
    pub cancel: CancelToken,
    observer: Option<watch::Sender<EvaluationState>>,
}

impl EvaluationRequest {
    /// Request with a fresh cancellation token.
    pub fn new(kind: InputKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            cancel: CancelToken::new(),
            observer: None,
        }
    }

    /// Use `cancel` instead of the request's own token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Subscribe to state transitions of this request.
    pub fn observe(&mut self) -> watch::Receiver<EvaluationState> {
        let (tx, rx) = watch::channel(EvaluationState::Idle);
        self.observer = Some(tx);
        rx
    }
}

struct StateTracker {
    state: EvaluationState,
    observer: Option<watch::Sender<EvaluationState>>,
}

impl StateTracker {
    fn new(observer: Option<watch::Sender<EvaluationState>>) -> Self {
        Self {
            state: EvaluationState::Idle,
            observer,
        }
    }

    fn advance(&mut self, next: EvaluationState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal evaluation transition {:?} -> {next:?}",
            self.state
        );
        tracing::debug!(from = ?self.state, to = ?next, "evaluation state");
        self.state = next;
        if let Some(observer) = &self.observer {
            observer.send_replace(next);
        }
    }

    fn finish(&mut self, result: &EasingResult<Evaluation>) {
        let next = match result {
            Ok(_) => EvaluationState::Completed,
            Err(e) if e.is_abort() => EvaluationState::Cancelled,
            Err(_) => EvaluationState::Failed,
        };
        self.advance(next);
    }
}

/// Serializes evaluations through a single sandbox host.
///
/// Requests run strictly in submission order; each one's worker is torn down before the next
/// one starts.
pub struct Coordinator {
    program: WorkerProgram,
    host: Mutex<SandboxHost>,
    loaded: OnceCell<()>,
    path_mode: PathMode,
    chunks: ChunkPolicy,
}

impl Coordinator {
    /// Coordinator with default settings.
    pub fn new(program: WorkerProgram) -> Self {
        Self::from_config(program, &Config::default())
    }

    /// Coordinator using the sandbox, path and limit settings of `config`.
    pub fn from_config(program: WorkerProgram, config: &Config) -> Self {
        Self {
            host: Mutex::new(SandboxHost::with_limits(
                program.clone(),
                config.script_limits,
            )),
            program,
            loaded: OnceCell::new(),
            path_mode: config.path_mode,
            chunks: config.path_chunks,
        }
    }

    /// Evaluate `request`, waiting for every earlier request to finish first.
    ///
    /// Fails with [`EasingError::Aborted`] when the request is cancelled at any point; a result
    /// computed before the cancellation was observed is discarded.
    #[tracing::instrument(skip_all, fields(kind = ?request.kind))]
    pub async fn evaluate(&self, request: EvaluationRequest) -> EasingResult<Evaluation> {
        let EvaluationRequest {
            kind,
            source,
            cancel,
            observer,
        } = request;
        let mut state = StateTracker::new(observer);

        if kind == InputKind::SvgPath
            && let Err(e) = validate_path_data(&source)
        {
            state.advance(EvaluationState::Failed);
            return Err(e);
        }

        state.advance(EvaluationState::Queued);
        let result = self
            .run(kind, &source, &cancel, &mut state)
            .await
            .and_then(check_finite)
            .map_err(enrich);
        state.finish(&result);

        if let Err(e) = &result
            && !e.is_abort()
        {
            tracing::debug!(error = %e, "evaluation failed");
        }
        result
    }

    async fn ensure_loaded(&self) -> EasingResult<()> {
        self.loaded
            .get_or_try_init(|| self.program.probe())
            .await
            .map(|_| ())
    }

    async fn run(
        &self,
        kind: InputKind,
        source: &str,
        cancel: &CancelToken,
        state: &mut StateTracker,
    ) -> EasingResult<Evaluation> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EasingError::Aborted),
            loaded = self.ensure_loaded() => loaded?,
        }
        let mut host = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EasingError::Aborted),
            host = self.host.lock() => host,
        };
        cancel.check()?;

        // A caller that dropped its future mid-evaluation leaves its worker behind.
        host.terminate().await;

        if kind == InputKind::SvgPath && self.path_mode == PathMode::Interactive {
            state.advance(EvaluationState::Sampling);
            return sample_path_cooperative(source, cancel, &self.chunks).await;
        }

        state.advance(EvaluationState::SandboxStarting);
        host.start()?;

        let (port, reply) = oneshot::channel();
        let outcome: EasingResult<Evaluation> = async {
            host.post_evaluation_request(kind, source, port).await?;
            state.advance(EvaluationState::Sampling);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(EasingError::Aborted),
                reply = reply => reply
                    .map_err(|_| EasingError::sandbox("worker closed the reply channel"))?
                    .into_result(),
            }
        }
        .await;

        host.terminate().await;
        let evaluation = outcome?;
        cancel.check()?;
        Ok(evaluation)
    }
}

fn check_finite(evaluation: Evaluation) -> EasingResult<Evaluation> {
    match evaluation.first_non_finite() {
        Some(point) => Err(EasingError::NonFiniteValue { pos: point.pos }),
        None => Ok(evaluation),
    }
}

/// Attach the failing location to script errors whose stack points into the user source.
fn enrich(err: EasingError) -> EasingError {
    match err {
        EasingError::Script {
            message,
            stack,
            location,
        } => {
            let location = location.or_else(|| {
                stack
                    .as_deref()
                    .and_then(resolve_stack)
                    .filter(|loc| loc.is_sandboxed_source())
            });
            EasingError::Script {
                message,
                stack,
                location,
            }
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/coordinator/evaluate.rs"]
mod tests;
