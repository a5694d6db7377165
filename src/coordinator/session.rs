use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::coordinator::evaluate::{Coordinator, EvaluationRequest};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Evaluation, InputKind};

/// What an editor should currently display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionView {
    /// Latest successful evaluation.
    pub evaluation: Option<Evaluation>,
    /// Latest user-facing error message.
    pub error: Option<String>,
}

struct Pending {
    cancel: CancelToken,
    task: JoinHandle<()>,
}

/// Drives evaluations for an interactive editor.
///
/// Each [`LiveSession::submit`] supersedes the previous one. Edits are debounced, except the
/// first submission and any submission that changes the input kind, which run immediately and
/// clear the view. While a debounced evaluation is pending the previous result stays visible.
pub struct LiveSession {
    coordinator: Arc<Coordinator>,
    debounce: Duration,
    view: Arc<watch::Sender<SessionView>>,
    current: Option<Pending>,
    last_kind: Option<InputKind>,
}

impl LiveSession {
    /// Session evaluating through `coordinator`, debouncing edits by `debounce`.
    pub fn new(coordinator: Arc<Coordinator>, debounce: Duration) -> Self {
        let (view, _rx) = watch::channel(SessionView::default());
        Self {
            coordinator,
            debounce,
            view: Arc::new(view),
            current: None,
            last_kind: None,
        }
    }

    /// Receiver for view updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Submit a new source, superseding any pending or running evaluation.
    pub fn submit(&mut self, kind: InputKind, source: impl Into<String>) {
        if let Some(previous) = self.current.take() {
            previous.cancel.cancel();
        }

        let immediate = self.last_kind != Some(kind);
        self.last_kind = Some(kind);
        if immediate {
            self.view.send_replace(SessionView::default());
        }

        let cancel = CancelToken::new();
        let token = cancel.clone();
        let coordinator = Arc::clone(&self.coordinator);
        let view = Arc::clone(&self.view);
        let debounce = self.debounce;
        let source = source.into();

        let task = tokio::spawn(async move {
            if !immediate {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(debounce) => {}
                }
            }

            let request = EvaluationRequest::new(kind, source).with_cancel(token.clone());
            let result = coordinator.evaluate(request).await;
            if token.is_cancelled() {
                return;
            }
            match result {
                Ok(evaluation) => {
                    view.send_replace(SessionView {
                        evaluation: Some(evaluation),
                        error: None,
                    });
                }
                Err(e) if e.is_abort() => {}
                Err(e) => {
                    view.send_replace(SessionView {
                        evaluation: None,
                        error: Some(e.user_message()),
                    });
                }
            }
        });

        self.current = Some(Pending { cancel, task });
    }

    /// Wait for the latest submission to settle.
    pub async fn settle(&mut self) {
        if let Some(pending) = self.current.take()
            && let Err(e) = pending.task.await
        {
            tracing::warn!(error = %e, "live session task failed");
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if let Some(pending) = self.current.take() {
            pending.cancel.cancel();
        }
    }
}
