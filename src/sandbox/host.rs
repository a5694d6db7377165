use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::foundation::config::ScriptLimits;
use crate::foundation::core::InputKind;
use crate::foundation::error::{EasingError, EasingResult};
use crate::sandbox::protocol::{WorkerReply, WorkerRequest};
use crate::sandbox::worker::SANDBOX_ENV;

/// Channel the reply to one evaluation request is delivered on.
pub type ReplyPort = oneshot::Sender<WorkerReply>;

/// Executable (plus arguments) that runs [`crate::run_sandboxed_worker`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerProgram {
    /// Path to the executable.
    pub program: PathBuf,
    /// Arguments selecting worker mode.
    pub args: Vec<String>,
}

impl WorkerProgram {
    /// Worker program at `program`, invoked with `args`.
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The running executable's own `worker` subcommand.
    pub fn current_exe() -> EasingResult<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| EasingError::sandbox(format!("resolve current executable: {e}")))?;
        Ok(Self::new(exe, ["worker"]))
    }

    /// Check that the program exists and is a regular file.
    pub async fn probe(&self) -> EasingResult<()> {
        let meta = tokio::fs::metadata(&self.program).await.map_err(|e| {
            EasingError::sandbox(format!(
                "worker program '{}' is not available: {e}",
                self.program.display()
            ))
        })?;
        if !meta.is_file() {
            return Err(EasingError::sandbox(format!(
                "worker program '{}' is not a file",
                self.program.display()
            )));
        }
        Ok(())
    }
}

struct ActiveWorker {
    child: Child,
    stdin: Option<ChildStdin>,
    ports: mpsc::UnboundedSender<ReplyPort>,
    pump: JoinHandle<()>,
}

/// Owner of at most one live sandbox worker process.
///
/// Workers run with an empty environment plus the sandbox marker, in the system temp
/// directory, and are killed when terminated or dropped.
pub struct SandboxHost {
    program: WorkerProgram,
    limits: ScriptLimits,
    active: Option<ActiveWorker>,
}

impl SandboxHost {
    /// Host spawning `program` with default script limits.
    pub fn new(program: WorkerProgram) -> Self {
        Self::with_limits(program, ScriptLimits::default())
    }

    /// Host spawning `program`, forwarding `limits` with every script request.
    pub fn with_limits(program: WorkerProgram, limits: ScriptLimits) -> Self {
        Self {
            program,
            limits,
            active: None,
        }
    }

    /// `true` while a worker is alive.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Spawn a fresh worker. Fails with [`EasingError::WorkerBusy`] if one is still active.
    pub fn start(&mut self) -> EasingResult<()> {
        if self.active.is_some() {
            return Err(EasingError::WorkerBusy);
        }

        let mut cmd = Command::new(&self.program.program);
        cmd.args(&self.program.args)
            .env_clear()
            .env(SANDBOX_ENV, "1")
            .current_dir(std::env::temp_dir())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            EasingError::sandbox(format!(
                "failed to spawn worker '{}': {e}",
                self.program.program.display()
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EasingError::sandbox("failed to open worker stdin (unexpected)"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EasingError::sandbox("failed to open worker stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EasingError::sandbox("failed to open worker stderr (unexpected)"))?;
        let stderr_drain = tokio::spawn(async move {
            let mut bytes = Vec::new();
            let _ = stderr.read_to_end(&mut bytes).await;
            bytes
        });

        let (ports, port_rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump_replies(stdout, port_rx, stderr_drain));

        tracing::debug!(pid = child.id(), "sandbox worker started");
        self.active = Some(ActiveWorker {
            child,
            stdin: Some(stdin),
            ports,
            pump,
        });
        Ok(())
    }

    /// Send one evaluation to the active worker; its reply is delivered on `port`.
    pub async fn post_evaluation_request(
        &mut self,
        kind: InputKind,
        source: &str,
        port: ReplyPort,
    ) -> EasingResult<()> {
        let worker = self
            .active
            .as_mut()
            .ok_or_else(|| EasingError::sandbox("no active worker"))?;
        let stdin = worker
            .stdin
            .as_mut()
            .ok_or_else(|| EasingError::sandbox("worker stdin is closed"))?;

        let request = WorkerRequest::evaluation(kind, source, self.limits);
        let mut line = serde_json::to_vec(&request)
            .map_err(|e| EasingError::sandbox(format!("encode request: {e}")))?;
        line.push(b'\n');

        worker
            .ports
            .send(port)
            .map_err(|_| EasingError::sandbox("worker exited before the request was sent"))?;
        stdin
            .write_all(&line)
            .await
            .map_err(|e| EasingError::sandbox(format!("write request to worker: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| EasingError::sandbox(format!("flush worker stdin: {e}")))?;
        Ok(())
    }

    /// Destroy the active worker, if any. Idempotent.
    pub async fn terminate(&mut self) {
        let Some(mut worker) = self.active.take() else {
            return;
        };

        if let Some(mut stdin) = worker.stdin.take()
            && let Ok(mut line) = serde_json::to_vec(&WorkerRequest::TerminateWorker)
        {
            line.push(b'\n');
            let _ = stdin.write_all(&line).await;
        }

        let pid = worker.child.id();
        if let Err(e) = worker.child.kill().await {
            tracing::warn!(?pid, error = %e, "failed to kill sandbox worker");
        }
        worker.pump.abort();
        tracing::debug!(?pid, "sandbox worker terminated");
    }
}

/// Forward each reply line to the next waiting port. When the worker's output ends, every
/// port still waiting gets a [`EasingError::Sandbox`] reply carrying the worker's stderr.
async fn pump_replies(
    stdout: ChildStdout,
    mut ports: mpsc::UnboundedReceiver<ReplyPort>,
    stderr_drain: JoinHandle<Vec<u8>>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let reply = serde_json::from_str::<WorkerReply>(&line).unwrap_or_else(|e| {
                    WorkerReply::from(EasingError::sandbox(format!("malformed worker reply: {e}")))
                });
                match ports.try_recv() {
                    Ok(port) => {
                        let _ = port.send(reply);
                    }
                    Err(_) => tracing::warn!("discarding unsolicited worker reply"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "reading worker stdout failed");
                break;
            }
        }
    }

    ports.close();
    let stderr = stderr_drain.await.unwrap_or_default();
    let stderr = String::from_utf8_lossy(&stderr);
    let stderr = stderr.trim();
    while let Ok(port) = ports.try_recv() {
        let detail = if stderr.is_empty() {
            "worker exited without replying".to_string()
        } else {
            format!("worker exited without replying: {stderr}")
        };
        let _ = port.send(WorkerReply::from(EasingError::sandbox(detail)));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/host.rs"]
mod tests;
