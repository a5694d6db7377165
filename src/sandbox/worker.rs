use std::io::{BufRead, Write};

use crate::foundation::core::Evaluation;
use crate::foundation::error::{EasingError, EasingResult};
use crate::sample::path::sample_path;
use crate::sample::script::ScriptSampler;
use crate::sandbox::protocol::{WorkerReply, WorkerRequest};

/// Environment marker set by the host on every sandbox child.
pub const SANDBOX_ENV: &str = "LINEAR_EASING_SANDBOX";

/// `true` when the current process was spawned as a sandbox worker.
pub fn is_sandboxed() -> bool {
    std::env::var_os(SANDBOX_ENV).is_some_and(|v| v == "1")
}

/// Serve requests from `input` until EOF or `terminate-worker`.
///
/// Only the first evaluation request is run; later ones are answered with
/// [`EasingError::WorkerAlreadyUsed`].
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W) -> EasingResult<()> {
    let mut used = false;

    for line in input.lines() {
        let line = line.map_err(|e| EasingError::sandbox(format!("read request: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }

        let request: WorkerRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                let reply = WorkerReply::from(EasingError::sandbox(format!(
                    "malformed request: {e}"
                )));
                write_reply(&mut output, &reply)?;
                continue;
            }
        };

        let reply = match request {
            WorkerRequest::TerminateWorker => {
                tracing::debug!("worker terminated by host");
                return Ok(());
            }
            _ if used => WorkerReply::from(EasingError::WorkerAlreadyUsed),
            request => {
                used = true;
                match run(request) {
                    Ok(evaluation) => WorkerReply::Result(evaluation),
                    Err(err) => {
                        tracing::debug!(error = %err, "evaluation failed in worker");
                        WorkerReply::from(err)
                    }
                }
            }
        };
        write_reply(&mut output, &reply)?;
    }

    Ok(())
}

fn run(request: WorkerRequest) -> EasingResult<Evaluation> {
    match request {
        WorkerRequest::ProcessScript { source, limits } => {
            ScriptSampler::new(&limits).sample(&source)
        }
        WorkerRequest::ProcessSvg { source } => sample_path(&source),
        WorkerRequest::TerminateWorker => Err(EasingError::sandbox(
            "terminate-worker is not an evaluation",
        )),
    }
}

fn write_reply<W: Write>(output: &mut W, reply: &WorkerReply) -> EasingResult<()> {
    serde_json::to_writer(&mut *output, reply)
        .map_err(|e| EasingError::sandbox(format!("encode reply: {e}")))?;
    output
        .write_all(b"\n")
        .and_then(|()| output.flush())
        .map_err(|e| EasingError::sandbox(format!("write reply: {e}")))
}

/// Worker process entry point: serve stdin/stdout, refusing to run without the sandbox marker.
pub fn run_sandboxed_worker() -> EasingResult<()> {
    if !is_sandboxed() {
        return Err(EasingError::sandbox(format!(
            "refusing to evaluate untrusted input outside the sandbox ({SANDBOX_ENV} is not set)"
        )));
    }
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(stdin.lock(), stdout.lock())
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/worker.rs"]
mod tests;
