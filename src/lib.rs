//! Turn easing scripts and SVG paths into compact CSS `linear()` easing functions.
//!
//! The pipeline:
//!
//! - Sample the source at 10 000 positions. Scripts (Rhai) always run in a disposable
//!   sandbox worker process; SVG paths run there too, or on the calling side in time slices.
//! - Simplify the dense samples with Ramer–Douglas–Peucker.
//! - Encode the survivors as minimal `linear()` tokens and, optionally, a `:root` CSS rule.
//!
//! Evaluations go through a [`Coordinator`], which queues them, enforces one worker at a
//! time, and supports cancellation. [`LiveSession`] adds the debounce policy of an
//! interactive editor on top.
#![forbid(unsafe_code)]

mod coordinator;
mod demos;
mod foundation;
mod optimize;
mod sample;
mod sandbox;

pub use crate::coordinator::evaluate::{Coordinator, EvaluationRequest, EvaluationState};
pub use crate::coordinator::session::{LiveSession, SessionView};
pub use crate::demos::{DEMOS, Demo, find_demo};
pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::config::{ChunkPolicy, Config, PathMode, ScriptLimits, SimplifyParams};
pub use crate::foundation::core::{
    CurvePoint, Evaluation, InputKind, LinearData, SAMPLE_COUNT, kebab_case,
};
pub use crate::foundation::error::{EasingError, EasingResult, ErrorKind, SourceLocation};
pub use crate::optimize::css::{CssOptions, format_css};
pub use crate::optimize::encode::{encode_linear, format_decimal};
pub use crate::optimize::optimize;
pub use crate::optimize::simplify::simplify;
pub use crate::sample::path::{
    PATH_CARRIER_NAME, normalize_path_data, sample_path, sample_path_cooperative,
    validate_path_data,
};
pub use crate::sample::script::{SCRIPT_SOURCE_NAME, ScriptSampler};
pub use crate::sandbox::host::{ReplyPort, SandboxHost, WorkerProgram};
pub use crate::sandbox::protocol::{ErrorReply, WorkerReply, WorkerRequest};
pub use crate::sandbox::stack::{
    ErrorLocationResolver, GeckoStackResolver, V8StackResolver, resolve_stack,
};
pub use crate::sandbox::worker::{SANDBOX_ENV, is_sandboxed, run_sandboxed_worker, serve};
