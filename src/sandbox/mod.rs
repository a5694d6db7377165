//! Disposable worker processes evaluating untrusted easing sources.
//!
//! The host side ([`host::SandboxHost`]) spawns one worker per evaluation and talks to it over
//! newline-delimited JSON ([`protocol`]). The worker side ([`worker::serve`]) runs the samplers
//! and answers at most one evaluation.

pub(crate) mod host;
pub(crate) mod protocol;
pub(crate) mod stack;
pub(crate) mod worker;
