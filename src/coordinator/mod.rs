//! Queued, cancellable evaluation and the debounced live session built on it.

pub(crate) mod evaluate;
pub(crate) mod session;
