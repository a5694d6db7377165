//! Samplers turning easing sources into dense curve samples.

pub(crate) mod path;
pub(crate) mod script;
