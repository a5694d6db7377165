use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{EasingError, EasingResult};
use crate::optimize::css::CssOptions;

/// Simplification and rounding parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyParams {
    /// Ramer–Douglas–Peucker distance threshold in curve space.
    pub tolerance: f64,
    /// Decimal digits kept for values; positions keep two fewer.
    pub precision: u32,
}

impl SimplifyParams {
    /// Interactive tolerance range.
    pub const MIN_TOLERANCE: f64 = 0.00001;
    /// Interactive tolerance range.
    pub const MAX_TOLERANCE: f64 = 0.025;
    /// Interactive precision range.
    pub const MIN_PRECISION: u32 = 2;
    /// Interactive precision range.
    pub const MAX_PRECISION: u32 = 5;

    /// Create parameters.
    pub fn new(tolerance: f64, precision: u32) -> Self {
        Self {
            tolerance,
            precision,
        }
    }

    /// Clamp both parameters into the interactive ranges. A NaN tolerance becomes the minimum.
    pub fn clamped(self) -> Self {
        let tolerance = if self.tolerance.is_nan() {
            Self::MIN_TOLERANCE
        } else {
            self.tolerance
                .clamp(Self::MIN_TOLERANCE, Self::MAX_TOLERANCE)
        };
        Self {
            tolerance,
            precision: self
                .precision
                .clamp(Self::MIN_PRECISION, Self::MAX_PRECISION),
        }
    }

    /// Reject parameters no formatter or simplifier can honor.
    pub fn validate(&self) -> EasingResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(EasingError::validation(format!(
                "tolerance must be a finite, non-negative number (got {})",
                self.tolerance
            )));
        }
        if self.precision > 20 {
            return Err(EasingError::validation(format!(
                "precision must be at most 20 digits (got {})",
                self.precision
            )));
        }
        Ok(())
    }
}

impl Default for SimplifyParams {
    fn default() -> Self {
        Self {
            tolerance: 0.002,
            precision: 3,
        }
    }
}

/// Time slicing for path sampling on the interactive side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkPolicy {
    /// Maximum uninterrupted work per slice, in milliseconds.
    pub slice_ms: u64,
    /// Pause between slices (one frame), in milliseconds.
    pub frame_ms: u64,
}

impl ChunkPolicy {
    /// Slice budget.
    pub fn slice(&self) -> Duration {
        Duration::from_millis(self.slice_ms)
    }

    /// Pause between slices.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            slice_ms: 16,
            frame_ms: 16,
        }
    }
}

/// Interpreter limits applied to untrusted scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptLimits {
    /// Operation budget per script; `None` is unlimited.
    pub max_operations: Option<u64>,
    /// Maximum function call depth.
    pub max_call_levels: usize,
    /// Maximum expression nesting (global and in functions).
    pub max_expr_depth: usize,
    /// Maximum string length.
    pub max_string_size: usize,
    /// Maximum array length.
    pub max_array_size: usize,
    /// Maximum object map size.
    pub max_map_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_operations: None,
            max_call_levels: 64,
            max_expr_depth: 64,
            max_string_size: 10_000,
            max_array_size: 10_000,
            max_map_size: 1_000,
        }
    }
}

/// Where SVG paths are sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMode {
    /// In the disposable sandbox worker, like scripts.
    #[default]
    Sandbox,
    /// On the calling side, in cooperative time slices.
    Interactive,
}

/// Complete configuration, loadable from JSON. Missing fields take defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simplification and rounding.
    pub simplify: SimplifyParams,
    /// Idle time before a non-urgent re-evaluation, in milliseconds.
    pub debounce_ms: u64,
    /// Where SVG paths are sampled.
    pub path_mode: PathMode,
    /// Time slicing for interactive path sampling.
    pub path_chunks: ChunkPolicy,
    /// Interpreter limits for untrusted scripts.
    pub script_limits: ScriptLimits,
    /// CSS output formatting.
    pub css: CssOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simplify: SimplifyParams::default(),
            debounce_ms: 300,
            path_mode: PathMode::default(),
            path_chunks: ChunkPolicy::default(),
            script_limits: ScriptLimits::default(),
            css: CssOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration JSON from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> EasingResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EasingError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Load configuration JSON from a reader.
    pub fn from_reader(r: impl Read) -> EasingResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| EasingError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> EasingResult<()> {
        self.simplify.validate()?;
        if self.path_chunks.slice_ms == 0 {
            return Err(EasingError::validation("path_chunks.slice_ms must be non-zero"));
        }
        if self.script_limits.max_operations == Some(0) {
            return Err(EasingError::validation(
                "script_limits.max_operations must be non-zero (omit it for no limit)",
            ));
        }
        Ok(())
    }

    /// Debounce interval.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
