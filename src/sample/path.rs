use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathSeg};
use tokio::time::Instant;

use crate::foundation::cancel::CancelToken;
use crate::foundation::config::ChunkPolicy;
use crate::foundation::core::{CurvePoint, Evaluation, LinearData, SAMPLE_COUNT};
use crate::foundation::error::{EasingError, EasingResult};

/// Carrier name reported for SVG path evaluations.
pub const PATH_CARRIER_NAME: &str = "custom";

/// Arc length accuracy, in path units.
const ARCLEN_ACCURACY: f64 = 1e-7;

/// Replace line breaks with spaces and trim surrounding whitespace.
pub fn normalize_path_data(data: &str) -> String {
    data.replace(['\r', '\n'], " ").trim().to_string()
}

/// Validate path data as a CSS `path("...")` argument and parse it.
pub fn validate_path_data(data: &str) -> EasingResult<BezPath> {
    let data = normalize_path_data(data);
    if data.is_empty() {
        return Err(EasingError::invalid_path("path data is empty"));
    }
    if !data.starts_with(['M', 'm']) {
        return Err(EasingError::invalid_path(
            "path data must start with a moveto command",
        ));
    }
    if data.contains('"') {
        return Err(EasingError::invalid_path(
            "path data must not contain quotes",
        ));
    }
    BezPath::from_svg(&data).map_err(|e| EasingError::invalid_path(e.to_string()))
}

/// Uniform arc-length walk over a path, yielding [`SAMPLE_COUNT`] points.
///
/// X never decreases: each sample's x is clamped to the running maximum.
pub(crate) struct PathWalk {
    segments: Vec<PathSeg>,
    /// Cumulative length at the end of each segment.
    ends: Vec<f64>,
    total: f64,
    cursor: usize,
    index: usize,
    max_x: f64,
}

impl PathWalk {
    pub(crate) fn new(data: &str) -> EasingResult<Self> {
        let path = validate_path_data(data)?;
        let segments: Vec<PathSeg> = path.segments().collect();

        let mut ends = Vec::with_capacity(segments.len());
        let mut total = 0.0;
        for seg in &segments {
            total += seg.arclen(ARCLEN_ACCURACY);
            ends.push(total);
        }

        if total.is_nan() || total <= 0.0 {
            return Err(EasingError::ZeroLengthPath);
        }

        Ok(Self {
            segments,
            ends,
            total,
            cursor: 0,
            index: 0,
            max_x: f64::NEG_INFINITY,
        })
    }

    pub(crate) fn total_length(&self) -> f64 {
        self.total
    }

    fn point_at_length(&mut self, length: f64) -> kurbo::Point {
        let last = self.segments.len() - 1;
        while self.cursor < last && length > self.ends[self.cursor] {
            self.cursor += 1;
        }
        let start = if self.cursor == 0 {
            0.0
        } else {
            self.ends[self.cursor - 1]
        };
        let seg = self.segments[self.cursor];
        let seg_len = self.ends[self.cursor] - start;
        let local = (length - start).clamp(0.0, seg_len);
        let t = if seg_len > 0.0 {
            seg.inv_arclen(local, ARCLEN_ACCURACY)
        } else {
            0.0
        };
        seg.eval(t)
    }
}

impl Iterator for PathWalk {
    type Item = CurvePoint;

    fn next(&mut self) -> Option<CurvePoint> {
        if self.index >= SAMPLE_COUNT {
            return None;
        }
        let length = self.index as f64 / (SAMPLE_COUNT - 1) as f64 * self.total;
        self.index += 1;

        let p = self.point_at_length(length);
        self.max_x = self.max_x.max(p.x);
        Some(CurvePoint::new(self.max_x, p.y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = SAMPLE_COUNT - self.index;
        (left, Some(left))
    }
}

/// Sample `data` in one go.
#[tracing::instrument(skip_all)]
pub fn sample_path(data: &str) -> EasingResult<Evaluation> {
    let walk = PathWalk::new(data)?;
    tracing::debug!(total_length = walk.total_length(), "path parsed");
    Ok(Evaluation {
        name: PATH_CARRIER_NAME.to_string(),
        points: walk.collect(),
    })
}

/// Sample `data` on the calling side, yielding between time slices.
///
/// Work runs in slices of at most `chunks.slice()`; between slices the task sleeps for one
/// `chunks.frame_interval()`. `cancel` is honoured before the first slice and at every slice
/// boundary.
#[tracing::instrument(skip_all)]
pub async fn sample_path_cooperative(
    data: &str,
    cancel: &CancelToken,
    chunks: &ChunkPolicy,
) -> EasingResult<Evaluation> {
    cancel.check()?;
    let walk = PathWalk::new(data)?;
    let mut points: LinearData = Vec::with_capacity(SAMPLE_COUNT);

    yield_frame(cancel, chunks).await?;
    let mut slice_start = Instant::now();
    let mut slices = 1usize;

    for point in walk {
        points.push(point);
        if slice_start.elapsed() > chunks.slice() {
            yield_frame(cancel, chunks).await?;
            slice_start = Instant::now();
            slices += 1;
        }
    }

    tracing::debug!(slices, "path sampled cooperatively");
    Ok(Evaluation {
        name: PATH_CARRIER_NAME.to_string(),
        points,
    })
}

async fn yield_frame(cancel: &CancelToken, chunks: &ChunkPolicy) -> EasingResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EasingError::Aborted),
        _ = tokio::time::sleep(chunks.frame_interval()) => cancel.check(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sample/path.rs"]
mod tests;
