use crate::foundation::core::CurvePoint;

/// Squared distance from `p` to the segment `a -> b`.
///
/// The projection parameter is clamped to the segment: past `b` the foot is `b`, at or before
/// `a` it stays at `a`. A degenerate segment measures the distance to `a`.
pub(crate) fn sq_segment_distance(p: CurvePoint, a: CurvePoint, b: CurvePoint) -> f64 {
    let (mut x, mut y) = (a.pos, a.value);
    let dx = b.pos - x;
    let dy = b.value - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((p.pos - x) * dx + (p.value - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b.pos;
            y = b.value;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    let dx = p.pos - x;
    let dy = p.value - y;
    dx * dx + dy * dy
}

/// Ramer–Douglas–Peucker simplification.
///
/// Returns a subsequence of `points` that keeps both endpoints and every point needed to stay
/// within `tolerance` of the input polyline. Inputs of length ≤ 1 are returned unchanged.
/// Among equally distant candidates the leftmost one is split on.
pub fn simplify(points: &[CurvePoint], tolerance: f64) -> Vec<CurvePoint> {
    if points.len() <= 1 {
        return points.to_vec();
    }

    let sq_tolerance = tolerance * tolerance;
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    // Pending sub-ranges. Processing order does not change which points are kept.
    let mut ranges = vec![(0usize, last)];
    while let Some((first, last)) = ranges.pop() {
        let mut max_sq = sq_tolerance;
        let mut index = None;
        for i in first + 1..last {
            let d = sq_segment_distance(points[i], points[first], points[last]);
            if d > max_sq {
                index = Some(i);
                max_sq = d;
            }
        }

        if let Some(index) = index {
            keep[index] = true;
            if last - index > 1 {
                ranges.push((index, last));
            }
            if index - first > 1 {
                ranges.push((first, index));
            }
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/simplify.rs"]
mod tests;
