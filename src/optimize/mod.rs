//! Curve simplification and `linear()` encoding.

pub(crate) mod css;
pub(crate) mod encode;
pub(crate) mod simplify;

use crate::foundation::config::SimplifyParams;
use crate::foundation::core::CurvePoint;

/// Simplify dense samples and encode the survivors as `linear()` tokens.
pub fn optimize(points: &[CurvePoint], params: &SimplifyParams) -> Vec<String> {
    let simplified = simplify::simplify(points, params.tolerance);
    tracing::debug!(
        input = points.len(),
        kept = simplified.len(),
        tolerance = params.tolerance,
        "curve simplified"
    );
    encode::encode_linear(&simplified, params.precision)
}
