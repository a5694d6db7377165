use serde::{Deserialize, Serialize};

/// Number of samples taken from every easing source.
pub const SAMPLE_COUNT: usize = 10_000;

/// One sample of an easing curve: input position and output value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Input position, normally in `[0, 1]`.
    #[serde(with = "crate::foundation::wire::js_number")]
    pub pos: f64,
    /// Output value at `pos`.
    #[serde(with = "crate::foundation::wire::js_number")]
    pub value: f64,
}

impl CurvePoint {
    /// Create a point.
    pub const fn new(pos: f64, value: f64) -> Self {
        Self { pos, value }
    }

    /// `true` when both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.value.is_finite()
    }
}

/// Ordered curve samples, positions non-decreasing.
pub type LinearData = Vec<CurvePoint>;

/// Kind of easing source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    /// An easing script defining one callable.
    Script,
    /// SVG path data.
    SvgPath,
}

/// Successful evaluation: carrier name plus the dense samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Name used for the generated custom properties (`--<name>-easing`).
    pub name: String,
    /// Dense samples.
    pub points: LinearData,
}

impl Evaluation {
    /// First sample with a non-finite coordinate.
    pub fn first_non_finite(&self) -> Option<&CurvePoint> {
        self.points.iter().find(|p| !p.is_finite())
    }
}

/// Convert an identifier to kebab case: `myEasing` and `my_easing` both become `my-easing`.
pub fn kebab_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev: Option<char> = None;
    for c in ident.chars() {
        if matches!(c, '_' | '-' | ' ') {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev = None;
            continue;
        }
        if c.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
