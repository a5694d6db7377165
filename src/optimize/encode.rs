use crate::foundation::core::CurvePoint;

/// Fraction digits of the exact decimal expansion of any `f64`.
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Format `value` with at most `max_fraction_digits` fraction digits.
///
/// Rounds half away from zero on the exact binary value, strips trailing zeros, and never
/// groups digits or prints a negative zero. The output does not depend on locale.
pub fn format_decimal(value: f64, max_fraction_digits: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let keep = (max_fraction_digits as usize).min(frac_part.len());

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(keep))
        .collect();
    let round_up = frac_part.as_bytes().get(keep).is_some_and(|d| *d >= b'5');
    let mut int_len = int_part.len();

    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
            int_len += 1;
        }
    }

    let (int_digits, frac_digits) = digits.split_at(int_len);
    let frac_digits = match frac_digits.iter().rposition(|d| *d != b'0') {
        Some(last) => &frac_digits[..=last],
        None => &[],
    };
    let is_zero = int_digits.iter().chain(frac_digits).all(|d| *d == b'0');

    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.extend(int_digits.iter().map(|d| char::from(*d)));
    if !frac_digits.is_empty() {
        out.push('.');
        out.extend(frac_digits.iter().map(|d| char::from(*d)));
    }
    out
}

/// Positions whose explicit `%` stop can be left out of the `linear()` list.
///
/// - first point at exactly 0
/// - last point at exactly 1 when its predecessor is ≤ 1
/// - interior points within `10^-precision` of the midpoint of their neighbours
fn redundant_positions(points: &[CurvePoint], precision: u32) -> Vec<bool> {
    let max_delta = 1.0 / 10f64.powi(precision as i32);
    let last = points.len().saturating_sub(1);

    (0..points.len())
        .map(|i| {
            let x = points[i].pos;
            if i == 0 {
                return x == 0.0;
            }
            let previous = points[i - 1].pos;
            if i == last {
                return x == 1.0 && previous <= 1.0;
            }
            let next = points[i + 1].pos;
            let average = (next - previous) / 2.0 + previous;
            (x - average).abs() < max_delta
        })
        .collect()
}

/// Encode simplified points as `linear()` argument tokens.
///
/// Values keep `precision` fraction digits, percentage positions keep `precision - 2`.
/// Runs of points with the same value collapse into a single token; a run is written with
/// just its first and last stop (`"0 20% 40%"`) when that is strictly shorter than listing
/// every point.
pub fn encode_linear(points: &[CurvePoint], precision: u32) -> Vec<String> {
    if points.is_empty() {
        return Vec::new();
    }

    let x_digits = precision.saturating_sub(2);
    let redundant = redundant_positions(points, precision);
    let format_x = |x: f64| format!("{}%", format_decimal(x * 100.0, x_digits));

    let mut groups: Vec<Vec<usize>> = vec![vec![0]];
    for i in 1..points.len() {
        match groups.last_mut() {
            Some(group) if points[group[0]].value == points[i].value => group.push(i),
            _ => groups.push(vec![i]),
        }
    }

    groups
        .into_iter()
        .map(|group| {
            let y = format_decimal(points[group[0]].value, precision);
            let listed = group
                .iter()
                .map(|&i| {
                    if redundant[i] {
                        y.clone()
                    } else {
                        format!("{y} {}", format_x(points[i].pos))
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");

            let (Some(&first), Some(&last)) = (group.first(), group.last()) else {
                return listed;
            };
            if group.len() == 1 {
                return listed;
            }

            let shortcut = format!(
                "{y} {} {}",
                format_x(points[first].pos),
                format_x(points[last].pos)
            );
            if shortcut.len() < listed.len() {
                shortcut
            } else {
                listed
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/encode.rs"]
mod tests;
