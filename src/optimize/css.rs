use serde::{Deserialize, Serialize};

use crate::optimize::encode::format_decimal;

/// Wrap width used when line breaks inside `linear()` are enabled.
const LINE_LENGTH: usize = 80;
/// Indent of wrapped `linear()` argument lines.
const ARG_INDENT: &str = "    ";

/// How [`format_css`] lays out the generated rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CssOptions {
    /// Wrap `linear()` arguments at 80 columns.
    pub line_breaks: bool,
    /// Emit a `--<name>-duration` property with this duration, in milliseconds.
    pub ideal_duration_ms: Option<f64>,
}

/// Render encoded tokens as a `:root` rule defining `--<name>-easing`.
///
/// Returns an empty string when there are no tokens.
pub fn format_css(tokens: &[String], name: &str, opts: &CssOptions) -> String {
    if tokens.is_empty() {
        return String::new();
    }

    let line_length = if opts.line_breaks {
        LINE_LENGTH
    } else {
        usize::MAX
    };
    let linear_start = format!("  --{name}-easing: linear(");
    let linear_end = ");";

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for token in tokens {
        // +1 for the trailing comma.
        if !line.is_empty()
            && line.len() + token.len() + ARG_INDENT.len() + 1 > line_length
        {
            line.push(',');
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(token);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    let linear = match lines.as_slice() {
        [only] if linear_start.len() + only.len() + linear_end.len() < line_length => {
            format!("{linear_start}{only}{linear_end}")
        }
        _ => format!(
            "{linear_start}\n{ARG_INDENT}{}\n  {linear_end}",
            lines.join(&format!("\n{ARG_INDENT}"))
        ),
    };

    let duration = match opts.ideal_duration_ms {
        Some(ms) if ms != 0.0 => {
            format!("\n  --{name}-duration: {}s;", format_decimal(ms / 1000.0, 3))
        }
        _ => String::new(),
    };

    format!(":root {{\n{linear}{duration}\n}}")
}

#[cfg(test)]
#[path = "../../tests/unit/optimize/css.rs"]
mod tests;
