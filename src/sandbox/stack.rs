//! Recover a source location from engine stack text.
//!
//! Two frame shapes are understood:
//!
//! - V8 style: `    at easing (data:text/x-rhai,easing:3:9)`
//! - Firefox/Safari style: `easing@data:text/x-rhai,easing:3:9`
//!
//! [`resolve_stack`] probes the text and dispatches to the matching resolver. Only the first
//! usable frame is considered.

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::error::SourceLocation;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("stack patterns are static and valid")
}

static V8_FRAME: LazyLock<Regex> = LazyLock::new(|| regex(r"^\s*at .*(\S+:\d+|\(native\))"));
static V8_EVAL_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(\(eval at [^()]*)|(,.*$)"));
static V8_LEADING_TOKEN: LazyLock<Regex> = LazyLock::new(|| regex(r"^.*?\s+"));
static V8_PAREN_LOCATION: LazyLock<Regex> = LazyLock::new(|| regex(r" (\(.+\)$)"));

static GECKO_NATIVE: LazyLock<Regex> = LazyLock::new(|| regex(r"^(eval@)?(\[native code\])?$"));
static GECKO_EVAL: LazyLock<Regex> =
    LazyLock::new(|| regex(r" line (\d+)(?: > eval line \d+)* > eval:\d+:\d+"));
static GECKO_FUNCTION: LazyLock<Regex> = LazyLock::new(|| regex(r#"((.*".+"[^@]*)?[^@]*)(?:@)"#));

static LOCATION: LazyLock<Regex> = LazyLock::new(|| regex(r"^(.+?)(?::(\d+))?(?::(\d+))?$"));

/// Strategy for turning stack text into a [`SourceLocation`].
pub trait ErrorLocationResolver {
    /// `true` when `stack` has the shape this resolver understands.
    fn matches(&self, stack: &str) -> bool;

    /// Location of the first usable frame.
    fn resolve(&self, stack: &str) -> Option<SourceLocation>;
}

/// `at function (file:line:column)` frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct V8StackResolver;

/// `function@file:line:column` frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeckoStackResolver;

/// Split `file:line:column` (parentheses ignored) into its parts.
fn extract_location(url_like: &str) -> (String, Option<u32>, Option<u32>) {
    if !url_like.contains(':') {
        return (url_like.to_string(), None, None);
    }
    let cleaned = url_like.replace(['(', ')'], "");
    match LOCATION.captures(&cleaned) {
        Some(caps) => (
            caps.get(1).map_or_else(String::new, |m| m.as_str().to_string()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
            caps.get(3).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (cleaned, None, None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl ErrorLocationResolver for V8StackResolver {
    fn matches(&self, stack: &str) -> bool {
        stack.lines().any(|line| V8_FRAME.is_match(line))
    }

    fn resolve(&self, stack: &str) -> Option<SourceLocation> {
        let mut line = stack
            .lines()
            .find(|line| V8_FRAME.is_match(line))?
            .to_string();

        if line.contains("(eval ") {
            line = line.replace("eval code", "eval");
            line = V8_EVAL_QUALIFIER.replace_all(&line, "").into_owned();
        }

        let line = line.trim_start().replace("(eval code", "(");
        let mut sanitized = V8_LEADING_TOKEN.replace(&line, "").into_owned();

        // Keep a parenthesized location whole; it may contain spaces.
        let location = V8_PAREN_LOCATION
            .captures(&sanitized)
            .map(|caps| (caps[0].to_string(), caps[1].to_string()));
        if let Some((whole, _)) = &location {
            sanitized = sanitized.replacen(whole.as_str(), "", 1);
        }

        let (file_name, line_number, column_number) = match &location {
            Some((_, inner)) => extract_location(inner),
            None => extract_location(&sanitized),
        };
        let function_name = location.as_ref().and_then(|_| non_empty(&sanitized));

        Some(SourceLocation {
            file_name: non_empty(&file_name),
            line_number,
            column_number,
            function_name,
        })
    }
}

impl ErrorLocationResolver for GeckoStackResolver {
    fn matches(&self, stack: &str) -> bool {
        stack.lines().any(|line| !GECKO_NATIVE.is_match(line))
    }

    fn resolve(&self, stack: &str) -> Option<SourceLocation> {
        let mut line = stack
            .lines()
            .find(|line| !GECKO_NATIVE.is_match(line))?
            .to_string();

        if line.contains(" > eval") {
            line = GECKO_EVAL.replace_all(&line, ":$1").into_owned();
        }

        if !line.contains('@') && !line.contains(':') {
            // Native or eval frames carry nothing but the function name.
            return Some(SourceLocation {
                function_name: non_empty(&line),
                ..SourceLocation::default()
            });
        }

        let function_name = GECKO_FUNCTION
            .captures(&line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| non_empty(m.as_str()));
        let rest = GECKO_FUNCTION.replace(&line, "");
        let (file_name, line_number, column_number) = extract_location(&rest);

        Some(SourceLocation {
            file_name: non_empty(&file_name),
            line_number,
            column_number,
            function_name,
        })
    }
}

/// Resolve the failing location from `stack`, picking the resolver by the text's shape.
pub fn resolve_stack(stack: &str) -> Option<SourceLocation> {
    let resolved = if V8StackResolver.matches(stack) {
        V8StackResolver.resolve(stack)
    } else {
        GeckoStackResolver.resolve(stack)
    };
    resolved.filter(|loc| !loc.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/stack.rs"]
mod tests;
