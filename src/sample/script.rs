use std::collections::{BTreeMap, BTreeSet};

use rhai::module_resolvers::DummyModuleResolver;
use rhai::{AST, CallFnOptions, Dynamic, Engine, EvalAltResult, FnAccess, FnPtr, Position, Scope};

use crate::foundation::config::ScriptLimits;
use crate::foundation::core::{CurvePoint, Evaluation, SAMPLE_COUNT, kebab_case};
use crate::foundation::error::{EasingError, EasingResult};

/// Source name untrusted scripts are loaded under.
pub const SCRIPT_SOURCE_NAME: &str = "data:text/x-rhai,easing";

/// A callable binding introduced by the script.
enum EasingFn {
    /// `fn name(x) { ... }`
    Declared(String),
    /// `let name = |x| ...;` or `let name = Fn("...");`
    Pointer(FnPtr),
}

/// Loads one untrusted script and samples the easing function it defines.
///
/// The engine has no host functions registered beyond the standard packages and resolves no
/// modules, so scripts cannot reach the file system, network, or process environment.
pub struct ScriptSampler {
    engine: Engine,
}

impl ScriptSampler {
    /// Create a sampler with the given interpreter limits.
    pub fn new(limits: &ScriptLimits) -> Self {
        let mut engine = Engine::new();
        // `import` would otherwise load `.rhai` files from the host.
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
        engine.set_max_string_size(limits.max_string_size);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_map_size(limits.max_map_size);
        if let Some(ops) = limits.max_operations {
            engine.set_max_operations(ops);
        }

        // stdout is the worker's reply channel; script output must never land there.
        engine.on_print(|text| tracing::debug!(target: "script", "{text}"));
        engine.on_debug(|text, _source, pos| {
            tracing::debug!(target: "script", %pos, "{text}");
        });

        Self { engine }
    }

    /// Run `source` once and sample its easing function at [`SAMPLE_COUNT`] positions.
    #[tracing::instrument(skip_all, fields(len = source.len()))]
    pub fn sample(&self, source: &str) -> EasingResult<Evaluation> {
        let (ast, mut scope, name, easing) = self.load(source)?;
        tracing::debug!(%name, "easing function selected");

        let last = (SAMPLE_COUNT - 1) as f64;
        let mut points = Vec::with_capacity(SAMPLE_COUNT);
        for i in 0..SAMPLE_COUNT {
            let pos = i as f64 / last;
            let out = self
                .call(&easing, &ast, &mut scope, pos)
                .map_err(|e| script_error(&e))?;
            points.push(CurvePoint::new(pos, to_number(&out)));
        }

        Ok(Evaluation {
            name: kebab_case(&name),
            points,
        })
    }

    fn load(&self, source: &str) -> EasingResult<(AST, Scope<'static>, String, EasingFn)> {
        let mut ast = self.engine.compile(source).map_err(|e| {
            let err: Box<EvalAltResult> = e.into();
            script_error(&err)
        })?;
        ast.set_source(SCRIPT_SOURCE_NAME);

        let mut scope = Scope::new();
        let before: BTreeSet<String> = scope.iter().map(|(name, _, _)| name.to_string()).collect();

        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| script_error(&e))?;

        let mut candidates: BTreeMap<String, EasingFn> = BTreeMap::new();
        for f in ast.iter_functions() {
            // Closure bodies are compiled to anonymous functions (`anon$...`).
            // `private fn` helpers stay out of the candidate set.
            if f.name.contains('$') || f.access == FnAccess::Private {
                continue;
            }
            candidates
                .entry(f.name.to_string())
                .or_insert_with(|| EasingFn::Declared(f.name.to_string()));
        }
        for (name, _constant, value) in scope.iter() {
            if before.contains(name) {
                continue;
            }
            if let Some(ptr) = value.try_cast::<FnPtr>() {
                candidates.insert(name.to_string(), EasingFn::Pointer(ptr));
            }
        }

        let (name, easing) = select_candidate(candidates)?;
        Ok((ast, scope, name, easing))
    }

    fn call(
        &self,
        easing: &EasingFn,
        ast: &AST,
        scope: &mut Scope,
        pos: f64,
    ) -> Result<Dynamic, Box<EvalAltResult>> {
        match easing {
            EasingFn::Declared(name) => self.engine.call_fn_with_options(
                CallFnOptions::new().eval_ast(false).rewind_scope(true),
                scope,
                ast,
                name,
                (pos,),
            ),
            EasingFn::Pointer(ptr) => ptr.call(&self.engine, ast, (pos,)),
        }
    }
}

/// Exactly one candidate is adopted; none or several is an error.
fn select_candidate(mut candidates: BTreeMap<String, EasingFn>) -> EasingResult<(String, EasingFn)> {
    match candidates.len() {
        0 => Err(EasingError::NoEasingFunctionFound),
        1 => Ok(candidates
            .pop_first()
            .ok_or(EasingError::NoEasingFunctionFound)?),
        _ => Err(EasingError::AmbiguousEasingFunction {
            candidates: candidates.into_keys().collect(),
        }),
    }
}

/// JavaScript `Number(value)` over Rhai values.
pub(crate) fn to_number(value: &Dynamic) -> f64 {
    if let Ok(v) = value.as_float() {
        return v;
    }
    if let Ok(v) = value.as_int() {
        return v as f64;
    }
    if let Ok(v) = value.as_bool() {
        return if v { 1.0 } else { 0.0 };
    }
    if let Ok(c) = value.as_char() {
        return parse_js_number(&c.to_string());
    }
    if value.is_string() {
        return value
            .clone()
            .into_string()
            .map_or(f64::NAN, |s| parse_js_number(&s));
    }
    f64::NAN
}

fn parse_js_number(text: &str) -> f64 {
    let t = text.trim();
    match t {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => match radix_literal(t) {
            Some((digits, radix)) => parse_radix(digits, radix),
            None if t
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) =>
            {
                t.parse().unwrap_or(f64::NAN)
            }
            None => f64::NAN,
        },
    }
}

/// Split `0x`/`0o`/`0b` literals (unsigned, any case) into digits and radix.
fn radix_literal(t: &str) -> Option<(&str, u32)> {
    let prefix = t.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((&t[2..], radix))
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// Convert an engine error into [`EasingError::Script`] with a rendered stack.
fn script_error(err: &EvalAltResult) -> EasingError {
    let mut calls: Vec<(&str, Position)> = Vec::new();
    let mut inner = err;
    while let EvalAltResult::ErrorInFunctionCall(name, _source, cause, pos) = inner {
        calls.push((name.as_str(), *pos));
        inner = &**cause;
    }

    let pos = inner.position();
    let text = inner.to_string();
    let message = text
        .strip_suffix(&format!(" ({pos})"))
        .unwrap_or(&text)
        .to_string();

    EasingError::script(message, Some(render_stack(&calls, pos)))
}

/// Render the call chain as `function@source:line:column` frames, innermost first.
///
/// `calls` is ordered outermost first; each entry carries the call-site position in its caller.
fn render_stack(calls: &[(&str, Position)], innermost: Position) -> String {
    let mut frames = Vec::with_capacity(calls.len() + 1);
    let current = calls.last().map_or("", |(name, _)| *name);
    frames.push(render_frame(current, innermost));
    for i in (0..calls.len()).rev() {
        let caller = if i == 0 { "" } else { calls[i - 1].0 };
        frames.push(render_frame(caller, calls[i].1));
    }
    frames.join("\n")
}

fn render_frame(function: &str, pos: Position) -> String {
    match (pos.line(), pos.position()) {
        (Some(line), Some(column)) => format!("{function}@{SCRIPT_SOURCE_NAME}:{line}:{column}"),
        (Some(line), None) => format!("{function}@{SCRIPT_SOURCE_NAME}:{line}"),
        _ if function.is_empty() => "[native code]".to_string(),
        _ => function.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sample/script.rs"]
mod tests;
