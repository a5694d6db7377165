use super::*;

fn sampler() -> ScriptSampler {
    ScriptSampler::new(&ScriptLimits::default())
}

#[test]
fn samples_declared_easing_function() {
    let eval = sampler().sample("fn easing(x) { x * x }").unwrap();
    assert_eq!(eval.name, "easing");
    assert_eq!(eval.points.len(), SAMPLE_COUNT);
    assert_eq!(eval.points[0], CurvePoint::new(0.0, 0.0));
    assert_eq!(eval.points[SAMPLE_COUNT - 1], CurvePoint::new(1.0, 1.0));

    let step = 1.0 / (SAMPLE_COUNT - 1) as f64;
    for (i, w) in eval.points.windows(2).enumerate() {
        assert!(w[1].pos > w[0].pos, "positions must increase at {i}");
        assert!((w[1].pos - w[0].pos - step).abs() < 1e-12);
    }
}

#[test]
fn single_candidate_is_adopted_and_kebab_cased() {
    let eval = sampler().sample("fn myEasing(t) { t }").unwrap();
    assert_eq!(eval.name, "my-easing");

    let eval = sampler().sample("fn smooth_step(t) { t * t * (3.0 - 2.0 * t) }").unwrap();
    assert_eq!(eval.name, "smooth-step");
    assert_eq!(eval.points[SAMPLE_COUNT - 1].value, 1.0);
}

#[test]
fn closure_bindings_are_candidates() {
    let eval = sampler().sample("let halfway = |x| x / 2.0;").unwrap();
    assert_eq!(eval.name, "halfway");
    assert_eq!(eval.points[SAMPLE_COUNT - 1].value, 0.5);
}

#[test]
fn easing_alongside_a_helper_is_ambiguous() {
    let err = sampler()
        .sample("fn helper(x) { x }\nfn easing(x) { helper(x) }")
        .unwrap_err();
    match err {
        EasingError::AmbiguousEasingFunction { candidates } => {
            assert_eq!(candidates, vec!["easing".to_string(), "helper".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn private_helpers_are_not_candidates() {
    let src = r#"
        private fn square(x) { x * x }
        fn easing(x) { square(x) }
    "#;
    let eval = sampler().sample(src).unwrap();
    assert_eq!(eval.name, "easing");
    assert_eq!(eval.points[SAMPLE_COUNT - 1].value, 1.0);
}

#[test]
fn imports_do_not_reach_the_file_system() {
    let dir = std::env::temp_dir().join("linear_easing_import");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("shared.rhai"), "export const leaked = 0.5;").unwrap();
    let module = dir.join("shared");

    let src = format!(
        "import \"{}\" as m;\nfn easing(x) {{ x }}\nlet v = m::leaked;",
        module.display()
    );
    let err = sampler().sample(&src).unwrap_err();
    assert!(matches!(err, EasingError::Script { .. }), "{err:?}");
}

#[test]
fn two_declared_functions_are_ambiguous() {
    let err = sampler()
        .sample("fn b(x) { x }\nfn a(x) { x }")
        .unwrap_err();
    match err {
        EasingError::AmbiguousEasingFunction { candidates } => {
            assert_eq!(candidates, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn no_callable_is_reported() {
    let err = sampler().sample("let x = 1;").unwrap_err();
    assert!(matches!(err, EasingError::NoEasingFunctionFound), "{err:?}");
}

#[test]
fn syntax_errors_carry_a_stack_into_the_user_source() {
    let err = sampler().sample("fn easing(x) {\n  x + ;\n}").unwrap_err();
    match err {
        EasingError::Script { stack, .. } => {
            let stack = stack.unwrap();
            assert!(stack.contains(SCRIPT_SOURCE_NAME), "{stack}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn runtime_errors_name_the_failing_function() {
    let src = "fn easing(x) {\n  let y = x;\n  y + missing\n}";
    let err = sampler().sample(src).unwrap_err();
    match err {
        EasingError::Script { message, stack, .. } => {
            assert!(message.contains("missing"), "{message}");
            assert!(!message.ends_with(')'), "position suffix should be stripped: {message}");
            let stack = stack.unwrap();
            let first = stack.lines().next().unwrap();
            assert!(
                first.starts_with(&format!("easing@{SCRIPT_SOURCE_NAME}:3:")),
                "{stack}"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn print_does_not_reach_stdout() {
    let eval = sampler()
        .sample("fn easing(x) { print(\"hi\"); x }")
        .unwrap();
    assert_eq!(eval.points.len(), SAMPLE_COUNT);
}

#[test]
fn operation_limit_stops_runaway_scripts() {
    let limits = ScriptLimits {
        max_operations: Some(10_000),
        ..ScriptLimits::default()
    };
    let err = ScriptSampler::new(&limits)
        .sample("fn easing(x) { let i = 0; loop { i += 1; } }")
        .unwrap_err();
    assert!(matches!(err, EasingError::Script { .. }), "{err:?}");
}

#[test]
fn to_number_follows_js_number_rules() {
    assert_eq!(to_number(&Dynamic::from(0.25_f64)), 0.25);
    assert_eq!(to_number(&Dynamic::from(3_i64)), 3.0);
    assert_eq!(to_number(&Dynamic::from(true)), 1.0);
    assert_eq!(to_number(&Dynamic::from(false)), 0.0);
    assert_eq!(to_number(&Dynamic::from(" 1.5 ".to_string())), 1.5);
    assert_eq!(to_number(&Dynamic::from(String::new())), 0.0);
    assert_eq!(to_number(&Dynamic::from("-Infinity".to_string())), f64::NEG_INFINITY);
    assert!(to_number(&Dynamic::from("abc".to_string())).is_nan());
    assert_eq!(to_number(&Dynamic::from("0x10".to_string())), 16.0);
    assert_eq!(to_number(&Dynamic::from("0o17".to_string())), 15.0);
    assert_eq!(to_number(&Dynamic::from(" 0B101 ".to_string())), 5.0);
    assert!(to_number(&Dynamic::from("-0x10".to_string())).is_nan());
    assert!(to_number(&Dynamic::from("0x".to_string())).is_nan());
    assert!(to_number(&Dynamic::from("0b2".to_string())).is_nan());
    assert!(to_number(&Dynamic::UNIT).is_nan());
}

#[test]
fn non_numeric_results_become_nan() {
    let eval = sampler().sample("fn easing(x) { \"nope\" }").unwrap();
    assert!(eval.points.iter().all(|p| p.value.is_nan()));
}
