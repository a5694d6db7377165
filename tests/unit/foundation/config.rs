use super::*;

#[test]
fn defaults_match_editor_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.simplify.tolerance, 0.002);
    assert_eq!(cfg.simplify.precision, 3);
    assert_eq!(cfg.debounce(), Duration::from_millis(300));
    assert_eq!(cfg.path_mode, PathMode::Sandbox);
    assert_eq!(cfg.path_chunks.slice(), Duration::from_millis(16));
    assert_eq!(cfg.path_chunks.frame_interval(), Duration::from_millis(16));
    assert_eq!(cfg.script_limits.max_call_levels, 64);
    assert_eq!(cfg.script_limits.max_operations, None);
    assert!(cfg.validate().is_ok());
}

#[test]
fn from_reader_fills_missing_fields() {
    let json = r#"{ "simplify": { "precision": 4 }, "path_mode": "interactive" }"#;
    let cfg = Config::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.simplify.precision, 4);
    assert_eq!(cfg.simplify.tolerance, 0.002);
    assert_eq!(cfg.path_mode, PathMode::Interactive);
    assert_eq!(cfg.debounce_ms, 300);
}

#[test]
fn from_reader_rejects_invalid_values() {
    let err = Config::from_reader(r#"{ "simplify": { "tolerance": -1 } }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, EasingError::Validation(_)), "{err}");

    let err = Config::from_reader(r#"{ "path_chunks": { "slice_ms": 0 } }"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("slice_ms"), "{err}");

    let err = Config::from_reader("not json".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("parse config JSON"), "{err}");
}

#[test]
fn from_path_reports_missing_file() {
    let err = Config::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open config JSON"), "{err}");
}

#[test]
fn clamped_pins_parameters_into_interactive_ranges() {
    let p = SimplifyParams::new(1.0, 9).clamped();
    assert_eq!(p.tolerance, SimplifyParams::MAX_TOLERANCE);
    assert_eq!(p.precision, SimplifyParams::MAX_PRECISION);

    let p = SimplifyParams::new(0.0, 0).clamped();
    assert_eq!(p.tolerance, SimplifyParams::MIN_TOLERANCE);
    assert_eq!(p.precision, SimplifyParams::MIN_PRECISION);

    let p = SimplifyParams::new(f64::NAN, 3).clamped();
    assert_eq!(p.tolerance, SimplifyParams::MIN_TOLERANCE);

    let p = SimplifyParams::default();
    assert_eq!(p.clamped(), p);
}
