use super::*;
use crate::foundation::core::CurvePoint;
use crate::foundation::error::SourceLocation;

fn missing_program() -> WorkerProgram {
    WorkerProgram::new("/definitely/not/a/worker", ["worker"])
}

fn interactive_coordinator() -> Coordinator {
    let cfg = Config {
        path_mode: PathMode::Interactive,
        path_chunks: ChunkPolicy {
            slice_ms: 16,
            frame_ms: 0,
        },
        ..Config::default()
    };
    // The test binary itself passes the load probe; it is never spawned here.
    Coordinator::from_config(WorkerProgram::current_exe().unwrap(), &cfg)
}

#[test]
fn state_machine_transitions() {
    use EvaluationState::*;
    assert!(Idle.can_advance_to(Queued));
    assert!(Queued.can_advance_to(SandboxStarting));
    assert!(SandboxStarting.can_advance_to(Sampling));
    assert!(Sampling.can_advance_to(Completed));
    for from in [Queued, SandboxStarting, Sampling] {
        assert!(from.can_advance_to(Cancelled), "{from:?}");
    }
    assert!(Queued.can_advance_to(Sampling));
    assert!(Idle.can_advance_to(Failed));
    assert!(!Idle.can_advance_to(Cancelled));
    assert!(!Idle.can_advance_to(Sampling));
    assert!(!Completed.can_advance_to(Queued));
    assert!(!Queued.can_advance_to(Completed));
    for terminal in [Completed, Failed, Cancelled] {
        assert!(terminal.is_terminal());
        assert!(!terminal.can_advance_to(Sampling));
    }
}

#[test]
fn enrich_attaches_sandboxed_locations_only() {
    let err = enrich(EasingError::script(
        "boom",
        Some("easing@data:text/x-rhai,easing:4:2".to_string()),
    ));
    let loc = err.location().unwrap();
    assert_eq!(loc.line_number, Some(4));
    assert_eq!(loc.column_number, Some(2));
    assert_eq!(err.user_message(), "boom at line 4, column 2");

    let err = enrich(EasingError::script(
        "boom",
        Some("easing@file:///host.rhai:4:2".to_string()),
    ));
    assert!(err.location().is_none());
    assert_eq!(err.user_message(), "boom");
}

#[test]
fn enrich_keeps_existing_locations() {
    let existing = SourceLocation {
        file_name: Some("data:x".to_string()),
        line_number: Some(1),
        column_number: Some(1),
        function_name: None,
    };
    let err = enrich(EasingError::Script {
        message: "m".to_string(),
        stack: Some("easing@data:text/x-rhai,easing:9:9".to_string()),
        location: Some(existing.clone()),
    });
    assert_eq!(err.location(), Some(&existing));
}

#[test]
fn non_finite_samples_fail_the_evaluation() {
    let eval = Evaluation {
        name: "easing".to_string(),
        points: vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(0.25, f64::NAN)],
    };
    match check_finite(eval) {
        Err(EasingError::NonFiniteValue { pos }) => assert_eq!(pos, 0.25),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_path_fails_before_queueing() {
    let coordinator = Coordinator::new(missing_program());
    let mut request = EvaluationRequest::new(InputKind::SvgPath, "not a path");
    let state = request.observe();
    let err = coordinator.evaluate(request).await.unwrap_err();
    assert!(matches!(err, EasingError::InvalidPathData(_)), "{err:?}");
    assert_eq!(*state.borrow(), EvaluationState::Failed);
}

#[tokio::test]
async fn cancelled_request_is_aborted() {
    let coordinator = Coordinator::new(missing_program());
    let mut request = EvaluationRequest::new(InputKind::Script, "fn easing(x) { x }");
    let state = request.observe();
    request.cancel.cancel();
    let err = coordinator.evaluate(request).await.unwrap_err();
    assert!(err.is_abort());
    assert_eq!(*state.borrow(), EvaluationState::Cancelled);
}

#[tokio::test]
async fn missing_worker_program_fails_the_load_barrier() {
    let coordinator = Coordinator::new(missing_program());
    let err = coordinator
        .evaluate(EvaluationRequest::new(InputKind::Script, "fn easing(x) { x }"))
        .await
        .unwrap_err();
    assert!(matches!(err, EasingError::Sandbox(_)), "{err:?}");
}

#[tokio::test]
async fn interactive_paths_are_sampled_on_the_calling_side() {
    let coordinator = interactive_coordinator();
    let mut request = EvaluationRequest::new(InputKind::SvgPath, "M 0,0 L 1,1");
    let state = request.observe();
    let eval = coordinator.evaluate(request).await.unwrap();
    assert_eq!(eval.name, "custom");
    assert_eq!(eval.points.len(), crate::foundation::core::SAMPLE_COUNT);
    assert_eq!(*state.borrow(), EvaluationState::Completed);
}

#[tokio::test]
async fn interactive_zero_length_path_fails() {
    let coordinator = interactive_coordinator();
    let err = coordinator
        .evaluate(EvaluationRequest::new(InputKind::SvgPath, "M 0,0"))
        .await
        .unwrap_err();
    assert!(matches!(err, EasingError::ZeroLengthPath), "{err:?}");
}
