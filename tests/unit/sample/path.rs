use super::*;

#[test]
fn straight_line_is_sampled_uniformly() {
    let eval = sample_path("M 0,0 L 1,1").unwrap();
    assert_eq!(eval.name, PATH_CARRIER_NAME);
    assert_eq!(eval.points.len(), SAMPLE_COUNT);

    let first = eval.points[0];
    let last = eval.points[SAMPLE_COUNT - 1];
    assert_eq!(first, CurvePoint::new(0.0, 0.0));
    assert!((last.pos - 1.0).abs() < 1e-9 && (last.value - 1.0).abs() < 1e-9);

    let mid = eval.points[SAMPLE_COUNT / 2];
    assert!((mid.pos - mid.value).abs() < 1e-9);
}

#[test]
fn x_never_decreases_when_the_path_doubles_back() {
    let eval = sample_path("M 0,0 L 0.6,0.5 L 0.3,0.7 L 1,1").unwrap();
    for w in eval.points.windows(2) {
        assert!(w[1].pos >= w[0].pos, "{:?} -> {:?}", w[0], w[1]);
    }
    // The backtracking leg is flattened at the running maximum.
    let flat = eval
        .points
        .iter()
        .filter(|p| p.value > 0.55 && p.value < 0.65)
        .collect::<Vec<_>>();
    assert!(!flat.is_empty());
    assert!(flat.iter().all(|p| p.pos == flat[0].pos && p.pos <= 0.6));
}

#[test]
fn curves_reach_their_end_point() {
    let eval = sample_path("M 0,0 C 0.05,0 0.133333,0.06 0.166666,0.4 C 0.208333,0.82 0.25,1 1,1")
        .unwrap();
    let last = eval.points[SAMPLE_COUNT - 1];
    assert!((last.pos - 1.0).abs() < 1e-6, "{last:?}");
    assert!((last.value - 1.0).abs() < 1e-6, "{last:?}");
}

#[test]
fn lone_moveto_is_zero_length() {
    let err = sample_path("M 0,0").unwrap_err();
    assert!(matches!(err, EasingError::ZeroLengthPath), "{err:?}");

    let err = sample_path("M 0,0 L 0,0").unwrap_err();
    assert!(matches!(err, EasingError::ZeroLengthPath), "{err:?}");
}

#[test]
fn newlines_and_padding_are_normalized() {
    assert_eq!(normalize_path_data("  M 0,0\nL 1,1\r\n"), "M 0,0 L 1,1");
    assert!(sample_path("\n M 0,0\n L 1,1 \n").is_ok());
}

#[test]
fn invalid_path_data_is_rejected() {
    for bad in ["", "   ", "L 1,1", "M 0,0 L 1,\"1\"", "M 0,0 Q", "hello"] {
        let err = validate_path_data(bad).unwrap_err();
        assert!(matches!(err, EasingError::InvalidPathData(_)), "{bad:?}: {err:?}");
    }
}

#[tokio::test]
async fn cooperative_sampling_matches_one_shot_sampling() {
    let data = "M 0,0 C 0.4,0 0.2,1 1,1";
    let chunks = ChunkPolicy {
        slice_ms: 1,
        frame_ms: 0,
    };
    let coop = sample_path_cooperative(data, &CancelToken::new(), &chunks)
        .await
        .unwrap();
    let sync = sample_path(data).unwrap();
    assert_eq!(coop, sync);
}

#[tokio::test]
async fn cooperative_sampling_honours_prior_cancellation() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = sample_path_cooperative("M 0,0 L 1,1", &cancel, &ChunkPolicy::default())
        .await
        .unwrap_err();
    assert!(err.is_abort());
}

#[tokio::test(start_paused = true)]
async fn cooperative_sampling_stops_at_a_frame_boundary() {
    let cancel = CancelToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            sample_path_cooperative("M 0,0 L 1,1", &cancel, &ChunkPolicy::default()).await
        })
    };
    // The sampler sleeps one frame before its first slice.
    tokio::task::yield_now().await;
    cancel.cancel();
    let err = task.await.unwrap().unwrap_err();
    assert!(err.is_abort());
}
