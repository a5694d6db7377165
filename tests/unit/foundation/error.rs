use super::*;

fn data_location(line: u32, column: u32) -> SourceLocation {
    SourceLocation {
        file_name: Some("data:text/x-rhai,easing".to_string()),
        line_number: Some(line),
        column_number: Some(column),
        function_name: Some("easing".to_string()),
    }
}

#[test]
fn user_message_appends_location_for_sandboxed_source() {
    let err = EasingError::Script {
        message: "Variable not found: foo".to_string(),
        stack: None,
        location: Some(data_location(3, 9)),
    };
    assert_eq!(
        err.user_message(),
        "Variable not found: foo at line 3, column 9"
    );
}

#[test]
fn user_message_skips_foreign_or_partial_locations() {
    let foreign = EasingError::Script {
        message: "boom".to_string(),
        stack: None,
        location: Some(SourceLocation {
            file_name: Some("file:///host.rhai".to_string()),
            ..data_location(1, 1)
        }),
    };
    assert_eq!(foreign.user_message(), "boom");

    let no_column = EasingError::Script {
        message: "boom".to_string(),
        stack: None,
        location: Some(SourceLocation {
            column_number: None,
            ..data_location(1, 1)
        }),
    };
    assert_eq!(no_column.user_message(), "boom");
}

#[test]
fn ambiguous_message_lists_candidates() {
    let err = EasingError::AmbiguousEasingFunction {
        candidates: vec!["a".to_string(), "b".to_string()],
    };
    let msg = err.to_string();
    assert!(msg.contains("a, b"), "{msg}");
    assert_eq!(err.kind(), ErrorKind::AmbiguousEasingFunction);
}

#[test]
fn only_aborted_is_abort() {
    assert!(EasingError::Aborted.is_abort());
    assert!(!EasingError::WorkerAlreadyUsed.is_abort());
    assert!(!EasingError::sandbox("x").is_abort());
}

#[test]
fn kind_serializes_kebab_case() {
    let json = serde_json::to_string(&ErrorKind::NoEasingFunctionFound).unwrap();
    assert_eq!(json, "\"no-easing-function-found\"");
    let kind: ErrorKind = serde_json::from_str("\"zero-length-path\"").unwrap();
    assert_eq!(kind, ErrorKind::ZeroLengthPath);
}

#[test]
fn location_serializes_camel_case_and_skips_missing_fields() {
    let loc = SourceLocation {
        function_name: None,
        ..data_location(2, 5)
    };
    let json = serde_json::to_value(&loc).unwrap();
    assert_eq!(json["fileName"], "data:text/x-rhai,easing");
    assert_eq!(json["lineNumber"], 2);
    assert_eq!(json["columnNumber"], 5);
    assert!(json.get("functionName").is_none());
    assert!(SourceLocation::default().is_empty());
}
