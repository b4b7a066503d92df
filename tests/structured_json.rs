use core::time::Duration;

use chrono::DateTime;
use faultline::{ErrorBuilder, Help, Retry};
use serde_json::json;

#[test]
fn structured_view_serializes_as_map() {
    let time = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
    let error = ErrorBuilder::new()
        .reason("NOT_FOUND")
        .with_metadata("user", "42")
        .with_field_violation("id", "unknown id")
        .trace("trace-1")
        .span("span-1")
        .with_tag("users")
        .time(time)
        .help(Help {
            description: "Lookup docs".to_owned(),
            url: "https://example.com/lookup".to_owned(),
        })
        .retry(Retry::after(Duration::from_millis(250)))
        .build("could not load user");

    let mut value = serde_json::to_value(error.structured()).expect("serializable");
    let stack_trace = value
        .as_object_mut()
        .and_then(|object| object.remove("stackTrace"));
    assert!(stack_trace.is_some_and(|trace| trace.is_string()));

    assert_eq!(
        value,
        json!({
            "message": "could not load user",
            "reason": "NOT_FOUND",
            "metadata": { "user": "42" },
            "fieldViolations": [{ "field": "id", "description": "unknown id" }],
            "trace": "trace-1",
            "span": "span-1",
            "tags": ["users"],
            "time": "2023-11-14T22:13:20+00:00",
            "help": { "description": "Lookup docs", "url": "https://example.com/lookup" },
            "retry": { "delay": "250ms" },
        })
    );
}

#[test]
fn attribute_types_serialize_with_wire_names() {
    let violation = faultline::PreconditionViolation {
        kind: "TOS".to_owned(),
        subject: "user:1".to_owned(),
        description: "not accepted".to_owned(),
    };
    assert_eq!(
        serde_json::to_value(&violation).expect("serializable"),
        json!({ "type": "TOS", "subject": "user:1", "description": "not accepted" })
    );
}
