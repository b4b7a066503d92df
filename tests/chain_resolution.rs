use core::time::Duration;

use chrono::DateTime;
use faultline::{ErrorBuilder, Help, Localization, Resource, Retry};

#[test]
fn innermost_setter_wins_across_three_levels() {
    let c = faultline::reason("C_REASON").build("c");
    let b = ErrorBuilder::new().wrap(c);
    let a = ErrorBuilder::new().wrap(b);
    assert_eq!(a.reason(), Some("C_REASON"));
}

#[test]
fn unset_inner_value_does_not_hide_outer_value() {
    let inner = faultline::new("inner");
    let outer = faultline::domain("outer-domain")
        .request_id("req-1")
        .wrap(inner);
    assert_eq!(outer.domain(), Some("outer-domain"));
    assert_eq!(outer.request_id(), Some("req-1"));
}

#[test]
fn tags_are_merged_and_deduplicated() {
    let inner = faultline::with_tag("y").with_tag("x").build("inner");
    let outer = faultline::with_tag("x").wrap(inner);
    assert_eq!(outer.tags(), ["x", "y"]);
}

#[test]
fn every_attribute_kind_survives_construction() {
    let time = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
    let error = ErrorBuilder::new()
        .reason("RATE_LIMITED")
        .domain("api.example.com")
        .with_metadata("endpoint", "/v1/users")
        .with_quota_violation("project:1", "100 requests per minute")
        .with_precondition_violation("TOS", "user:9", "terms not accepted")
        .with_field_violation("page_size", "must be positive")
        .user_id("user-9")
        .tenant_id("tenant-3")
        .trace("trace-1")
        .span("span-1")
        .request_id("req-77")
        .with_tag("public-api")
        .time(time)
        .help(Help {
            description: "Rate limits".to_owned(),
            url: "https://example.com/limits".to_owned(),
        })
        .resource(Resource {
            kind: "endpoint".to_owned(),
            name: "/v1/users".to_owned(),
            owner: "platform".to_owned(),
            description: String::new(),
        })
        .with_localization(Localization::new("en-US", "Slow down"))
        .with_localization(Localization::new("fr-FR", "Ralentissez"))
        .retry(Retry::after(Duration::from_secs(30)))
        .build("too many requests");

    assert_eq!(error.message(), Some("too many requests"));
    assert_eq!(error.reason(), Some("RATE_LIMITED"));
    assert_eq!(error.domain(), Some("api.example.com"));
    assert_eq!(error.metadata().get("endpoint").map(String::as_str), Some("/v1/users"));
    assert_eq!(error.quota_violations()[0].description, "100 requests per minute");
    assert_eq!(error.precondition_violations()[0].subject, "user:9");
    assert_eq!(error.field_violations()[0].field, "page_size");
    assert_eq!(error.user_id(), Some("user-9"));
    assert_eq!(error.tenant_id(), Some("tenant-3"));
    assert_eq!(error.trace(), "trace-1");
    assert_eq!(error.span(), Some("span-1"));
    assert_eq!(error.request_id(), Some("req-77"));
    assert_eq!(error.tags(), ["public-api"]);
    assert_eq!(error.created_at(), time);
    assert_eq!(error.help().map(|help| help.description.as_str()), Some("Rate limits"));
    assert_eq!(error.resource().map(|resource| resource.owner.as_str()), Some("platform"));
    assert_eq!(error.localizations().len(), 2);
    assert_eq!(error.retry(), Some(Retry::after(Duration::from_secs(30))));
}

#[test]
fn generated_trace_is_stable_across_threads() {
    let error = faultline::new("shared");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let error = error.clone();
            std::thread::spawn(move || error.trace().to_owned())
        })
        .collect();
    let traces: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread finished"))
        .collect();
    assert!(traces.iter().all(|trace| trace == error.trace()));
}

#[test]
fn long_chains_do_not_overflow() {
    let mut error = faultline::reason("ROOT").build("root");
    for _ in 0..2_000 {
        error = faultline::wrap(error);
    }
    assert_eq!(error.reason(), Some("ROOT"));
    assert_eq!(error.chain().count(), 2_001);
    assert_eq!(error.to_string(), "root");
}
