#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Tracing integration for faultline errors.
//!
//! - [`log_error`] emits an error as a `tracing` event, with the resolved
//!   attributes as event fields.
//! - [`SpanExt::with_current_span`] stamps an
//!   [`ErrorBuilder`](faultline::ErrorBuilder) with the id of the current
//!   `tracing` span, so errors can be correlated with the logs around them.
//!
//! # Quick Start
//!
//! ```
//! use faultline::{ErrorBuilder, Verbosity};
//! use faultline_tracing::{SpanExt, log_error};
//!
//! #[tracing::instrument]
//! fn charge(amount: u64) -> Result<(), faultline::Error> {
//!     Err(ErrorBuilder::new()
//!         .reason("CARD_DECLINED")
//!         .with_current_span()
//!         .build("payment failed"))
//! }
//!
//! if let Err(error) = charge(12) {
//!     log_error(&error, Verbosity::Summary);
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `FAULTLINE_TRACING` - Comma-separated options:
//!   - `no_scope` - Do not record the names of the enclosing spans in the
//!     `span.scope` metadata entry

use std::sync::OnceLock;

use faultline::{Error, ErrorBuilder, Verbosity, structured::Value};
use tracing::Span;

/// Metadata key holding the names of the enclosing spans, outermost first.
pub const SCOPE_METADATA_KEY: &str = "span.scope";

/// Emits `error` as an `ERROR` level event with target `faultline`.
///
/// The event is built from [`Error::structured`]: the message is the
/// error's summary and every other resolved attribute becomes an event field
/// (`quota_violations`, `retry`, ...); unset ones are left out. Groups render
/// as `{key=value ...}` and lists as comma-separated items. With
/// [`Verbosity::Full`] the stack trace is added as the `stack_trace` field.
pub fn log_error(error: &Error, verbosity: Verbosity) {
    let view = error.structured();
    let field = |key: &str| view.get(key).map(render_value);

    let message = field("message").unwrap_or_default();
    let reason = field("reason");
    let domain = field("domain");
    let metadata = field("metadata");
    let quota_violations = field("quotaViolations");
    let precondition_violations = field("preconditionViolations");
    let field_violations = field("fieldViolations");
    let user_id = field("userId");
    let tenant_id = field("tenantId");
    let trace = field("trace");
    let span = field("span");
    let request_id = field("requestId");
    let tags = field("tags");
    let time = field("time");
    let help = field("help");
    let resource = field("resource");
    let localizations = field("localizations");
    let retry = field("retry");
    let stack_trace = match verbosity {
        Verbosity::Summary => None,
        Verbosity::Full => field("stackTrace"),
    };

    tracing::error!(
        target: "faultline",
        reason = reason.as_deref(),
        domain = domain.as_deref(),
        metadata = metadata.as_deref(),
        quota_violations = quota_violations.as_deref(),
        precondition_violations = precondition_violations.as_deref(),
        field_violations = field_violations.as_deref(),
        user_id = user_id.as_deref(),
        tenant_id = tenant_id.as_deref(),
        trace = trace.as_deref(),
        span = span.as_deref(),
        request_id = request_id.as_deref(),
        tags = tags.as_deref(),
        time = time.as_deref(),
        help = help.as_deref(),
        resource = resource.as_deref(),
        localizations = localizations.as_deref(),
        retry = retry.as_deref(),
        stack_trace = stack_trace.as_deref(),
        "{message}"
    );
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Time(time) => time.to_rfc3339(),
        Value::Duration(delay) => format!("{delay:?}"),
        Value::List(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        Value::Group(fields) => {
            let entries: Vec<String> = fields
                .iter()
                .map(|field| format!("{}={}", field.key, render_value(&field.value)))
                .collect();
            format!("{{{}}}", entries.join(" "))
        }
    }
}

#[derive(Debug)]
struct FaultlineTracingEnvOptions {
    record_scope: bool,
}

impl FaultlineTracingEnvOptions {
    fn get() -> &'static Self {
        static FAULTLINE_TRACING_FLAGS: OnceLock<FaultlineTracingEnvOptions> = OnceLock::new();

        FAULTLINE_TRACING_FLAGS.get_or_init(|| {
            let mut record_scope = true;

            if let Some(var) = std::env::var_os("FAULTLINE_TRACING") {
                for v in var.to_string_lossy().split(',') {
                    if v.trim().eq_ignore_ascii_case("no_scope") {
                        record_scope = false;
                    }
                }
            }

            FaultlineTracingEnvOptions { record_scope }
        })
    }
}

/// Extension trait for stamping builders with the current tracing span.
pub trait SpanExt: Sized {
    /// Returns a builder whose span id is the id of the current `tracing`
    /// span, as 16 hex digits.
    ///
    /// When the subscriber is built on a [`tracing_subscriber::Registry`],
    /// the names of the enclosing spans are also recorded under
    /// [`SCOPE_METADATA_KEY`], e.g. `"handle_request > charge"`.
    ///
    /// Outside of any span the builder is returned unchanged.
    fn with_current_span(&self) -> Self;
}

impl SpanExt for ErrorBuilder {
    fn with_current_span(&self) -> Self {
        let span = Span::current();
        let Some(id) = span.id() else {
            return self.clone();
        };

        let builder = self.span(format!("{:016x}", id.into_u64()));
        if !FaultlineTracingEnvOptions::get().record_scope {
            return builder;
        }
        match span_scope(&span) {
            Some(scope) => builder.with_metadata(SCOPE_METADATA_KEY, scope),
            None => builder,
        }
    }
}

fn span_scope(span: &Span) -> Option<String> {
    use tracing_subscriber::registry::LookupSpan;

    span.with_subscriber(|(span_id, dispatch)| {
        let registry = dispatch.downcast_ref::<tracing_subscriber::Registry>()?;
        let span_ref = registry.span(span_id)?;
        let names: Vec<&str> = span_ref.scope().from_root().map(|span| span.name()).collect();
        Some(names.join(" > "))
    })
    .flatten()
}
