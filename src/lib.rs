#![deny(
    missing_docs,
    unsafe_code,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Structured errors that carry their own diagnostics.
//!
//! ## Overview
//!
//! faultline builds error values that carry much more than a message: a
//! machine-readable reason and domain, metadata, quota, precondition and
//! field violations, user, tenant, trace, span and request ids, tags, help
//! links, the affected resource, localized messages, a retry hint and the
//! call stack at the point of failure.
//!
//! Errors are created through an immutable [`ErrorBuilder`]. Every setter
//! returns a new builder, so a builder configured once can be shared by many
//! call sites:
//!
//! ```
//! use faultline::ErrorBuilder;
//!
//! let billing = ErrorBuilder::new().domain("billing").with_tag("payments");
//!
//! let error = billing
//!     .reason("CARD_DECLINED")
//!     .user_id("user-7")
//!     .with_metadata("card", "visa-4242")
//!     .build("payment failed");
//!
//! assert_eq!(error.reason(), Some("CARD_DECLINED"));
//! assert_eq!(error.tags(), ["payments"]);
//! ```
//!
//! ## Chains
//!
//! Terminal operations such as [`ErrorBuilder::wrap`] put the previous error
//! behind the new one. Accessors look through the whole chain: each
//! attribute comes from the innermost error that set it, and tags are
//! collected from every error.
//!
//! ```
//! let inner = faultline::reason("NOT_FOUND").build("no such user");
//! let outer = faultline::with_tag("api").wrap(inner);
//!
//! assert_eq!(outer.reason(), Some("NOT_FOUND"));
//! assert_eq!(outer.to_string(), "no such user");
//! ```
//!
//! Any `std::error::Error + Send + Sync + 'static` can be wrapped. Such
//! foreign errors end the chain of attributes but stay reachable for
//! [`Error::is`] and [`Error::find`].
//!
//! ## Output
//!
//! - `Display` prints the one-line [summary](Error::summary).
//! - `{:#}` and `Debug` print the [verbose report](Error::verbose_report)
//!   with every attribute and the stack trace.
//! - [`Error::structured`] returns a key/value view for structured loggers;
//!   the `faultline-tracing` crate emits it as a `tracing` event.
//!
//! ## Features
//!
//! - `backtrace` (default) - capture full call stacks. Without it, only the
//!   location of the terminal operation is recorded.
//! - `serde` - `Serialize` for the attribute types and the structured view.
//!   The JSON tests only run with it enabled (`cargo test --features serde`).
//! - `tracing` - log ignored configuration values and truncated stack
//!   captures.
//!
//! Stack capture is configured through [`settings`].

#[macro_use]
mod util;
#[macro_use]
mod macros;

pub mod prelude;
pub mod settings;
pub mod stack;
pub mod structured;
pub mod types;

mod builder;
mod cause;
mod chain;
mod error;
mod node;
mod report;
mod result_ext;

use core::fmt;

use chrono::{DateTime, Utc};

pub use self::{
    builder::ErrorBuilder,
    cause::{Cause, Joined},
    chain::{Chain, Errors},
    error::{Error, as_error},
    node::Metadata,
    report::Verbosity,
    result_ext::ResultExt,
    types::{FieldViolation, Help, Localization, PreconditionViolation, QuotaViolation, Resource, Retry},
};

/// A [`Result`](core::result::Result) type alias where the error is
/// [`Error`].
///
/// ```
/// fn might_fail() -> faultline::Result<String> {
///     Ok("success".to_string())
/// }
/// ```
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Creates an error with the given message. Shorthand for
/// `ErrorBuilder::new().build(message)`.
#[track_caller]
pub fn new(message: impl Into<String>) -> Error {
    ErrorBuilder::new().build(message)
}

/// Wraps `cause` in a new error without a message.
#[track_caller]
pub fn wrap(cause: impl Into<Cause>) -> Error {
    ErrorBuilder::new().wrap(cause)
}

/// Wraps the error if there is one. Wrapping nothing yields nothing.
#[track_caller]
pub fn wrap_option<E>(cause: Option<E>) -> Option<Error>
where
    E: Into<Cause>,
{
    ErrorBuilder::new().wrap_option(cause)
}

/// Wraps `cause` in a new error with a formatted message. See also
/// [`wrapf!`].
#[track_caller]
pub fn wrap_formatted(cause: impl Into<Cause>, args: fmt::Arguments<'_>) -> Error {
    ErrorBuilder::new().wrap_formatted(cause, args)
}

/// Joins several errors into one. Returns `None` if there are none.
#[track_caller]
pub fn join<I>(causes: I) -> Option<Error>
where
    I: IntoIterator,
    I::Item: Into<Cause>,
{
    ErrorBuilder::new().join(causes)
}

/// Starts a builder with a reason. See [`ErrorBuilder::reason`].
pub fn reason(reason: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().reason(reason)
}

/// Starts a builder with a domain. See [`ErrorBuilder::domain`].
pub fn domain(domain: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().domain(domain)
}

/// Starts a builder with a metadata entry. See
/// [`ErrorBuilder::with_metadata`].
pub fn with_metadata(key: impl Into<String>, value: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().with_metadata(key, value)
}

/// Starts a builder with a quota violation. See
/// [`ErrorBuilder::with_quota_violation`].
pub fn with_quota_violation(
    subject: impl Into<String>,
    description: impl Into<String>,
) -> ErrorBuilder {
    ErrorBuilder::new().with_quota_violation(subject, description)
}

/// Starts a builder with a precondition violation. See
/// [`ErrorBuilder::with_precondition_violation`].
pub fn with_precondition_violation(
    kind: impl Into<String>,
    subject: impl Into<String>,
    description: impl Into<String>,
) -> ErrorBuilder {
    ErrorBuilder::new().with_precondition_violation(kind, subject, description)
}

/// Starts a builder with a field violation. See
/// [`ErrorBuilder::with_field_violation`].
pub fn with_field_violation(
    field: impl Into<String>,
    description: impl Into<String>,
) -> ErrorBuilder {
    ErrorBuilder::new().with_field_violation(field, description)
}

/// Starts a builder with a user id.
pub fn user_id(user_id: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().user_id(user_id)
}

/// Starts a builder with a tenant id.
pub fn tenant_id(tenant_id: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().tenant_id(tenant_id)
}

/// Starts a builder with a trace id.
pub fn trace(trace: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().trace(trace)
}

/// Starts a builder with a span id.
pub fn span(span: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().span(span)
}

/// Starts a builder with a request id.
pub fn request_id(request_id: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().request_id(request_id)
}

/// Starts a builder with a tag.
pub fn with_tag(tag: impl Into<String>) -> ErrorBuilder {
    ErrorBuilder::new().with_tag(tag)
}

/// Starts a builder with a creation time.
pub fn time(time: DateTime<Utc>) -> ErrorBuilder {
    ErrorBuilder::new().time(time)
}

/// Starts a builder with a documentation pointer.
pub fn help(help: Help) -> ErrorBuilder {
    ErrorBuilder::new().help(help)
}

/// Starts a builder with the affected resource.
pub fn resource(resource: Resource) -> ErrorBuilder {
    ErrorBuilder::new().resource(resource)
}

/// Starts a builder with a localized message.
pub fn with_localization(localization: Localization) -> ErrorBuilder {
    ErrorBuilder::new().with_localization(localization)
}

/// Starts a builder with a retry hint.
pub fn retry(retry: Retry) -> ErrorBuilder {
    ErrorBuilder::new().retry(retry)
}

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    use core::fmt;

    #[doc(hidden)]
    pub use std::{format, format_args, vec};

    use crate::{Cause, Error, ErrorBuilder};

    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    #[track_caller]
    pub fn build_formatted(args: fmt::Arguments<'_>) -> Error {
        ErrorBuilder::new().build_formatted(args)
    }

    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    #[track_caller]
    pub fn build_message(message: String, wraps: Vec<Cause>) -> Error {
        ErrorBuilder::new().build_message(message, wraps)
    }

    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    #[track_caller]
    pub fn wrap_message(cause: impl Into<Cause>, message: String, wraps: Vec<Cause>) -> Error {
        ErrorBuilder::new().wrap_message(cause.into(), message, wraps)
    }
}
