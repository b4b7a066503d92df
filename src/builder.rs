//! Immutable construction of errors.
//!
//! An [`ErrorBuilder`] collects attributes and turns them into an [`Error`]
//! with one of its terminal operations. Every setter returns a new builder
//! and leaves the receiver untouched, so a partially configured builder can
//! be shared between call sites without one leaking its settings into
//! another:
//!
//! ```
//! use faultline::ErrorBuilder;
//!
//! let storage = ErrorBuilder::new().domain("storage");
//! let timeout = storage.reason("TIMEOUT").build("query timed out");
//! let missing = storage.reason("NOT_FOUND").build("no such row");
//!
//! assert_eq!(timeout.reason(), Some("TIMEOUT"));
//! assert_eq!(missing.reason(), Some("NOT_FOUND"));
//! assert_eq!(storage.build("other").reason(), None);
//! ```
//!
//! Terminal operations capture the call stack of their caller; see
//! [`stack`](crate::stack).

use core::fmt;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    cause::{Cause, Joined},
    node::{Attributes, new_span_id},
    types::{FieldViolation, Help, Localization, PreconditionViolation, QuotaViolation, Resource, Retry},
};

/// A copy-on-write collection of error attributes.
///
/// See the [module documentation](self).
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct ErrorBuilder {
    attrs: Attributes,
}

impl ErrorBuilder {
    /// Creates a builder with no attributes set.
    pub fn new() -> Self {
        Self::default()
    }

    fn with(&self, apply: impl FnOnce(&mut Attributes)) -> Self {
        let mut attrs = self.attrs.clone();
        apply(&mut attrs);
        Self { attrs }
    }

    /// Sets the machine-readable reason, e.g. `"RATE_LIMITED"`.
    pub fn reason(&self, reason: impl Into<String>) -> Self {
        self.with(|attrs| attrs.reason = Some(reason.into()))
    }

    /// Sets the domain the reason belongs to, e.g. `"billing.example.com"`.
    pub fn domain(&self, domain: impl Into<String>) -> Self {
        self.with(|attrs| attrs.domain = Some(domain.into()))
    }

    /// Adds a metadata entry. Setting an existing key replaces its value and
    /// keeps its position.
    pub fn with_metadata(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(|attrs| {
            attrs.metadata.insert(key.into(), value.into());
        })
    }

    /// Appends a quota violation.
    pub fn with_quota_violation(
        &self,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.with(|attrs| {
            attrs.quota_violations.push(QuotaViolation {
                subject: subject.into(),
                description: description.into(),
            });
        })
    }

    /// Appends a precondition violation.
    pub fn with_precondition_violation(
        &self,
        kind: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.with(|attrs| {
            attrs.precondition_violations.push(PreconditionViolation {
                kind: kind.into(),
                subject: subject.into(),
                description: description.into(),
            });
        })
    }

    /// Appends a field violation.
    pub fn with_field_violation(
        &self,
        field: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.with(|attrs| {
            attrs.field_violations.push(FieldViolation {
                field: field.into(),
                description: description.into(),
            });
        })
    }

    /// Sets the id of the user the operation ran for.
    pub fn user_id(&self, user_id: impl Into<String>) -> Self {
        self.with(|attrs| attrs.user_id = Some(user_id.into()))
    }

    /// Sets the id of the tenant the operation ran for.
    pub fn tenant_id(&self, tenant_id: impl Into<String>) -> Self {
        self.with(|attrs| attrs.tenant_id = Some(tenant_id.into()))
    }

    /// Sets the trace id. Without one, errors generate their own on first
    /// access.
    pub fn trace(&self, trace: impl Into<String>) -> Self {
        self.with(|attrs| attrs.trace = Some(trace.into()))
    }

    /// Sets the span id.
    pub fn span(&self, span: impl Into<String>) -> Self {
        self.with(|attrs| attrs.span = Some(span.into()))
    }

    /// Sets the id of the request that failed.
    pub fn request_id(&self, request_id: impl Into<String>) -> Self {
        self.with(|attrs| attrs.request_id = Some(request_id.into()))
    }

    /// Appends a tag.
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        self.with(|attrs| attrs.tags.push(tag.into()))
    }

    /// Overrides the creation time, which otherwise is the time the terminal
    /// operation runs.
    pub fn time(&self, time: DateTime<Utc>) -> Self {
        self.with(|attrs| attrs.time = Some(time))
    }

    /// Sets the documentation pointer.
    pub fn help(&self, help: Help) -> Self {
        self.with(|attrs| attrs.help = Some(help))
    }

    /// Sets the resource the operation acted on.
    pub fn resource(&self, resource: Resource) -> Self {
        self.with(|attrs| attrs.resource = Some(resource))
    }

    /// Appends a localized message.
    pub fn with_localization(&self, localization: Localization) -> Self {
        self.with(|attrs| attrs.localizations.push(localization))
    }

    /// Sets the retry hint.
    pub fn retry(&self, retry: Retry) -> Self {
        self.with(|attrs| attrs.retry = Some(retry))
    }

    /// Creates an error with the given message and no cause.
    #[track_caller]
    pub fn build(&self, message: impl Into<String>) -> Error {
        self.build_message(message.into(), Vec::new())
    }

    /// Creates an error with a formatted message. Usually called through
    /// [`errorf!`](crate::errorf).
    #[track_caller]
    pub fn build_formatted(&self, args: fmt::Arguments<'_>) -> Error {
        self.build_message(format_message(args), Vec::new())
    }

    /// Like [`build_formatted`](Self::build_formatted), keeping `wraps`
    /// reachable for [`Error::is`] and [`Error::find`].
    ///
    /// The wrapped errors do not take part in attribute resolution and are
    /// not rendered; their text is expected to be part of the message.
    #[track_caller]
    pub fn build_formatted_wrapping(
        &self,
        args: fmt::Arguments<'_>,
        wraps: Vec<Cause>,
    ) -> Error {
        self.build_message(format_message(args), wraps)
    }

    #[track_caller]
    pub(crate) fn build_message(&self, message: String, wraps: Vec<Cause>) -> Error {
        let mut attrs = self.attrs.clone();
        attrs.message = Some(message);
        Error::from_parts(attrs, None, wraps)
    }

    /// Wraps `cause` in a new error carrying this builder's attributes.
    ///
    /// The new error gets a fresh span id unless one was set.
    #[track_caller]
    pub fn wrap(&self, cause: impl Into<Cause>) -> Error {
        Error::from_parts(self.wrapping_attrs(), Some(cause.into()), Vec::new())
    }

    /// Wraps the error if there is one. Wrapping nothing yields nothing.
    #[track_caller]
    pub fn wrap_option<E>(&self, cause: Option<E>) -> Option<Error>
    where
        E: Into<Cause>,
    {
        match cause {
            Some(cause) => Some(self.wrap(cause)),
            None => None,
        }
    }

    /// Like [`wrap`](Self::wrap), with a formatted message on the new error.
    /// Usually called through [`wrapf!`](crate::wrapf).
    #[track_caller]
    pub fn wrap_formatted(&self, cause: impl Into<Cause>, args: fmt::Arguments<'_>) -> Error {
        self.wrap_message(cause.into(), format_message(args), Vec::new())
    }

    /// Like [`wrap_formatted`](Self::wrap_formatted), keeping `wraps`
    /// reachable for identity matching.
    #[track_caller]
    pub fn wrap_formatted_wrapping(
        &self,
        cause: impl Into<Cause>,
        args: fmt::Arguments<'_>,
        wraps: Vec<Cause>,
    ) -> Error {
        self.wrap_message(cause.into(), format_message(args), wraps)
    }

    #[track_caller]
    pub(crate) fn wrap_message(&self, cause: Cause, message: String, wraps: Vec<Cause>) -> Error {
        let mut attrs = self.wrapping_attrs();
        attrs.message = Some(message);
        Error::from_parts(attrs, Some(cause), wraps)
    }

    /// Joins several errors into one cause and wraps it.
    ///
    /// Returns `None` if `causes` is empty.
    ///
    /// ```
    /// use faultline::ErrorBuilder;
    ///
    /// let first = faultline::new("first");
    /// let second = faultline::new("second");
    /// let joined = ErrorBuilder::new()
    ///     .join([first.clone(), second])
    ///     .expect("two errors joined");
    ///
    /// assert_eq!(joined.to_string(), "first\nsecond");
    /// assert!(joined.is(&first));
    /// assert!(ErrorBuilder::new().join(Vec::<faultline::Error>::new()).is_none());
    /// ```
    #[track_caller]
    pub fn join<I>(&self, causes: I) -> Option<Error>
    where
        I: IntoIterator,
        I::Item: Into<Cause>,
    {
        let causes: Vec<Cause> = causes.into_iter().map(Into::into).collect();
        if causes.is_empty() {
            return None;
        }
        Some(self.wrap(Cause::Joined(Joined::new(causes))))
    }

    fn wrapping_attrs(&self) -> Attributes {
        let mut attrs = self.attrs.clone();
        if attrs.span.is_none() {
            attrs.span = Some(new_span_id());
        }
        attrs
    }
}

fn format_message(args: fmt::Arguments<'_>) -> String {
    match args.as_str() {
        Some(message) => message.to_owned(),
        None => args.to_string(),
    }
}
