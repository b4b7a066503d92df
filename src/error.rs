use core::error::Error as StdError;

use chrono::{DateTime, Utc};

use crate::{
    cause::Cause,
    chain::{self, Chain, Errors},
    node::{Attributes, ErrorNode, Metadata, new_trace_id},
    settings::Settings,
    stack::{StackFrame, StackTrace},
    types::{FieldViolation, Help, Localization, PreconditionViolation, QuotaViolation, Resource, Retry},
};

/// A structured error.
///
/// An `Error` is a cheap, reference-counted handle to an immutable node. A
/// node carries the attributes set on the [`ErrorBuilder`] that created it,
/// the call stack captured at that moment, and optionally a [`Cause`].
///
/// Attribute accessors resolve across the chain of structured causes: the
/// innermost node that set an attribute provides its value, so an error
/// wrapped several times still reports the reason it was first created with.
///
/// ```
/// let inner = faultline::reason("DB_TIMEOUT").build("query timed out");
/// let outer = faultline::ErrorBuilder::new().wrap(inner);
///
/// assert_eq!(outer.reason(), Some("DB_TIMEOUT"));
/// assert_eq!(outer.to_string(), "query timed out");
/// ```
///
/// `Display` prints the one-line summary. The alternate form (`{:#}`) and
/// `Debug` print the full report including the stack trace.
///
/// [`ErrorBuilder`]: crate::ErrorBuilder
#[derive(Clone)]
pub struct Error {
    pub(crate) node: triomphe::Arc<ErrorNode>,
}

impl Error {
    #[track_caller]
    pub(crate) fn from_parts(attrs: Attributes, cause: Option<Cause>, matches: Vec<Cause>) -> Self {
        let stack = StackTrace::capture(&Settings::current().stack);
        Self {
            node: triomphe::Arc::new(ErrorNode::new(attrs, cause, matches, stack)),
        }
    }

    /// Returns `true` if both handles point at the same error node.
    pub fn ptr_eq(&self, other: &Error) -> bool {
        triomphe::Arc::ptr_eq(&self.node, &other.node)
    }

    /// The error this one wraps, if any.
    pub fn cause(&self) -> Option<&Cause> {
        self.node.cause.as_ref()
    }

    /// The structured errors of this chain, starting with `self`.
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    /// Every error reachable from this one, starting with `self`.
    ///
    /// See [`Errors`] for the traversal order.
    pub fn errors(&self) -> Errors<'_> {
        Errors::new(self)
    }

    /// Returns `true` if any error reachable from this one is of type `E` and
    /// equal to `target`.
    ///
    /// Faultline errors compare by identity, so a faultline sentinel matches
    /// only itself and its clones.
    ///
    /// ```
    /// #[derive(Debug, PartialEq, thiserror::Error)]
    /// #[error("not found")]
    /// struct NotFound;
    ///
    /// let error = faultline::reason("LOOKUP").wrap(NotFound);
    /// assert!(error.is(&NotFound));
    /// ```
    pub fn is<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + 'static,
    {
        self.errors()
            .filter_map(|error| error.downcast_ref::<E>())
            .any(|error| error == target)
    }

    /// The first error of type `E` reachable from this one.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.errors().find_map(|error| error.downcast_ref::<E>())
    }

    /// The message, from the innermost node that has one.
    pub fn message(&self) -> Option<&str> {
        chain::innermost(self, |attrs| attrs.message.as_deref())
    }

    /// The machine-readable reason, from the innermost node that has one.
    pub fn reason(&self) -> Option<&str> {
        chain::innermost(self, |attrs| attrs.reason.as_deref())
    }

    /// The domain the reason belongs to.
    pub fn domain(&self) -> Option<&str> {
        chain::innermost(self, |attrs| attrs.domain.as_deref())
    }

    /// The metadata map of the innermost node that has any.
    ///
    /// Maps are not merged across nodes.
    pub fn metadata(&self) -> &Metadata {
        static EMPTY: Metadata = Metadata::with_hasher(rustc_hash::FxBuildHasher);
        chain::innermost(self, |attrs| (!attrs.metadata.is_empty()).then_some(&attrs.metadata))
            .unwrap_or(&EMPTY)
    }

    /// Quota violations of the innermost node that has any.
    pub fn quota_violations(&self) -> &[QuotaViolation] {
        chain::innermost_list(self, |attrs| attrs.quota_violations.as_slice())
    }

    /// Precondition violations of the innermost node that has any.
    pub fn precondition_violations(&self) -> &[PreconditionViolation] {
        chain::innermost_list(self, |attrs| attrs.precondition_violations.as_slice())
    }

    /// Field violations of the innermost node that has any.
    pub fn field_violations(&self) -> &[FieldViolation] {
        chain::innermost_list(self, |attrs| attrs.field_violations.as_slice())
    }

    /// The id of the user the failing operation ran for.
    pub fn user_id(&self) -> Option<&str> {
        chain::innermost(self, |attrs| attrs.user_id.as_deref())
    }

    /// The id of the tenant the failing operation ran for.
    pub fn tenant_id(&self) -> Option<&str> {
        chain::innermost(self, |attrs| attrs.tenant_id.as_deref())
    }

    /// The trace id.
    ///
    /// If no node in the chain was given one, a sortable id (UUIDv7) is
    /// generated on first access and kept on the innermost node, so every
    /// later call returns the same value, through any wrapper.
    pub fn trace(&self) -> &str {
        let resolved = self
            .chain()
            .filter_map(|error| {
                let generated = move || error.node.generated_trace.get().map(String::as_str);
                error.node.attrs.trace.as_deref().or_else(generated)
            })
            .last();
        match resolved {
            Some(trace) => trace,
            None => {
                let innermost = self.chain().last().unwrap_or(self);
                innermost.node.generated_trace.call_once(new_trace_id).as_str()
            }
        }
    }

    /// The span id of this node, or else of the nearest inner node that has
    /// one.
    ///
    /// [`wrap`](crate::ErrorBuilder::wrap) assigns a fresh span to every
    /// wrapping node that was not given one.
    pub fn span(&self) -> Option<&str> {
        self.chain().find_map(|error| error.node.attrs.span.as_deref())
    }

    /// The id of the request that failed.
    pub fn request_id(&self) -> Option<&str> {
        chain::innermost(self, |attrs| attrs.request_id.as_deref())
    }

    /// Tags of every node in the chain, outermost first, without duplicates.
    pub fn tags(&self) -> Vec<&str> {
        chain::aggregate_tags(self)
    }

    /// When the innermost structured error was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.chain()
            .last()
            .map_or(self.node.created_at, |error| error.node.created_at)
    }

    /// Documentation that helps resolve the error.
    pub fn help(&self) -> Option<&Help> {
        chain::innermost(self, |attrs| attrs.help.as_ref().filter(|help| !help.is_empty()))
    }

    /// The resource the failing operation acted on.
    pub fn resource(&self) -> Option<&Resource> {
        chain::innermost(self, |attrs| {
            attrs.resource.as_ref().filter(|resource| !resource.is_empty())
        })
    }

    /// Localized messages of the innermost node that has any.
    pub fn localizations(&self) -> &[Localization] {
        chain::innermost_list(self, |attrs| attrs.localizations.as_slice())
    }

    /// How long to wait before retrying.
    pub fn retry(&self) -> Option<Retry> {
        chain::innermost(self, |attrs| attrs.retry.filter(|retry| !retry.is_empty()))
    }

    /// The frames captured when this node was created, innermost call first.
    ///
    /// Unlike the other accessors this does not look at the cause.
    pub fn frames(&self) -> &[StackFrame] {
        self.node.stack.frames()
    }

    /// The location of the innermost captured frame of this node.
    pub fn location(&self) -> Option<&StackFrame> {
        self.node.stack.top()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Error {}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.node
            .cause
            .as_ref()
            .or_else(|| self.node.matches.first())
            .map(Cause::as_error)
    }
}

/// Finds the structured error inside an arbitrary error, following its
/// `source()` chain.
///
/// ```
/// use std::error::Error as _;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("request failed")]
/// struct RequestFailed(#[source] faultline::Error);
///
/// let error = RequestFailed(faultline::reason("QUOTA").build("out of quota"));
/// let found = faultline::as_error(&error).expect("structured error in chain");
/// assert_eq!(found.reason(), Some("QUOTA"));
/// ```
pub fn as_error<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    let mut current = Some(error);
    while let Some(error) = current {
        if let Some(found) = error.downcast_ref::<Error>() {
            return Some(found);
        }
        current = error.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::ErrorBuilder;

    static_assertions::assert_impl_all!(Error: Send, Sync, Clone, StdError);

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("not found")]
    struct NotFound;

    #[test]
    fn test_reason_from_innermost_setter() {
        let c = crate::reason("C").domain("storage").build("c");
        let b = crate::domain("api").wrap(c);
        let a = ErrorBuilder::new().wrap(b);
        assert_eq!(a.reason(), Some("C"));
        assert_eq!(a.domain(), Some("storage"));
    }

    #[test]
    fn test_unset_attributes_are_empty() {
        let error = crate::new("plain");
        assert_eq!(error.reason(), None);
        assert!(error.metadata().is_empty());
        assert!(error.quota_violations().is_empty());
        assert!(error.tags().is_empty());
        assert_eq!(error.help(), None);
        assert_eq!(error.resource(), None);
        assert_eq!(error.retry(), None);
        assert_eq!(error.span(), None);
    }

    #[test]
    fn test_trace_generated_once() {
        let error = crate::new("no trace");
        let first = error.trace().to_owned();
        assert_eq!(error.trace(), first);
        assert_eq!(error.clone().trace(), first);
        let version = uuid::Uuid::parse_str(&first).ok().map(|id| id.get_version_num());
        assert_eq!(version, Some(7));
    }

    #[test]
    fn test_generated_trace_shared_with_wrappers() {
        let inner = crate::new("no trace");
        let generated = inner.trace().to_owned();
        let outer = crate::wrap(inner.clone());
        assert_eq!(outer.trace(), generated);

        let fresh = crate::new("fresh");
        let wrapped = crate::reason("WRAPPED").wrap(fresh.clone());
        let from_outer = wrapped.trace().to_owned();
        assert_eq!(fresh.trace(), from_outer);
    }

    #[test]
    fn test_explicit_trace_wins() {
        let inner = crate::trace("abc").build("inner");
        let outer = crate::wrap(inner);
        assert_eq!(outer.trace(), "abc");
    }

    #[test]
    fn test_span_prefers_own_then_inner() {
        let inner = crate::span("inner-span").build("inner");
        assert_eq!(inner.span(), Some("inner-span"));

        let outer = crate::span("outer-span").wrap(inner.clone());
        assert_eq!(outer.span(), Some("outer-span"));

        let wrapped = crate::wrap(inner);
        let span = wrapped.span().expect("wrap assigns a span");
        assert_ne!(span, "inner-span");
    }

    #[test]
    fn test_created_at_from_innermost() {
        let time = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let inner = crate::time(time).build("inner");
        let outer = crate::wrap(inner);
        assert_eq!(outer.created_at(), time);
    }

    #[test]
    fn test_retry_and_help() {
        let error = crate::retry(Retry::after(Duration::from_secs(3)))
            .help(Help {
                description: "see docs".to_owned(),
                url: "https://example.com".to_owned(),
            })
            .build("slow down");
        assert_eq!(error.retry(), Some(Retry::after(Duration::from_secs(3))));
        assert_eq!(error.help().map(|help| help.url.as_str()), Some("https://example.com"));
    }

    #[test]
    fn test_identity_through_wrap() {
        let error = crate::wrap(NotFound);
        assert!(error.is(&NotFound));
        assert!(error.find::<NotFound>().is_some());
        assert!(error.source().is_some_and(|source| source.is::<NotFound>()));
    }

    #[test]
    fn test_structured_sentinel_matches_by_identity() {
        let sentinel = crate::new("sentinel");
        let other = crate::new("sentinel");
        let wrapped = crate::wrap(sentinel.clone());
        assert!(wrapped.is(&sentinel));
        assert!(!wrapped.is(&other));
        assert_eq!(sentinel, sentinel.clone());
        assert_ne!(sentinel, other);
    }

    #[test]
    fn test_as_error_through_foreign_source() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] Error);

        let inner = crate::reason("INNER").build("inner");
        let outer = Outer(inner.clone());
        assert!(as_error(&outer).is_some_and(|found| found.ptr_eq(&inner)));
        assert!(as_error(&NotFound).is_none());
    }
}
