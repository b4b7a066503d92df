//! The attribute record shared by builders and error nodes.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use uuid::Uuid;

use crate::{
    cause::Cause,
    stack::StackTrace,
    types::{FieldViolation, Help, Localization, PreconditionViolation, QuotaViolation, Resource, Retry},
};

/// Key/value metadata attached to an error, in insertion order.
pub type Metadata = IndexMap<String, String, FxBuildHasher>;

/// Every attribute a single error node can carry.
///
/// Builders accumulate one of these; terminal operations copy it into the
/// node they create.
#[derive(Clone, Debug, Default)]
pub(crate) struct Attributes {
    pub(crate) message: Option<String>,
    pub(crate) reason: Option<String>,
    pub(crate) domain: Option<String>,
    pub(crate) metadata: Metadata,
    pub(crate) quota_violations: Vec<QuotaViolation>,
    pub(crate) precondition_violations: Vec<PreconditionViolation>,
    pub(crate) field_violations: Vec<FieldViolation>,
    pub(crate) user_id: Option<String>,
    pub(crate) tenant_id: Option<String>,
    pub(crate) trace: Option<String>,
    pub(crate) span: Option<String>,
    pub(crate) request_id: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) time: Option<DateTime<Utc>>,
    pub(crate) help: Option<Help>,
    pub(crate) resource: Option<Resource>,
    pub(crate) localizations: Vec<Localization>,
    pub(crate) retry: Option<Retry>,
}

/// One link of an error chain. Immutable once created, apart from the lazily
/// generated trace id.
#[derive(Debug)]
pub(crate) struct ErrorNode {
    pub(crate) cause: Option<Cause>,
    /// Errors reachable for identity matching only.
    pub(crate) matches: Vec<Cause>,
    pub(crate) attrs: Attributes,
    pub(crate) stack: StackTrace,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) generated_trace: spin::Once<String>,
}

impl ErrorNode {
    pub(crate) fn new(
        attrs: Attributes,
        cause: Option<Cause>,
        matches: Vec<Cause>,
        stack: StackTrace,
    ) -> Self {
        let created_at = attrs.time.unwrap_or_else(Utc::now);
        Self {
            cause,
            matches,
            attrs,
            stack,
            created_at,
            generated_trace: spin::Once::new(),
        }
    }
}

impl Drop for ErrorNode {
    // Unlinks uniquely owned inner nodes iteratively.
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(Cause::Node(error)) = next {
            match triomphe::Arc::try_unwrap(error.node) {
                Ok(mut node) => next = node.cause.take(),
                Err(_) => break,
            }
        }
    }
}

/// Sortable trace id: UUIDv7 embeds the creation time.
pub(crate) fn new_trace_id() -> String {
    Uuid::now_v7().to_string()
}

pub(crate) fn new_span_id() -> String {
    Uuid::new_v4().to_string()
}
