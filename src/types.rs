//! Violation records and guidance values carried by an [`Error`].
//!
//! All of these are plain data. Violations are appended to an error through
//! the builder and read back in insertion order; the guidance values
//! ([`Help`], [`Resource`], [`Retry`]) are either entirely unset or
//! meaningful, and [`is_empty`](Help::is_empty) tells the two apart.
//!
//! [`Error`]: crate::Error

use core::time::Duration;

/// A quota that was exceeded, such as a rate limit or a storage cap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QuotaViolation {
    /// What the quota applies to, e.g. `"project:42"`.
    pub subject: String,
    /// Why the quota check failed.
    pub description: String,
}

/// A precondition that did not hold when the operation was attempted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PreconditionViolation {
    /// The kind of precondition, e.g. `"TOS"` or `"FRESHNESS"`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    /// What the precondition applies to.
    pub subject: String,
    /// Why the precondition failed.
    pub description: String,
}

/// A request field that failed validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldViolation {
    /// Path of the offending field, e.g. `"user.email"`.
    pub field: String,
    /// Why the value was rejected.
    pub description: String,
}

/// A pointer to documentation that helps resolve the error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Help {
    /// Short description of what the link covers.
    pub description: String,
    /// Where the documentation lives.
    pub url: String,
}

impl Help {
    /// Returns `true` when neither field is set.
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.url.is_empty()
    }
}

/// The resource the failing operation was acting on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Resource {
    /// Resource type, e.g. `"sql table"`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    /// Resource name.
    pub name: String,
    /// Owner of the resource, if known.
    pub owner: String,
    /// Free-form description.
    pub description: String,
}

impl Resource {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
            && self.name.is_empty()
            && self.owner.is_empty()
            && self.description.is_empty()
    }
}

/// A user-facing message in one locale.
///
/// Errors may carry several candidates; picking one is up to the consumer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Localization {
    /// BCP 47 language tag, e.g. `"en-US"`.
    pub locale: String,
    /// The localized message.
    pub message: String,
}

impl Localization {
    /// Creates a localization from a locale tag and a message.
    pub fn new(locale: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            message: message.into(),
        }
    }
}

/// How long a client should wait before retrying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Retry {
    /// The suggested delay.
    pub delay: Duration,
}

impl Retry {
    /// Creates a retry hint with the given delay.
    pub const fn after(delay: Duration) -> Self {
        Self { delay }
    }

    /// Returns `true` when no delay is set.
    pub fn is_empty(&self) -> bool {
        self.delay.is_zero()
    }
}
