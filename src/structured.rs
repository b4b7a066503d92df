//! A key/value view of an error for structured loggers.
//!
//! [`Error::structured`] resolves every attribute once and returns them as a
//! tree of [`Field`]s. Keys use `lowerCamelCase`; unset attributes are left
//! out. With the `serde` feature the view serializes as a map:
//!
//! ```json
//! {
//!   "message": "could not load user",
//!   "reason": "NOT_FOUND",
//!   "metadata": { "user": "42" },
//!   "trace": "0190e7d4-...",
//!   "time": "2026-01-01T12:00:00Z",
//!   "stackTrace": "Error: ..."
//! }
//! ```

use core::time::Duration;

use chrono::{DateTime, Utc};

use crate::Error;

/// A named value in a [`StructuredView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// The attribute name, e.g. `"requestId"`.
    pub key: String,
    /// The attribute value.
    pub value: Value,
}

impl Field {
    fn new(key: &str, value: Value) -> Self {
        Self {
            key: key.to_owned(),
            value,
        }
    }

    fn string(key: &str, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }
}

/// A value in a [`StructuredView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Plain text.
    String(String),
    /// A point in time.
    Time(DateTime<Utc>),
    /// A length of time.
    Duration(Duration),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// Named sub-fields.
    Group(Vec<Field>),
}

impl Value {
    /// The text, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// The sub-fields, if this is a [`Value::Group`].
    pub fn as_group(&self) -> Option<&[Field]> {
        match self {
            Value::Group(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Every resolved attribute of an error, in a fixed order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructuredView {
    /// The top-level fields.
    pub fields: Vec<Field>,
}

impl StructuredView {
    /// Looks up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| &field.value)
    }
}

impl Error {
    /// Resolves every attribute into a [`StructuredView`].
    ///
    /// The `message` field holds the [summary](Self::summary); the stack
    /// trace is included as text under `stackTrace`.
    ///
    /// ```
    /// let error = faultline::reason("NOT_FOUND")
    ///     .with_metadata("user", "42")
    ///     .build("could not load user");
    /// let view = error.structured();
    ///
    /// let reason = view.get("reason").and_then(|value| value.as_str());
    /// assert_eq!(reason, Some("NOT_FOUND"));
    /// assert!(view.get("tenantId").is_none());
    /// ```
    pub fn structured(&self) -> StructuredView {
        let mut fields = Vec::new();

        fields.push(Field::string("message", self.summary()));
        if let Some(reason) = self.reason() {
            fields.push(Field::string("reason", reason));
        }
        if let Some(domain) = self.domain() {
            fields.push(Field::string("domain", domain));
        }

        let metadata = self.metadata();
        if !metadata.is_empty() {
            let entries = metadata
                .iter()
                .map(|(key, value)| Field::string(key, value.as_str()))
                .collect();
            fields.push(Field::new("metadata", Value::Group(entries)));
        }

        let quota_violations = self.quota_violations();
        if !quota_violations.is_empty() {
            let items = quota_violations
                .iter()
                .map(|violation| {
                    Value::Group(vec![
                        Field::string("subject", violation.subject.as_str()),
                        Field::string("description", violation.description.as_str()),
                    ])
                })
                .collect();
            fields.push(Field::new("quotaViolations", Value::List(items)));
        }

        let precondition_violations = self.precondition_violations();
        if !precondition_violations.is_empty() {
            let items = precondition_violations
                .iter()
                .map(|violation| {
                    Value::Group(vec![
                        Field::string("type", violation.kind.as_str()),
                        Field::string("subject", violation.subject.as_str()),
                        Field::string("description", violation.description.as_str()),
                    ])
                })
                .collect();
            fields.push(Field::new("preconditionViolations", Value::List(items)));
        }

        let field_violations = self.field_violations();
        if !field_violations.is_empty() {
            let items = field_violations
                .iter()
                .map(|violation| {
                    Value::Group(vec![
                        Field::string("field", violation.field.as_str()),
                        Field::string("description", violation.description.as_str()),
                    ])
                })
                .collect();
            fields.push(Field::new("fieldViolations", Value::List(items)));
        }

        if let Some(user_id) = self.user_id() {
            fields.push(Field::string("userId", user_id));
        }
        if let Some(tenant_id) = self.tenant_id() {
            fields.push(Field::string("tenantId", tenant_id));
        }
        fields.push(Field::string("trace", self.trace()));
        if let Some(span) = self.span() {
            fields.push(Field::string("span", span));
        }
        if let Some(request_id) = self.request_id() {
            fields.push(Field::string("requestId", request_id));
        }

        let tags = self.tags();
        if !tags.is_empty() {
            let items = tags.into_iter().map(|tag| Value::String(tag.to_owned())).collect();
            fields.push(Field::new("tags", Value::List(items)));
        }
        fields.push(Field::new("time", Value::Time(self.created_at())));

        if let Some(help) = self.help() {
            fields.push(Field::new(
                "help",
                Value::Group(vec![
                    Field::string("description", help.description.as_str()),
                    Field::string("url", help.url.as_str()),
                ]),
            ));
        }

        if let Some(resource) = self.resource() {
            fields.push(Field::new(
                "resource",
                Value::Group(vec![
                    Field::string("type", resource.kind.as_str()),
                    Field::string("name", resource.name.as_str()),
                    Field::string("owner", resource.owner.as_str()),
                    Field::string("description", resource.description.as_str()),
                ]),
            ));
        }

        let localizations = self.localizations();
        if !localizations.is_empty() {
            let items = localizations
                .iter()
                .map(|localization| {
                    Value::Group(vec![
                        Field::string("locale", localization.locale.as_str()),
                        Field::string("message", localization.message.as_str()),
                    ])
                })
                .collect();
            fields.push(Field::new("localizations", Value::List(items)));
        }

        if let Some(retry) = self.retry() {
            fields.push(Field::new(
                "retry",
                Value::Group(vec![Field::new("delay", Value::Duration(retry.delay))]),
            ));
        }

        let stack_trace = self.stack_trace();
        if !stack_trace.is_empty() {
            fields.push(Field::string("stackTrace", stack_trace));
        }

        StructuredView { fields }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    use super::{Field, StructuredView, Value};

    struct FieldsMap<'a>(&'a [Field]);

    impl Serialize for FieldsMap<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for field in self.0 {
                map.serialize_entry(&field.key, &field.value)?;
            }
            map.end()
        }
    }

    impl Serialize for StructuredView {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            FieldsMap(&self.fields).serialize(serializer)
        }
    }

    impl Serialize for Field {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            FieldsMap(core::slice::from_ref(self)).serialize(serializer)
        }
    }

    // Times are RFC 3339 strings; durations use their `Debug` form ("1.5s").
    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::String(text) => serializer.serialize_str(text),
                Value::Time(time) => serializer.serialize_str(&time.to_rfc3339()),
                Value::Duration(duration) => serializer.collect_str(&format_args!("{duration:?}")),
                Value::List(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                Value::Group(fields) => FieldsMap(fields).serialize(serializer),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Help, Localization, Resource, Retry};

    #[test]
    fn test_structured_skips_unset_attributes() {
        let view = crate::new("plain").structured();
        let keys: Vec<&str> = view.fields.iter().map(|field| field.key.as_str()).collect();
        assert_eq!(&keys[..3], ["message", "trace", "time"]);
        assert!(!keys.contains(&"reason"));
        assert!(!keys.contains(&"help"));
    }

    #[test]
    fn test_structured_groups() {
        let error = crate::with_metadata("b", "2")
            .with_metadata("a", "1")
            .help(Help {
                description: "docs".to_owned(),
                url: "https://example.com".to_owned(),
            })
            .resource(Resource {
                kind: "table".to_owned(),
                name: "users".to_owned(),
                ..Resource::default()
            })
            .with_localization(Localization::new("fr-FR", "introuvable"))
            .retry(Retry::after(Duration::from_secs(2)))
            .build("x");
        let view = error.structured();

        let metadata = view.get("metadata").and_then(Value::as_group).expect("metadata group");
        assert_eq!(metadata[0], Field::string("b", "2"));
        assert_eq!(metadata[1], Field::string("a", "1"));

        let resource = view.get("resource").and_then(Value::as_group).expect("resource group");
        assert_eq!(resource[1], Field::string("name", "users"));

        let retry = view.get("retry").and_then(Value::as_group).expect("retry group");
        assert_eq!(retry[0].value, Value::Duration(Duration::from_secs(2)));

        assert!(matches!(view.get("localizations"), Some(Value::List(items)) if items.len() == 1));
        assert!(matches!(view.get("time"), Some(Value::Time(_))));
    }
}
