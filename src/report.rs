//! Plain-text rendering of errors.

use core::fmt::{self, Write as _};

use crate::{Error, cause::Cause, stack::source_context};

/// How much of an error [`Error::render`] prints.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Verbosity {
    /// The one-line summary, as printed by `Display`.
    #[default]
    Summary,
    /// Every resolved attribute followed by the stack trace, as printed by
    /// `Debug` and `{:#}`.
    Full,
}

impl Error {
    /// Renders the error at the given verbosity.
    pub fn render(&self, verbosity: Verbosity) -> String {
        match verbosity {
            Verbosity::Summary => self.summary(),
            Verbosity::Full => self.verbose_report(),
        }
    }

    /// The messages of the chain joined with `": "`, outermost first, ending
    /// with the text of a foreign or joined cause.
    ///
    /// Nodes without a message contribute nothing, so an error that only
    /// wraps a cause summarizes exactly like the cause.
    pub fn summary(&self) -> String {
        let nodes: Vec<&Error> = self.chain().collect();
        let mut text = match nodes.last().and_then(|error| error.cause()) {
            Some(cause @ (Cause::Foreign(_) | Cause::Joined(_))) => cause.to_string(),
            _ => String::new(),
        };
        for error in nodes.iter().rev() {
            if let Some(message) = error.node.attrs.message.as_deref() {
                text = if text.is_empty() {
                    message.to_owned()
                } else {
                    format!("{message}: {text}")
                };
            }
        }
        text
    }

    /// A multi-line report of every resolved attribute, followed by the
    /// [stack trace](Self::stack_trace). Unset attributes are left out.
    pub fn verbose_report(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` never fails.
        let _ = self.write_verbose(&mut out);
        out
    }

    fn write_verbose(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "Error: {}", self.summary())?;
        if let Some(reason) = self.reason() {
            writeln!(out, "Reason: {reason}")?;
        }
        if let Some(domain) = self.domain() {
            writeln!(out, "Domain: {domain}")?;
        }

        let metadata = self.metadata();
        if !metadata.is_empty() {
            writeln!(out, "Metadata:")?;
            for (key, value) in metadata {
                writeln!(out, "\t{key}: {value}")?;
            }
        }

        let quota_violations = self.quota_violations();
        if !quota_violations.is_empty() {
            writeln!(out, "QuotaViolations:")?;
            for violation in quota_violations {
                writeln!(out, "\tQuotaViolation:")?;
                writeln!(out, "\t\tSubject: {}", violation.subject)?;
                writeln!(out, "\t\tDescription: {}", violation.description)?;
            }
        }

        let precondition_violations = self.precondition_violations();
        if !precondition_violations.is_empty() {
            writeln!(out, "PreconditionViolations:")?;
            for violation in precondition_violations {
                writeln!(out, "\tPreconditionViolation:")?;
                writeln!(out, "\t\tType: {}", violation.kind)?;
                writeln!(out, "\t\tSubject: {}", violation.subject)?;
                writeln!(out, "\t\tDescription: {}", violation.description)?;
            }
        }

        let field_violations = self.field_violations();
        if !field_violations.is_empty() {
            writeln!(out, "FieldViolations:")?;
            for violation in field_violations {
                writeln!(out, "\tFieldViolation:")?;
                writeln!(out, "\t\tField: {}", violation.field)?;
                writeln!(out, "\t\tDescription: {}", violation.description)?;
            }
        }

        if let Some(user_id) = self.user_id() {
            writeln!(out, "UserId: {user_id}")?;
        }
        if let Some(tenant_id) = self.tenant_id() {
            writeln!(out, "TenantId: {tenant_id}")?;
        }
        writeln!(out, "Trace: {}", self.trace())?;
        if let Some(span) = self.span() {
            writeln!(out, "Span: {span}")?;
        }
        if let Some(request_id) = self.request_id() {
            writeln!(out, "RequestId: {request_id}")?;
        }

        let tags = self.tags();
        if !tags.is_empty() {
            writeln!(out, "Tags: [{}]", tags.join(", "))?;
        }
        writeln!(out, "Time: {}", self.created_at())?;

        if let Some(help) = self.help() {
            writeln!(out, "Help:")?;
            writeln!(out, "\tDescription: {}", help.description)?;
            writeln!(out, "\tURL: {}", help.url)?;
        }

        if let Some(resource) = self.resource() {
            writeln!(out, "Resource:")?;
            writeln!(out, "\tType: {}", resource.kind)?;
            writeln!(out, "\tName: {}", resource.name)?;
            if !resource.owner.is_empty() {
                writeln!(out, "\tOwner: {}", resource.owner)?;
            }
            if !resource.description.is_empty() {
                writeln!(out, "\tDescription: {}", resource.description)?;
            }
        }

        let localizations = self.localizations();
        if !localizations.is_empty() {
            writeln!(out, "Localizations:")?;
            for localization in localizations {
                writeln!(
                    out,
                    "\tLocale: {}, Message: {}",
                    localization.locale, localization.message
                )?;
            }
        }

        if let Some(retry) = self.retry() {
            writeln!(out, "Retry:")?;
            writeln!(out, "\tDelay: {:?}", retry.delay)?;
        }

        let stack_trace = self.stack_trace();
        if !stack_trace.is_empty() {
            writeln!(out, "{stack_trace}")?;
        }
        Ok(())
    }

    /// The captured stacks of the chain, innermost error first.
    ///
    /// Each block starts with the node's message (or the summary of its
    /// cause) and lists its frames up to the top frame of the next outer
    /// node, so frames shared along the chain are printed once:
    ///
    /// ```text
    /// Error: connection refused
    ///   --- at src/db.rs:12 connect()
    /// Thrown: could not load user
    ///   --- at src/repo.rs:40 Repo::load()
    ///   --- at src/main.rs:8 main()
    /// ```
    ///
    /// Empty when no node captured a stack.
    pub fn stack_trace(&self) -> String {
        let mut blocks = Vec::new();
        let mut top = None;
        for error in self.chain() {
            let stack = &error.node.stack;
            if stack.is_empty() {
                continue;
            }
            let header = match (&error.node.attrs.message, error.cause()) {
                (Some(message), _) => message.clone(),
                (None, Some(cause)) => non_empty_or(cause.to_string(), "Error"),
                (None, None) => "Error".to_owned(),
            };
            blocks.push(format!("{header}\n{}", stack.render_until(top)));
            top = stack.top();
        }
        if blocks.is_empty() {
            return String::new();
        }
        blocks.reverse();
        format!("Error: {}", blocks.join("\nThrown: "))
    }

    /// Source lines around the top frame of every node that captured a stack,
    /// innermost error first, with the failing line underlined.
    ///
    /// Nodes whose source file cannot be read are skipped. Empty when no
    /// source is available.
    pub fn sources(&self) -> String {
        let mut blocks = Vec::new();
        for error in self.chain() {
            let Some(frame) = error.node.stack.top() else {
                continue;
            };
            let body = source_context(frame);
            if body.is_empty() {
                continue;
            }
            let header = match &error.node.attrs.message {
                Some(message) => format!("{message}\n{frame}"),
                None => frame.to_string(),
            };
            let mut block = vec![header];
            block.extend(body);
            blocks.push(block.join("\n"));
        }
        if blocks.is_empty() {
            return String::new();
        }
        blocks.reverse();
        format!("Error: {}", blocks.join("\n\nThrown: "))
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_owned()
    } else {
        text
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&self.verbose_report())
        } else {
            f.write_str(&self.summary())
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verbose_report())
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::{ErrorBuilder, types::Retry};

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    #[test]
    fn test_summary_joins_messages() {
        let inner = crate::new("inner");
        let middle = crate::wrap(inner);
        let outer = crate::wrap_formatted(middle, format_args!("outer {}", 1));
        assert_eq!(outer.summary(), "outer 1: inner");
        assert_eq!(outer.to_string(), "outer 1: inner");
    }

    #[test]
    fn test_summary_without_message_is_cause_summary() {
        let error = crate::wrap(Refused);
        assert_eq!(error.to_string(), "connection refused");

        let error = ErrorBuilder::new().wrap(crate::new("structured"));
        assert_eq!(error.to_string(), "structured");
    }

    #[test]
    fn test_verbose_report_sections_in_order() {
        let error = ErrorBuilder::new()
            .reason("R")
            .domain("D")
            .with_metadata("key", "value")
            .with_field_violation("email", "malformed")
            .user_id("u1")
            .trace("t1")
            .with_tag("a")
            .retry(Retry::after(Duration::from_millis(1500)))
            .wrap(Refused);
        let report = format!("{error:#}");

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Error: connection refused");
        assert_eq!(lines[1], "Reason: R");
        assert_eq!(lines[2], "Domain: D");
        assert_eq!(lines[3], "Metadata:");
        assert_eq!(lines[4], "\tkey: value");
        assert_eq!(lines[5], "FieldViolations:");
        assert_eq!(lines[6], "\tFieldViolation:");
        assert_eq!(lines[7], "\t\tField: email");
        assert_eq!(lines[8], "\t\tDescription: malformed");
        assert_eq!(lines[9], "UserId: u1");
        assert_eq!(lines[10], "Trace: t1");
        assert!(lines[11].starts_with("Span: "));
        assert_eq!(lines[12], "Tags: [a]");
        assert!(lines[13].starts_with("Time: "));
        assert_eq!(lines[14], "Retry:");
        assert_eq!(lines[15], "\tDelay: 1.5s");
        assert!(report.contains("Error: connection refused\n  --- at "));
        assert_eq!(format!("{error:?}"), report);
    }

    #[test]
    fn test_render_verbosity() {
        let error = crate::new("plain");
        assert_eq!(error.render(Verbosity::Summary), "plain");
        assert!(error.render(Verbosity::Full).starts_with("Error: plain\n"));
    }

    #[test]
    fn test_stack_trace_blocks_innermost_first() {
        let inner = crate::new("inner");
        let outer = crate::wrap_formatted(inner, format_args!("outer"));
        let trace = outer.stack_trace();
        assert!(trace.starts_with("Error: inner\n  --- at "), "{trace}");
        assert!(trace.contains("\nThrown: outer\n"), "{trace}");
    }

    #[test]
    fn test_stack_trace_header_falls_back_to_cause() {
        let error = crate::wrap(Refused);
        assert!(error.stack_trace().starts_with("Error: connection refused\n"));
    }

    #[test]
    fn test_sources_show_failing_line() {
        let error = crate::new("with source");
        let sources = error.sources();
        if sources.is_empty() {
            return;
        }
        assert!(sources.starts_with("Error: with source\n"), "{sources}");
        assert!(sources.contains("crate::new(\"with source\")"), "{sources}");
        assert!(sources.contains('^'));
    }
}
