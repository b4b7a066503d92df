//! Walking a wrapped-error chain.
//!
//! Attribute accessors on [`Error`] see the whole chain of structured errors
//! below it, outermost first. Most attributes resolve to the value of the
//! innermost node that set one; tags are aggregated. Foreign causes end the
//! chain: nothing is read from them except their `Display` output.
//!
//! Identity matching ([`Error::is`], [`Error::find`]) uses [`Errors`], which
//! also descends into foreign `source()` chains, joined branches and errors
//! that were only wrapped for matching.

use core::{error::Error as StdError, iter::FusedIterator};

use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;

use crate::{
    Error,
    cause::{Cause, Joined},
    node::{Attributes, ErrorNode},
};

/// Iterator over the structured errors of a chain, outermost first.
///
/// Created by [`Error::chain`].
#[derive(Clone, Debug)]
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(error: &'a Error) -> Self {
        Self { next: Some(error) }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = match &current.node.cause {
            Some(Cause::Node(inner)) => Some(inner),
            _ => None,
        };
        Some(current)
    }
}

impl FusedIterator for Chain<'_> {}

/// The value of the innermost node for which `select` returns `Some`.
pub(crate) fn innermost<'a, T>(
    error: &'a Error,
    select: impl FnMut(&'a Attributes) -> Option<T>,
) -> Option<T> {
    error.chain().map(|error| &error.node.attrs).filter_map(select).last()
}

/// Like [`innermost`], treating an empty slice as unset.
pub(crate) fn innermost_list<'a, T>(
    error: &'a Error,
    mut select: impl FnMut(&'a Attributes) -> &'a [T],
) -> &'a [T] {
    innermost(error, |attrs| {
        let list = select(attrs);
        (!list.is_empty()).then_some(list)
    })
    .unwrap_or(&[])
}

/// Tags of every node, outermost first, without duplicates.
pub(crate) fn aggregate_tags(error: &Error) -> Vec<&str> {
    let mut seen = HashSet::with_hasher(FxBuildHasher);
    error
        .chain()
        .flat_map(|error| error.node.attrs.tags.iter())
        .map(String::as_str)
        .filter(|tag| seen.insert(*tag))
        .collect()
}

/// Depth-first iterator over every error reachable from an [`Error`],
/// starting with the error itself.
///
/// Created by [`Error::errors`]. Structured errors contribute their cause and
/// the errors they wrapped for matching; [`Joined`] causes contribute each
/// branch in order; any other error contributes its `source()`. Each error is
/// yielded once, even if it is reachable along several paths.
pub struct Errors<'a> {
    stack: Vec<&'a (dyn StdError + 'static)>,
    visited_nodes: HashSet<*const ErrorNode, FxBuildHasher>,
    visited_foreign: HashSet<*const (dyn StdError + 'static), FxBuildHasher>,
}

impl<'a> Errors<'a> {
    pub(crate) fn new(error: &'a Error) -> Self {
        Self {
            stack: vec![error as &(dyn StdError + 'static)],
            visited_nodes: HashSet::with_hasher(FxBuildHasher),
            visited_foreign: HashSet::with_hasher(FxBuildHasher),
        }
    }

    /// Records `error` as seen. Clones of one structured error share a node,
    /// so they are seen together. Other errors are keyed on the wide pointer:
    /// a newtype and its `#[source]` field share an address but not a type.
    fn first_visit(&mut self, error: &'a (dyn StdError + 'static)) -> bool {
        match error.downcast_ref::<Error>() {
            Some(error) => self.visited_nodes.insert(triomphe::Arc::as_ptr(&error.node)),
            None => self.visited_foreign.insert(error as *const (dyn StdError + 'static)),
        }
    }

    fn push_children(&mut self, error: &'a (dyn StdError + 'static)) {
        let start = self.stack.len();
        if let Some(node) = error.downcast_ref::<Error>() {
            self.stack.extend(node.node.cause.iter().map(Cause::as_error));
            self.stack.extend(node.node.matches.iter().map(Cause::as_error));
        } else if let Some(joined) = error.downcast_ref::<Joined>() {
            self.stack.extend(joined.causes().iter().map(Cause::as_error));
        } else if let Some(source) = error.source() {
            self.stack.push(source);
        }
        self.stack[start..].reverse();
    }
}

impl<'a> Iterator for Errors<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(error) = self.stack.pop() {
            if !self.first_visit(error) {
                continue;
            }
            self.push_children(error);
            return Some(error);
        }
        None
    }
}

impl FusedIterator for Errors<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorBuilder;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("sentinel {0}")]
    struct Sentinel(u32);

    #[derive(Debug, thiserror::Error)]
    #[error("outer foreign")]
    struct ForeignWrapper(#[source] Sentinel);

    #[test]
    fn test_chain_stops_at_foreign_cause() {
        let inner = crate::wrap(Sentinel(1));
        let outer = crate::wrap(inner.clone());
        let chain: Vec<&Error> = outer.chain().collect();
        assert_eq!(chain.len(), 2);
        assert!(chain[0].ptr_eq(&outer));
        assert!(chain[1].ptr_eq(&inner));
    }

    #[test]
    fn test_innermost_wins() {
        let c = crate::reason("C_REASON").build("c");
        let b = crate::wrap(c);
        let a = crate::reason("A_REASON").wrap(b);
        assert_eq!(innermost(&a, |attrs| attrs.reason.as_deref()), Some("C_REASON"));
    }

    #[test]
    fn test_tags_deduplicated_outer_first() {
        let inner = crate::with_tag("y").with_tag("x").build("inner");
        let outer = crate::with_tag("x").wrap(inner);
        assert_eq!(aggregate_tags(&outer), ["x", "y"]);
    }

    #[test]
    fn test_errors_visits_foreign_sources_and_joined_branches() {
        let joined = ErrorBuilder::new()
            .join([
                Cause::from(ForeignWrapper(Sentinel(7))),
                Cause::from(crate::new("plain")),
            ])
            .expect("non-empty join");
        let found: Vec<String> = joined.errors().map(ToString::to_string).collect();
        assert!(found.contains(&"sentinel 7".to_owned()));
        assert!(found.contains(&"plain".to_owned()));
        assert!(joined.is(&Sentinel(7)));
        assert!(!joined.is(&Sentinel(8)));
    }

    #[test]
    fn test_errors_yields_shared_branch_once() {
        let shared = crate::new("shared");
        let joined = ErrorBuilder::new()
            .join([shared.clone(), shared.clone()])
            .expect("non-empty join");
        let count = joined
            .errors()
            .filter(|error| error.downcast_ref::<Error>().is_some_and(|e| e.ptr_eq(&shared)))
            .count();
        assert_eq!(count, 1);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct RequestFailed(#[source] ForeignWrapper);

    #[test]
    fn test_errors_descends_into_newtype_sources() {
        let error = crate::wrap(RequestFailed(ForeignWrapper(Sentinel(3))));
        let found: Vec<String> = error.errors().map(ToString::to_string).collect();
        assert_eq!(
            found,
            ["request failed", "request failed", "outer foreign", "sentinel 3"]
        );
        assert!(error.is(&Sentinel(3)));
        assert!(error.find::<ForeignWrapper>().is_some());
    }
}
