//! What an error node can wrap.

use core::{error::Error as StdError, fmt};
use std::sync::Arc;

use crate::Error;

/// The cause of an [`Error`]: another structured error, a foreign error, or
/// several errors joined together.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into a cause.
/// Converting a faultline [`Error`] (or a [`Joined`]) keeps it structured,
/// so attributes of the inner error stay visible through the outer one.
///
/// ```
/// use faultline::Cause;
///
/// let io = std::io::Error::other("disk on fire");
/// let cause = Cause::from(io);
/// assert!(cause.as_node().is_none());
///
/// let inner = faultline::new("inner");
/// let cause = Cause::from(inner.clone());
/// assert!(cause.as_node().is_some_and(|node| node.ptr_eq(&inner)));
/// ```
#[derive(Clone, Debug)]
pub enum Cause {
    /// A structured error whose attributes take part in chain resolution.
    Node(Error),
    /// Any other error. Its attributes are opaque; only its `Display` output
    /// and `source()` chain are used.
    Foreign(Arc<dyn StdError + Send + Sync + 'static>),
    /// Several causes aggregated by [`join`](crate::join).
    Joined(Joined),
}

impl Cause {
    /// Converts a boxed error, unwrapping it if it is a faultline [`Error`].
    ///
    /// This is also the way in for error types that do not implement
    /// `std::error::Error` themselves but convert into a box, such as
    /// `anyhow::Error`.
    pub fn boxed(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        match error.downcast::<Error>() {
            Ok(error) => Cause::Node(*error),
            Err(error) => match error.downcast::<Joined>() {
                Ok(joined) => Cause::Joined(*joined),
                Err(error) => Cause::Foreign(Arc::from(error)),
            },
        }
    }

    /// The structured error, if this cause is one.
    pub fn as_node(&self) -> Option<&Error> {
        match self {
            Cause::Node(error) => Some(error),
            _ => None,
        }
    }

    /// This cause as a plain `std::error::Error`.
    pub fn as_error(&self) -> &(dyn StdError + 'static) {
        match self {
            Cause::Node(error) => error,
            Cause::Foreign(error) => &**error,
            Cause::Joined(joined) => joined,
        }
    }
}

impl<E> From<E> for Cause
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        let error: Arc<dyn StdError + Send + Sync + 'static> = Arc::new(error);
        if let Some(node) = error.downcast_ref::<Error>() {
            return Cause::Node(node.clone());
        }
        if let Some(joined) = error.downcast_ref::<Joined>() {
            return Cause::Joined(joined.clone());
        }
        Cause::Foreign(error)
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Node(error) => fmt::Display::fmt(error, f),
            Cause::Foreign(error) => fmt::Display::fmt(error, f),
            Cause::Joined(joined) => fmt::Display::fmt(joined, f),
        }
    }
}

/// Several errors aggregated into one cause.
///
/// Displays as the summaries of its causes, one per line. Every cause stays
/// reachable for [`Error::is`] and [`Error::find`].
#[derive(Clone, Debug)]
pub struct Joined {
    causes: Vec<Cause>,
}

impl Joined {
    pub(crate) fn new(causes: Vec<Cause>) -> Self {
        Self { causes }
    }

    /// The joined causes, in the order they were given.
    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }
}

impl fmt::Display for Joined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, cause) in self.causes.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            fmt::Display::fmt(cause, f)?;
        }
        Ok(())
    }
}

impl StdError for Joined {}
