use crate::{Error, ErrorBuilder, cause::Cause};

mod sealed {
    pub trait Sealed {}

    impl<T, E> Sealed for Result<T, E> {}
}

/// Wrapping the error of a `Result` in place.
///
/// Like [`ErrorBuilder::wrap_option`], nothing is wrapped for `Ok`, and the
/// call stack is only captured when there is an error.
///
/// ```
/// use faultline::{ErrorBuilder, ResultExt};
///
/// fn read_config() -> Result<String, faultline::Error> {
///     std::fs::read_to_string("/does/not/exist.toml")
///         .wrap_err(&ErrorBuilder::new().reason("CONFIG_MISSING"))
/// }
///
/// let error = read_config().unwrap_err();
/// assert_eq!(error.reason(), Some("CONFIG_MISSING"));
/// assert!(error.find::<std::io::Error>().is_some());
/// ```
pub trait ResultExt<T>: sealed::Sealed {
    /// Wraps the error with the attributes of `builder`.
    #[track_caller]
    fn wrap_err(self, builder: &ErrorBuilder) -> Result<T, Error>;

    /// Wraps the error with the attributes of the builder returned by
    /// `builder`, which only runs if there is an error.
    #[track_caller]
    fn wrap_err_with<F>(self, builder: F) -> Result<T, Error>
    where
        F: FnOnce() -> ErrorBuilder;

    /// Wraps the error in a new error with the given message.
    #[track_caller]
    fn context(self, message: impl Into<String>) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Cause>,
{
    #[track_caller]
    fn wrap_err(self, builder: &ErrorBuilder) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(builder.wrap(error)),
        }
    }

    #[track_caller]
    fn wrap_err_with<F>(self, builder: F) -> Result<T, Error>
    where
        F: FnOnce() -> ErrorBuilder,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(builder().wrap(error)),
        }
    }

    #[track_caller]
    fn context(self, message: impl Into<String>) -> Result<T, Error> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(ErrorBuilder::new().wrap_message(error.into(), message.into(), Vec::new())),
        }
    }
}
