/// Creates an [`Error`](crate::Error) with a formatted message.
///
/// The arguments are interpreted like those of [`format!()`]. Errors listed
/// in brackets before the format string stay reachable for
/// [`Error::is`](crate::Error::is) and [`Error::find`](crate::Error::find)
/// without becoming the cause; mention them in the message if their text
/// should be shown.
///
/// [`format!()`]: std::format
///
/// # Examples
///
/// ```
/// use faultline::errorf;
///
/// let error = errorf!("user {} not found", 42);
/// assert_eq!(error.to_string(), "user 42 not found");
///
/// let io = std::io::Error::other("timed out");
/// let error = errorf!([io]; "lookup failed");
/// assert!(error.find::<std::io::Error>().is_some());
/// ```
#[macro_export]
macro_rules! errorf {
    ([$($wrap:expr),* $(,)?]; $($arg:tt)+) => {{
        let message = $crate::__private::format!($($arg)+);
        $crate::__private::build_message(
            message,
            $crate::__private::vec![$($crate::Cause::from($wrap)),*],
        )
    }};
    ($($arg:tt)+) => {
        $crate::__private::build_formatted($crate::__private::format_args!($($arg)+))
    };
}

/// Wraps an error in a new [`Error`](crate::Error) with a formatted message.
///
/// The first argument is anything that converts into a
/// [`Cause`](crate::Cause). As with [`errorf!`](crate::errorf), errors
/// listed in brackets are kept for identity matching only. The message is
/// formatted before the cause is moved, so the cause may be mentioned in it.
///
/// # Examples
///
/// ```
/// use faultline::wrapf;
///
/// let io = std::io::Error::other("connection reset");
/// let error = wrapf!(io, "fetching page {}", 3);
/// assert_eq!(error.to_string(), "fetching page 3: connection reset");
/// ```
#[macro_export]
macro_rules! wrapf {
    ($cause:expr, [$($wrap:expr),* $(,)?]; $($arg:tt)+) => {{
        let message = $crate::__private::format!($($arg)+);
        $crate::__private::wrap_message(
            $cause,
            message,
            $crate::__private::vec![$($crate::Cause::from($wrap)),*],
        )
    }};
    ($cause:expr, $($arg:tt)+) => {{
        let message = $crate::__private::format!($($arg)+);
        $crate::__private::wrap_message($cause, message, $crate::__private::vec![])
    }};
}
