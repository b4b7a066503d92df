//! Commonly used items for convenient importing.
//!
//! ```rust
//! use faultline::prelude::*;
//!
//! fn divide(a: i32, b: i32) -> Result<i32, Error> {
//!     if b == 0 {
//!         return Err(ErrorBuilder::new().reason("DIVISION_BY_ZERO").build("cannot divide by zero"));
//!     }
//!     Ok(a / b)
//! }
//!
//! assert_eq!(divide(10, 2).ok(), Some(5));
//! assert_eq!(divide(1, 0).unwrap_err().reason(), Some("DIVISION_BY_ZERO"));
//! ```

pub use crate::{Cause, Error, ErrorBuilder, ResultExt, errorf, wrapf};
