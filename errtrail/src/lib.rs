//! # errtrail
//!
//! Error values that remember where they came from.
//!
//! ## Design Philosophy
//!
//! - **Root**: Where a failure starts, with the full stack at that point
//! - **Wrap**: Context added while the error travels up, with the location
//!   it was added at
//! - **External**: Errors from other crates are absorbed, never rejected
//! - **Unpack**: Any chain can be turned into plain data and rendered as text
//!   or as a JSON tree
//!
//! ## Usage
//!
//! ```rust
//! use errtrail::{Error, Format, ResultExt};
//!
//! fn read_file(_name: &str) -> errtrail::Result<Vec<u8>> {
//!     Err(Error::new("unexpected EOF"))
//! }
//!
//! fn parse_file(name: &str) -> errtrail::Result<()> {
//!     read_file(name).wrap_err_with(|| format!("error reading file '{}'", name))?;
//!     Ok(())
//! }
//!
//! let err = parse_file("example.json").unwrap_err();
//! assert_eq!(err.to_string(), "error reading file 'example.json': unexpected EOF");
//!
//! // with stack traces
//! let text = err.unpack().to_plain_text(&Format::new(true));
//! assert!(text.starts_with("error reading file 'example.json'\n\t"));
//! ```
//!
//! ## Principles
//!
//! - Create errors where the failure happens with [`Error::new`]
//! - Sentinels shared by many call sites use [`Error::new_global`]
//! - Add context with [`Error::wrap`] or [`ResultExt::wrap_err`]; match with
//!   [`Error::is`] and [`Error::downcast_ref`]

mod chain;
mod error;
mod ext;
mod format;
mod kind;
mod stack;
mod unpack;

pub use chain::{cause, is, unwrap, Chain};
pub use error::{wrap, Error, RootError, WrapError};
pub use ext::{OptionExt, ResultExt};
pub use format::Format;
pub use kind::ErrorKind;
pub use stack::{CapturedStack, Frame, Stack, StackFrame, MAX_DEPTH};
pub use unpack::{unpack, ErrLink, ErrRoot, UnpackedError};

/// Result type alias using errtrail Error
pub type Result<T> = std::result::Result<T, Error>;

/// Create a root error from a format string.
///
/// ```rust
/// let err = errtrail::errorf!("port {} already in use", 8080);
/// assert_eq!(err.to_string(), "port 8080 already in use");
/// ```
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)*) => {
        $crate::Error::new(::std::format!($($arg)*))
    };
}

/// Wrap an error with a formatted message.
///
/// Accepts an [`Error`] or any external error type.
///
/// ```rust
/// let err = errtrail::Error::new("unexpected EOF");
/// let err = errtrail::wrapf!(err, "error reading file '{}'", "x.json");
/// assert_eq!(err.to_string(), "error reading file 'x.json': unexpected EOF");
/// ```
#[macro_export]
macro_rules! wrapf {
    ($err:expr, $($arg:tt)*) => {
        $crate::Error::from($err).wrap(::std::format!($($arg)*))
    };
}

/// Return early with a root error built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return ::std::result::Result::Err($crate::errorf!($($arg)*))
    };
}
