//! Extension traits for `Result` and `Option`

use crate::{Error, Result};

/// Add context to the error of a `Result`.
///
/// `Ok` values pass through untouched, the same way wrapping `None` gives
/// `None`.
///
/// ```rust
/// use errtrail::ResultExt;
///
/// fn load(path: &str) -> errtrail::Result<String> {
///     std::fs::read_to_string(path).wrap_err_with(|| format!("error reading file '{}'", path))
/// }
///
/// let err = load("/does/not/exist.json").unwrap_err();
/// assert!(err.to_string().starts_with("error reading file '/does/not/exist.json': "));
/// ```
pub trait ResultExt<T> {
    fn wrap_err(self, message: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::wrap_err`], building the message only on error
    fn wrap_err_with<M, F>(self, message: F) -> Result<T>
    where
        M: Into<String>,
        F: FnOnce() -> M;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    #[inline(never)]
    fn wrap_err(self, message: impl Into<String>) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err.into().wrap_at(message.into(), 1)),
        }
    }

    #[inline(never)]
    fn wrap_err_with<M, F>(self, message: F) -> Result<T>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err.into().wrap_at(message().into(), 1)),
        }
    }
}

/// Turn a missing value into a root error.
pub trait OptionExt<T> {
    fn ok_or_err(self, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    #[inline(never)]
    fn ok_or_err(self, message: impl Into<String>) -> Result<T> {
        match self {
            Some(value) => Ok(value),
            None => Err(Error::root_at(message.into(), false, 1)),
        }
    }
}
