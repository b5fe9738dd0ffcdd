//! Walking an error chain: unwrap, is, downcast (as) and cause

use crate::{Error, ErrorKind, Format, WrapError};
use std::error::Error as StdError;

/// Iterator over an error and its causes, outermost first.
///
/// Created by [`Error::chain`].
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

impl Error {
    /// The immediate cause. Only wrap layers have one.
    pub fn source(&self) -> Option<&Error> {
        match self {
            Error::Wrap(wrap) => Some(WrapError::cause(wrap)),
            Error::Root(_) | Error::External(_) => None,
        }
    }

    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// The last error in the chain: a root or an external error
    pub fn root_cause(&self) -> &Error {
        let mut err = self;
        while let Some(cause) = err.source() {
            err = cause;
        }
        err
    }

    /// Check whether any error in the chain matches `target`.
    ///
    /// A link matches when it is the same value as `target`. A root also
    /// matches a root with the same message, or any error whose rendered
    /// message equals the root's message. Global errors rely on this, since
    /// wrapping them stores a copy.
    pub fn is(&self, target: &Error) -> bool {
        self.chain()
            .any(|err| err.ptr_eq(target) || err.matches(target))
    }

    fn matches(&self, target: &Error) -> bool {
        match self {
            Error::Root(root) => match target {
                Error::Root(other) => root.message() == other.message(),
                Error::Wrap(_) | Error::External(_) => {
                    root.message() == target.message_chain(&Format::default().error_sep)
                }
            },
            Error::Wrap(_) | Error::External(_) => false,
        }
    }

    /// Find the first error in the chain of type `T`.
    ///
    /// `T` may be [`RootError`](crate::RootError),
    /// [`WrapError`](crate::WrapError) or any external error type. Roots
    /// lifted from an external error still expose the original value.
    ///
    /// ```rust
    /// use errtrail::Error;
    /// use std::io;
    ///
    /// let err = Error::from(io::Error::from(io::ErrorKind::NotFound)).wrap("opening config");
    /// let io_err = err.downcast_ref::<io::Error>().unwrap();
    /// assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    /// ```
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.chain().find_map(|err| {
            err.as_std()
                .downcast_ref::<T>()
                .or_else(|| lifted_foreign::<T>(err))
        })
    }

    /// Find the first error in the chain with the given kind
    pub fn find(&self, kind: ErrorKind) -> Option<&Error> {
        self.chain().find(|err| err.kind() == kind)
    }
}

fn lifted_foreign<T>(err: &Error) -> Option<&T>
where
    T: StdError + 'static,
{
    err.as_root()?.foreign()?.downcast_ref::<T>()
}

// =============================================================================
// Free functions over optional errors
// =============================================================================

/// The immediate cause of `err`, `None` for terminal errors and `None`.
pub fn unwrap(err: Option<&Error>) -> Option<&Error> {
    err?.source()
}

/// Check whether any error in `err`'s chain matches `target`.
///
/// A `None` target only matches a `None` error.
pub fn is(err: Option<&Error>, target: Option<&Error>) -> bool {
    match (err, target) {
        (Some(err), Some(target)) => err.is(target),
        (err, None) => err.is_none(),
        (None, Some(_)) => false,
    }
}

/// The last error in the chain, `None` for `None`.
pub fn cause(err: Option<&Error>) -> Option<&Error> {
    err.map(Error::root_cause)
}
