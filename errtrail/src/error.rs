//! The error values: roots, wrap layers and external errors

use crate::stack::{CapturedStack, Frame};
use crate::ErrorKind;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A wrap site records itself and its caller; the caller anchors the frame
/// when it is merged into the root stack.
const WRAP_SITE_DEPTH: usize = 2;

type Foreign = Arc<dyn StdError + Send + Sync + 'static>;

/// An error with context and call-site stack traces.
///
/// An error is one of three things:
/// - `Root`: where a failure started, with the stack at that point
/// - `Wrap`: a context message added on top of another error, with the
///   location where it was added
/// - `External`: any other `std::error::Error`, absorbed as-is
///
/// Cloning is cheap: clones share the same underlying values.
///
/// # Example
///
/// ```rust
/// use errtrail::{Error, ErrorKind};
///
/// let err = Error::new("unexpected EOF").wrap("error reading file 'x.json'");
///
/// assert_eq!(err.kind(), ErrorKind::Wrap);
/// assert_eq!(err.to_string(), "error reading file 'x.json': unexpected EOF");
/// assert_eq!(err.root_cause().message(), "unexpected EOF");
/// ```
#[derive(Clone)]
pub enum Error {
    Root(Arc<RootError>),
    Wrap(Arc<WrapError>),
    External(Foreign),
}

/// The cause at the end of a chain.
pub struct RootError {
    message: String,
    stack: CapturedStack,
    global: bool,
    source: Option<Foreign>,
}

impl RootError {
    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Stack captured where the error was created, or where it was last
    /// wrapped for global errors
    pub fn stack(&self) -> &CapturedStack {
        &self.stack
    }

    /// Whether this root was created with [`Error::new_global`]
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// The external error this root was lifted from (if any)
    pub fn foreign(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    fn restacked(&self, stack: CapturedStack) -> Self {
        Self {
            message: self.message.clone(),
            stack,
            global: self.global,
            source: self.source.clone(),
        }
    }
}

impl fmt::Debug for RootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootError")
            .field("message", &self.message)
            .field("global", &self.global)
            .field("frames", &self.stack.len())
            .finish()
    }
}

impl fmt::Display for RootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for RootError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// One layer of context.
pub struct WrapError {
    message: String,
    cause: Error,
    site: CapturedStack,
}

impl WrapError {
    /// Get the context message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the wrapped error
    pub fn cause(&self) -> &Error {
        &self.cause
    }

    /// Where the context was added
    pub fn frame(&self) -> Option<Frame> {
        self.site.first()
    }

    /// The wrap frame followed by its caller
    pub fn site(&self) -> &CapturedStack {
        &self.site
    }
}

impl fmt::Debug for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapError")
            .field("message", &self.message)
            .field("cause", &self.cause.kind())
            .finish()
    }
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for WrapError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_std())
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl Error {
    /// Create a root error with the stack of the caller
    #[inline(never)]
    pub fn new(message: impl Into<String>) -> Self {
        Self::root_at(message.into(), false, 1)
    }

    /// Create a global root error.
    ///
    /// Global errors are meant to be created once (e.g. in a `static`) and
    /// wrapped from many places. Their creation stack says nothing useful, so
    /// each wrap reports the wrap site's stack instead. The shared value is
    /// never modified: the wrap holds a fresh copy.
    ///
    /// ```rust
    /// use errtrail::Error;
    /// use std::sync::LazyLock;
    ///
    /// static NOT_FOUND: LazyLock<Error> = LazyLock::new(|| Error::new_global("not found"));
    ///
    /// let err = NOT_FOUND.clone().wrap("loading user 42");
    /// assert!(err.is(&NOT_FOUND));
    /// ```
    #[inline(never)]
    pub fn new_global(message: impl Into<String>) -> Self {
        Self::root_at(message.into(), true, 1)
    }

    /// Absorb an `anyhow::Error` as an external error
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = err.into();
        Error::External(Arc::from(boxed))
    }

    #[inline(never)]
    pub(crate) fn root_at(message: String, global: bool, skip: usize) -> Self {
        Error::Root(Arc::new(RootError {
            message,
            stack: CapturedStack::capture(skip + 1),
            global,
            source: None,
        }))
    }

    // =========================================================================
    // Wrapping
    // =========================================================================

    /// Add context to this error.
    ///
    /// - local roots and wrap layers are kept as they are
    /// - global roots are copied with the stack of the caller
    /// - external errors become a root with the stack of the caller
    ///
    /// The new layer records the caller's location.
    #[inline(never)]
    #[must_use]
    pub fn wrap(self, message: impl Into<String>) -> Self {
        self.wrap_at(message.into(), 1)
    }

    #[inline(never)]
    pub(crate) fn wrap_at(self, message: String, skip: usize) -> Self {
        let cause = match self {
            Error::Root(root) if root.global => Error::Root(Arc::new(
                root.restacked(CapturedStack::capture(skip + 1)),
            )),
            local @ (Error::Root(_) | Error::Wrap(_)) => local,
            Error::External(foreign) => Error::Root(Arc::new(RootError {
                message: foreign.to_string(),
                stack: CapturedStack::capture(skip + 1),
                global: false,
                source: Some(foreign),
            })),
        };

        Error::Wrap(Arc::new(WrapError {
            message,
            cause,
            site: CapturedStack::capture_with_depth(skip + 1, WRAP_SITE_DEPTH),
        }))
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Root(_) => ErrorKind::Root,
            Error::Wrap(_) => ErrorKind::Wrap,
            Error::External(_) => ErrorKind::External,
        }
    }

    /// The message of this link alone, without its causes
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Error::Root(root) => Cow::Borrowed(&root.message),
            Error::Wrap(wrap) => Cow::Borrowed(&wrap.message),
            Error::External(foreign) => Cow::Owned(foreign.to_string()),
        }
    }

    /// Get the root error (if this is one)
    pub fn as_root(&self) -> Option<&RootError> {
        match self {
            Error::Root(root) => Some(root),
            Error::Wrap(_) | Error::External(_) => None,
        }
    }

    /// Get the wrap layer (if this is one)
    pub fn as_wrap(&self) -> Option<&WrapError> {
        match self {
            Error::Wrap(wrap) => Some(wrap),
            Error::Root(_) | Error::External(_) => None,
        }
    }

    /// View this link as a `std::error::Error`
    pub fn as_std(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match self {
            Error::Root(root) => &**root,
            Error::Wrap(wrap) => &**wrap,
            Error::External(foreign) => &**foreign,
        }
    }

    /// Check whether both are the same value (not just equal messages)
    pub fn ptr_eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Root(a), Error::Root(b)) => Arc::ptr_eq(a, b),
            (Error::Wrap(a), Error::Wrap(b)) => Arc::ptr_eq(a, b),
            (Error::External(a), Error::External(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

/// Wrap an optional error, passing `None` through.
///
/// ```rust
/// assert!(errtrail::wrap(None, "context").is_none());
/// ```
#[inline(never)]
#[allow(clippy::manual_map)] // a closure would add a frame to the captured site
pub fn wrap(err: Option<Error>, message: impl Into<String>) -> Option<Error> {
    match err {
        Some(err) => Some(err.wrap_at(message.into(), 1)),
        None => None,
    }
}

// =============================================================================
// External errors
// =============================================================================

impl<E> From<E> for Error
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Error::External(Arc::new(err))
    }
}
