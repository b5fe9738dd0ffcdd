//! Error kinds: the type tag of each link in an error chain

use std::fmt;

/// Which variant an [`Error`](crate::Error) is.
///
/// Every error value is exactly one of these. Matching on the kind is the
/// cheap way to ask "what is this link" without downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A terminal cause created by this crate, carrying its own stack trace
    Root,

    /// A layer of context added on top of another error
    Wrap,

    /// An error created outside this crate. No stack, no cause.
    External,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Root => "Root",
            ErrorKind::Wrap => "Wrap",
            ErrorKind::External => "External",
        }
    }

    /// Check if this kind ends a chain
    pub fn is_terminal(&self) -> bool {
        matches!(self, ErrorKind::Root | ErrorKind::External)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
