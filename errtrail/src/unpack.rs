//! # Unpacking
//!
//! Turns an error chain into a plain data structure: the root message with
//! its full stack, every context message with the frame it was added at, and
//! the message of an external error that was never wrapped.
//!
//! Wrap sites are merged into the root stack. A root created deep in a call
//! tree is often wrapped in functions its own stack passed through, at other
//! lines. Merging puts each wrap frame next to the frame of the same caller
//! so the root trace shows every place the error travelled.

use crate::stack::{Stack, StackFrame};
use crate::Error;
use serde::{Deserialize, Serialize};

/// The complete information carried by an error chain.
///
/// This is a snapshot: it shares nothing with the error it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackedError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ErrRoot>,

    /// Context messages, most recently added first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<ErrLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
}

/// The root cause and its (merged) stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrRoot {
    pub message: String,
    pub stack: Stack,
}

/// One context message and where it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrLink {
    pub message: String,
    pub frame: StackFrame,
}

impl UnpackedError {
    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.chain.is_empty() && self.external.is_none()
    }

    fn from_error(err: &Error) -> Self {
        let mut unpacked = UnpackedError::default();
        let mut sites = Vec::new();

        for link in err.chain() {
            match link {
                Error::Wrap(wrap) => {
                    let site = wrap.site().resolve();
                    let frame = site
                        .frames()
                        .first()
                        .cloned()
                        .unwrap_or_else(StackFrame::unknown);
                    unpacked.chain.push(ErrLink {
                        message: wrap.message().to_string(),
                        frame,
                    });
                    sites.push(site);
                }
                Error::Root(root) => {
                    unpacked.root = Some(ErrRoot {
                        message: root.message().to_string(),
                        stack: root.stack().resolve(),
                    });
                }
                Error::External(foreign) => {
                    unpacked.external = Some(foreign.to_string());
                }
            }
        }

        // innermost wrap first: its caller is the most likely to already be
        // part of the root stack
        if let Some(root) = unpacked.root.as_mut() {
            for site in sites.iter().rev() {
                root.stack.insert_frame(site.frames());
            }
        }

        unpacked
    }
}

impl Error {
    pub fn unpack(&self) -> UnpackedError {
        UnpackedError::from_error(self)
    }
}

/// Unpack an optional error. `None` gives an empty [`UnpackedError`].
pub fn unpack(err: Option<&Error>) -> UnpackedError {
    err.map(Error::unpack).unwrap_or_default()
}
