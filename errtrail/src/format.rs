//! # Rendering
//!
//! Two renderers over [`UnpackedError`]: plain text and a structured tree
//! (`serde_json::Value`). Both are driven by a [`Format`].

use crate::unpack::{ErrLink, ErrRoot, UnpackedError};
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

const ROOT_KEY: &str = "root";
const CHAIN_KEY: &str = "chain";
const EXTERNAL_KEY: &str = "external error";

/// Output format for rendering an [`UnpackedError`].
///
/// Every field has a default, so a partial config deserializes:
///
/// ```rust
/// let format: errtrail::Format = serde_json::from_str(r#"{"error_sep": " <- "}"#).unwrap();
/// assert!(!format.with_trace);
/// assert_eq!(format.error_sep, " <- ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    /// Include stack frames
    pub with_trace: bool,
    /// Between a message and its frames
    pub message_sep: String,
    /// Before each frame
    pub frame_prefix: String,
    /// Between the name, file and line of a frame
    pub frame_field_sep: String,
    /// Between errors
    pub error_sep: String,
}

impl Format {
    /// The default format, with or without stack traces.
    ///
    /// Without traces messages are joined by `": "`. With traces every
    /// message is on its own line followed by tab-indented
    /// `name: file: line` frames.
    pub fn new(with_trace: bool) -> Self {
        if with_trace {
            Self {
                with_trace,
                message_sep: "\n".to_string(),
                frame_prefix: "\t".to_string(),
                frame_field_sep: ": ".to_string(),
                error_sep: "\n".to_string(),
            }
        } else {
            Self {
                with_trace,
                message_sep: String::new(),
                frame_prefix: String::new(),
                frame_field_sep: String::new(),
                error_sep: ": ".to_string(),
            }
        }
    }

    pub fn with_error_sep(mut self, sep: impl Into<String>) -> Self {
        self.error_sep = sep.into();
        self
    }

    pub fn with_frame_field_sep(mut self, sep: impl Into<String>) -> Self {
        self.frame_field_sep = sep.into();
        self
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::new(false)
    }
}

// =============================================================================
// Plain text
// =============================================================================

impl UnpackedError {
    /// Render as text: context messages (outermost first), then the root,
    /// then the external error.
    pub fn to_plain_text(&self, format: &Format) -> String {
        if !format.with_trace {
            let messages: Vec<&str> = self
                .chain
                .iter()
                .map(|link| link.message.as_str())
                .chain(self.root.as_ref().map(|root| root.message.as_str()))
                .chain(self.external.as_deref())
                .collect();
            return messages.join(&format.error_sep);
        }

        let mut blocks: Vec<String> = self
            .chain
            .iter()
            .map(|link| link.trace_text(format))
            .collect();
        if let Some(root) = &self.root {
            blocks.push(root.trace_text(format));
        }
        if let Some(external) = &self.external {
            blocks.push(external.clone());
        }
        blocks.join(&format.error_sep)
    }

    /// Render as a tree:
    /// `{"root": {..}, "chain": [..], "external error": ".."}`.
    ///
    /// Keys without data are left out. Stacks are only present with traces.
    pub fn to_structured_tree(&self, format: &Format) -> Value {
        let mut tree = Map::new();

        if let Some(root) = &self.root {
            tree.insert(ROOT_KEY.to_string(), root.to_tree(format));
        }
        if !self.chain.is_empty() {
            let links = self.chain.iter().map(|link| link.to_tree(format)).collect();
            tree.insert(CHAIN_KEY.to_string(), Value::Array(links));
        }
        if let Some(external) = &self.external {
            tree.insert(EXTERNAL_KEY.to_string(), Value::String(external.clone()));
        }

        Value::Object(tree)
    }
}

impl ErrRoot {
    fn trace_text(&self, format: &Format) -> String {
        if self.stack.is_empty() {
            return self.message.clone();
        }
        let frames: Vec<String> = self
            .stack
            .format(&format.frame_field_sep)
            .into_iter()
            .map(|frame| format!("{}{}", format.frame_prefix, frame))
            .collect();
        format!("{}{}{}", self.message, format.message_sep, frames.join(&format.error_sep))
    }

    fn to_tree(&self, format: &Format) -> Value {
        let mut tree = json!({ "message": self.message });
        if format.with_trace {
            tree["stack"] = json!(self.stack.format(&format.frame_field_sep));
        }
        tree
    }
}

impl ErrLink {
    fn trace_text(&self, format: &Format) -> String {
        format!(
            "{}{}{}{}",
            self.message,
            format.message_sep,
            format.frame_prefix,
            self.frame.format(&format.frame_field_sep)
        )
    }

    fn to_tree(&self, format: &Format) -> Value {
        let mut tree = json!({ "message": self.message });
        if format.with_trace {
            tree["stack"] = json!(self.frame.format(&format.frame_field_sep));
        }
        tree
    }
}

// =============================================================================
// Display / Debug
// =============================================================================

impl fmt::Display for UnpackedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_text(&Format::new(f.alternate())))
    }
}

impl Error {
    /// Every message in the chain joined by `sep`, outermost first.
    ///
    /// Same text as an untraced [`UnpackedError::to_plain_text`], without
    /// resolving any frame.
    pub(crate) fn message_chain(&self, sep: &str) -> String {
        let messages: Vec<_> = self.chain().map(|err| err.message()).collect();
        messages.join(sep)
    }
}

/// `{}` prints the messages on one line, `{:#}` adds stack traces.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&self.unpack().to_plain_text(&Format::new(true)))
        } else {
            f.write_str(&self.message_chain(&Format::default().error_sep))
        }
    }
}

/// Always includes stack traces.
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unpack().to_plain_text(&Format::new(true)))
    }
}
