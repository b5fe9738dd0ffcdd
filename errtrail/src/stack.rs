//! # Stack capture
//!
//! Capturing only records instruction pointers. Symbols are looked up when a
//! frame is resolved, so building an error stays cheap even when its trace is
//! never printed.

use serde::{Deserialize, Serialize};
use std::ffi::c_void;
use std::fmt;

/// Maximum number of frames recorded by a single capture
pub const MAX_DEPTH: usize = 64;

/// Extra frames scanned when the capture routine cannot be located
const UNANCHORED_SLACK: usize = 32;

const UNKNOWN: &str = "unknown";

// =============================================================================
// StackFrame - resolved, human readable
// =============================================================================

/// A resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackFrame {
    pub name: String,
    pub file: String,
    pub line: u32,
}

impl StackFrame {
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            line,
        }
    }

    /// The frame reported when symbol information is unavailable
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, 0)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN && self.file == UNKNOWN && self.line == 0
    }

    /// Render as `name{sep}file{sep}line`
    pub fn format(&self, sep: &str) -> String {
        format!("{}{sep}{}{sep}{}", self.name, self.file, self.line)
    }

    fn from_symbol(symbol: &backtrace::Symbol) -> Self {
        let name = symbol
            .name()
            .map(|name| format!("{:#}", name))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let file = symbol
            .filename()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            name,
            file,
            line: symbol.lineno().unwrap_or(0),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(": "))
    }
}

// =============================================================================
// Frame - a single unresolved program location
// =============================================================================

/// An unresolved program location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame(usize);

impl Frame {
    pub(crate) fn from_ip(ip: usize) -> Self {
        Frame(ip)
    }

    /// The raw instruction pointer (a return address for caller frames)
    pub fn ip(&self) -> usize {
        self.0
    }

    /// Look up the symbol for this location.
    ///
    /// When the address falls in inlined code the innermost function wins,
    /// since that is where the call was written.
    pub fn resolve(&self) -> StackFrame {
        let mut resolved = None;
        backtrace::resolve(self.0 as *mut c_void, |symbol| {
            if resolved.is_none() {
                resolved = Some(StackFrame::from_symbol(symbol));
            }
        });
        resolved.unwrap_or_else(StackFrame::unknown)
    }
}

// =============================================================================
// CapturedStack - unresolved call stack
// =============================================================================

/// The call stack at some program point, innermost frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CapturedStack {
    frames: Vec<Frame>,
}

impl CapturedStack {
    /// Capture the stack of the caller, skipping `skip` additional frames.
    ///
    /// `capture(0)` starts at the function that called `capture`.
    #[inline(never)]
    pub fn capture(skip: usize) -> Self {
        Self {
            frames: trace_frames(skip + 1, MAX_DEPTH),
        }
    }

    /// Same as [`CapturedStack::capture`] with an explicit depth (at most [`MAX_DEPTH`])
    #[inline(never)]
    pub fn capture_with_depth(skip: usize, depth: usize) -> Self {
        Self {
            frames: trace_frames(skip + 1, depth.min(MAX_DEPTH)),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The innermost frame
    pub fn first(&self) -> Option<Frame> {
        self.frames.first().copied()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn resolve(&self) -> Stack {
        Stack(self.frames.iter().map(Frame::resolve).collect())
    }
}

/// Walk the current stack.
///
/// Frames belonging to the unwinder and to this function are dropped by
/// locating this function's own frame through its symbol address. `skip`
/// counts from the caller of this function.
#[inline(never)]
fn trace_frames(skip: usize, depth: usize) -> Vec<Frame> {
    let anchor = trace_frames as fn(usize, usize) -> Vec<Frame> as usize;
    let mut ips = Vec::new();
    let mut anchor_at = None;

    backtrace::trace(|frame| {
        if anchor_at.is_none() && frame.symbol_address() as usize == anchor {
            anchor_at = Some(ips.len());
        }
        ips.push(frame.ip() as usize);

        let wanted = match anchor_at {
            Some(at) => at + 1 + skip + depth,
            None => skip + depth + UNANCHORED_SLACK,
        };
        ips.len() < wanted
    });

    let start = anchor_at.map_or(0, |at| at + 1) + skip;
    ips.into_iter()
        .skip(start)
        .take(depth)
        .map(Frame::from_ip)
        .collect()
}

// =============================================================================
// Stack - resolved call stack
// =============================================================================

/// A resolved call stack, innermost frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack(Vec<StackFrame>);

impl Stack {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Stack(frames)
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StackFrame> {
        self.0.iter()
    }

    pub fn contains(&self, frame: &StackFrame) -> bool {
        self.0.iter().any(|f| f == frame)
    }

    /// Merge a wrap site into this stack.
    ///
    /// `site` is the wrap frame followed by its caller. The wrap frame goes
    /// right before the caller when the caller is part of this stack. It is
    /// appended when there is nothing to anchor on. Frames already present
    /// are left alone, so merging the same site twice is a no-op.
    pub fn insert_frame(&mut self, site: &[StackFrame]) {
        let Some(frame) = site.first() else {
            return;
        };
        if self.contains(frame) {
            return;
        }

        if site.len() == 1 || self.0.len() <= 1 {
            self.0.push(frame.clone());
            return;
        }

        match self.0.iter().position(|f| *f == site[1]) {
            Some(i) => self.0.insert(i, frame.clone()),
            None => {
                tracing::debug!(
                    frame = %frame,
                    caller = %site[1],
                    "wrap site caller not in root stack, appending frame"
                );
                self.0.push(frame.clone());
            }
        }
    }

    /// Render every frame with [`StackFrame::format`]
    pub fn format(&self, sep: &str) -> Vec<String> {
        self.0.iter().map(|f| f.format(sep)).collect()
    }
}

impl From<Vec<StackFrame>> for Stack {
    fn from(frames: Vec<StackFrame>) -> Self {
        Stack(frames)
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a StackFrame;
    type IntoIter = std::slice::Iter<'a, StackFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
