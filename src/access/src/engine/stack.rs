//! Call stack of in-flight loads
//!
//! The top frame is the caller of the next load. Frames are pushed through
//! [`CallStack::enter`] and popped when the returned guard drops, so every
//! exit path (success, denial further down, loader failure, panic) restores
//! the previous caller.

use parking_lot::Mutex;

/// Caller context when no load is in flight
pub const ROOT_CONTEXT: &str = "**root**";

#[derive(Debug, Default)]
pub struct CallStack {
    frames: Mutex<Vec<String>>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost in-flight path, or [`ROOT_CONTEXT`]
    pub fn current(&self) -> String {
        self.frames
            .lock()
            .last()
            .cloned()
            .unwrap_or_else(|| ROOT_CONTEXT.to_string())
    }

    /// Number of in-flight loads
    pub fn depth(&self) -> usize {
        self.frames.lock().len()
    }

    /// Pushes `path`; the frame is popped when the guard drops
    pub fn enter(&self, path: impl Into<String>) -> StackFrame<'_> {
        self.frames.lock().push(path.into());
        StackFrame { stack: self }
    }
}

/// Guard for one pushed frame
#[must_use = "the frame is popped as soon as the guard drops"]
pub struct StackFrame<'a> {
    stack: &'a CallStack,
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        self.stack.frames.lock().pop();
    }
}
