//! The explicit call stack
//!
//! An owned, growable stack of [`Frame`]s that stands in for the native call
//! stack. Pushing moves a frame in, popping moves it back out; only the top
//! of the stack (and bounded `top(k)` neighbors) is reachable by name, so no
//! aliasing of frames is ever needed.

use crate::error::MachineError;
use crate::frame::Frame;

/// Ordered sequence of activation records, bottom first.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Current number of frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Append a frame; the stack takes ownership. O(1).
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Remove and return the top frame.
    pub fn pop(&mut self) -> Result<Frame, MachineError> {
        self.frames.pop().ok_or(MachineError::StackUnderflow {
            depth: 0,
            wanted: 0,
        })
    }

    /// The frame `k` positions below the current top; `top(0)` is the top.
    pub fn top(&self, k: usize) -> Result<&Frame, MachineError> {
        let depth = self.depth();
        if k >= depth {
            return Err(MachineError::StackUnderflow { depth, wanted: k });
        }
        Ok(&self.frames[depth - 1 - k])
    }

    /// Mutable access to the frame `k` positions below the top.
    pub fn top_mut(&mut self, k: usize) -> Result<&mut Frame, MachineError> {
        let depth = self.depth();
        if k >= depth {
            return Err(MachineError::StackUnderflow { depth, wanted: k });
        }
        Ok(&mut self.frames[depth - 1 - k])
    }

    /// Rendered form of every frame, bottom first: `frame <i>:{...}`.
    ///
    /// Display path only; dispatch never walks the stack this way.
    pub fn render_lines(&self) -> Vec<String> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| format!("frame {i}:{}", frame.render()))
            .collect()
    }

    /// Frames bottom first, for building display snapshots.
    pub(crate) fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
