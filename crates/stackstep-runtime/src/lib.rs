//! Stackstep runtime - explicit-stack execution simulation
//!
//! This library re-expresses a simple recursive function (Fibonacci) as an
//! interpreted state machine over a heap-resident call stack of
//! dynamically-typed variable frames:
//! - Typed frame variables and activation records
//! - An owned, explicit call stack with top-relative access
//! - Program-counter addressing with static and dynamic (caller-supplied)
//!   jumps
//! - A single-stepped dispatcher driven by an external renderer

/// Stackstep runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod address;
pub mod error;
pub mod frame;
pub mod machine;
pub mod stack;
pub mod trace;
pub mod value;

// Re-export commonly used types
pub use address::Address;
pub use error::MachineError;
pub use frame::Frame;
pub use machine::{
    FrameView, Machine, Renderer, RunOutcome, RunStats, Snapshot, StepOutcome, StepSignal, VarView,
};
pub use stack::CallStack;
pub use trace::{TraceEntry, TraceLog, DEFAULT_CAPACITY};
pub use value::{Value, ValueKind};
