//! The dispatcher: a state machine over the explicit call stack
//!
//! `Machine` owns the [`CallStack`] and the current [`Address`] and executes
//! one transition per step. Static transitions (entering a call, resuming a
//! caller) are table-driven on the address variant; a function's exit is a
//! *dynamic* jump through the `return_address` text stored in its frame,
//! which is what lets the single base-case exit of `fib` resume at whichever
//! call site pushed the frame.
//!
//! Execution is cooperative: [`Machine::run_with`] renders the current state,
//! blocks on the driver's step signal, applies one transition, and repeats
//! until the terminal `return` address pops the root frame.

use crate::address::Address;
use crate::error::MachineError;
use crate::frame::Frame;
use crate::stack::CallStack;
use crate::trace::{TraceEntry, TraceLog};
use crate::value::Value;
use serde::Serialize;

// ── Driving interfaces ───────────────────────────────────────────────────────

/// What the external step driver asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSignal {
    /// Apply one transition.
    Step,
    /// Abandon the simulation.
    Quit,
}

/// External renderer and step clock.
///
/// `render` is pure display and must not affect control flow; `await_step`
/// blocks until the driver signals one step. Implementations never see the
/// stack itself, only an owned [`Snapshot`].
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);
    fn await_step(&mut self) -> StepSignal;
}

/// Result of a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// More transitions remain.
    Running,
    /// The terminal address popped the root frame; this is its return value.
    Finished(i64),
}

/// Result of a driven run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished(i64),
    /// The driver sent [`StepSignal::Quit`] before the terminal address.
    Aborted,
}

// ── Observability ────────────────────────────────────────────────────────────

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Transitions executed.
    pub steps: u64,
    /// Dispatches of the `fib` entry address.
    pub fib_calls: u64,
    /// Maximum depth of the simulated `fib` call chain. The root frame (the
    /// simulated `main`) is not counted, matching the plain-recursion
    /// benchmark this simulator is checked against.
    pub max_call_depth: usize,
}

/// One variable of one frame, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarView {
    pub name: String,
    pub value: String,
}

/// One frame, rendered for display. `index` 0 is the bottom of the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameView {
    pub index: usize,
    pub rendered: String,
    pub vars: Vec<VarView>,
}

/// Owned view of the machine state, safe to hand to any renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub step: u64,
    pub address: String,
    pub depth: usize,
    pub log: Vec<TraceEntry>,
    pub frames: Vec<FrameView>,
}

// ── Machine ──────────────────────────────────────────────────────────────────

/// The explicit-stack execution simulator.
pub struct Machine {
    stack: CallStack,
    address: Address,
    trace: TraceLog,
    stats: RunStats,
    outputs: Vec<String>,
}

impl Machine {
    /// Set up the root frame from the process argument vector.
    ///
    /// `args[0]` is the program name; `args[1]` is the simulated program's
    /// `n`, read (and validated) by the `main` transition itself.
    pub fn new(args: Vec<String>) -> Self {
        let root = Frame::from_slots(vec![
            ("args", Value::StringList(args)),
            ("return_value", Value::Int(0)),
            ("return_address", Value::Text(Address::Return.label().into())),
        ]);
        let mut stack = CallStack::new();
        stack.push(root);
        Self {
            stack,
            address: Address::Main,
            trace: TraceLog::new(),
            stats: RunStats::default(),
            outputs: Vec::new(),
        }
    }

    /// Current program counter.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// Lines the simulated program printed (`fib(n)=<v>`).
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    /// Mutable stack access for inspection tooling and failure-injection
    /// tests; dispatch itself only ever touches the top frames.
    pub fn stack_mut(&mut self) -> &mut CallStack {
        &mut self.stack
    }

    /// Owned view of the current state for rendering.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.stats.steps,
            address: self.address.label().to_string(),
            depth: self.stack.depth(),
            log: self.trace.tail(),
            frames: self
                .stack
                .frames()
                .iter()
                .enumerate()
                .map(|(index, frame)| FrameView {
                    index,
                    rendered: frame.render(),
                    vars: frame
                        .vars()
                        .map(|(name, value)| VarView {
                            name: name.to_string(),
                            value: value.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Execute exactly one transition.
    ///
    /// On error the machine must not be stepped further; the stack is left
    /// exactly as the failed transition found it for the dynamic-jump
    /// failure (`UnknownAddress`), which parses before mutating.
    pub fn step(&mut self) -> Result<StepOutcome, MachineError> {
        let step = self.stats.steps;
        match self.address {
            Address::Main => {
                self.trace.push(step, "enter main");
                let top = self.stack.top_mut(0)?;
                top.declare("n", Value::Int(0))?;
                top.declare("a", Value::Int(0))?;
                let n = {
                    let args = top.list("args")?;
                    let raw = args.get(1).ok_or_else(|| MachineError::InvalidArgument {
                        reason: "missing positional argument <n>".into(),
                    })?;
                    raw.parse::<i64>()
                        .map_err(|_| MachineError::InvalidArgument {
                            reason: format!("'{raw}' is not a base-10 integer"),
                        })?
                };
                *top.int_mut("n")? = n;
                self.trace.push(step, "calling fib in main");
                self.push_call(n, Address::Main1);
                self.address = Address::Fib;
            }

            Address::Main1 => {
                self.trace.push(step, "return from fib in main");
                let called = self.stack.pop()?;
                let result = called.int("return_value")?;
                let top = self.stack.top_mut(0)?;
                *top.int_mut("a")? = result;
                let n = top.int("n")?;
                let a = top.int("a")?;
                *top.int_mut("return_value")? = 0;
                self.outputs.push(format!("fib({n})={a}"));
                self.trace.push(step, "return from main");
                self.address = Address::Return;
            }

            Address::Fib => {
                self.stats.fib_calls += 1;
                self.trace.push(step, "enter fib");
                let n = self.stack.top(0)?.int("n")?;
                if n <= 1 {
                    // Parse the caller-supplied resume point before touching
                    // any slot, so a corrupt label leaves the stack as-is.
                    let resume: Address = self.stack.top(0)?.text("return_address")?.parse()?;
                    self.trace.push(step, "return n in fib");
                    *self.stack.top_mut(0)?.int_mut("return_value")? = n;
                    self.address = resume;
                } else {
                    let top = self.stack.top_mut(0)?;
                    top.declare("rec1", Value::Int(0))?;
                    top.declare("rec2", Value::Int(0))?;
                    self.trace.push(step, "call fib(n-1) in fib");
                    self.push_call(n - 1, Address::Fib1);
                    self.address = Address::Fib;
                }
            }

            Address::Fib1 => {
                self.trace.push(step, "return from fib(n-1) in fib");
                let called = self.stack.pop()?;
                let result = called.int("return_value")?;
                let top = self.stack.top_mut(0)?;
                *top.int_mut("rec1")? = result;
                let n = top.int("n")?;
                self.trace.push(step, "call fib(n-2) in fib");
                self.push_call(n - 2, Address::Fib2);
                self.address = Address::Fib;
            }

            Address::Fib2 => {
                // The frame that becomes the top after the pop supplies the
                // resume point; parse it first (see `Fib` above).
                let resume: Address = self.stack.top(1)?.text("return_address")?.parse()?;
                self.trace.push(step, "returned from fib(n-2) in fib");
                let called = self.stack.pop()?;
                let result = called.int("return_value")?;
                let top = self.stack.top_mut(0)?;
                *top.int_mut("rec2")? = result;
                let sum = top.int("rec1")? + top.int("rec2")?;
                self.trace.push(step, "return rec1+rec2 in fib");
                *top.int_mut("return_value")? = sum;
                self.address = resume;
            }

            Address::Return => {
                let root = self.stack.pop()?;
                let result = root.int("return_value")?;
                self.stats.steps += 1;
                return Ok(StepOutcome::Finished(result));
            }
        }
        self.stats.steps += 1;
        Ok(StepOutcome::Running)
    }

    /// Step to completion without rendering.
    pub fn run(&mut self) -> Result<i64, MachineError> {
        loop {
            if let StepOutcome::Finished(result) = self.step()? {
                return Ok(result);
            }
        }
    }

    /// Render, wait for the driver's signal, transition; repeat until the
    /// terminal address or a quit signal.
    pub fn run_with<R: Renderer>(&mut self, renderer: &mut R) -> Result<RunOutcome, MachineError> {
        loop {
            let snapshot = self.snapshot();
            renderer.render(&snapshot);
            match renderer.await_step() {
                StepSignal::Quit => return Ok(RunOutcome::Aborted),
                StepSignal::Step => {}
            }
            if let StepOutcome::Finished(result) = self.step()? {
                return Ok(RunOutcome::Finished(result));
            }
        }
    }

    /// Push a callee frame carrying `n`, a zeroed return slot, and the
    /// address the caller resumes at once the result is produced.
    fn push_call(&mut self, n: i64, resume: Address) {
        self.stack.push(Frame::from_slots(vec![
            ("n", Value::Int(n)),
            ("return_value", Value::Int(0)),
            ("return_address", Value::Text(resume.label().into())),
        ]));
        let call_depth = self.stack.depth() - 1;
        if call_depth > self.stats.max_call_depth {
            self.stats.max_call_depth = call_depth;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn machine_for(n: &str) -> Machine {
        Machine::new(vec!["stackstep".to_string(), n.to_string()])
    }

    #[test]
    fn starts_at_main_with_one_frame() {
        let machine = machine_for("3");
        assert_eq!(machine.address(), Address::Main);
        assert_eq!(machine.stack().depth(), 1);
        assert_eq!(
            machine.stack().top(0).unwrap().render(),
            "{args:[stackstep,3],return_value:0,return_address:return}"
        );
    }

    #[test]
    fn main_pushes_the_first_call() {
        let mut machine = machine_for("3");
        assert_eq!(machine.step().unwrap(), StepOutcome::Running);
        assert_eq!(machine.address(), Address::Fib);
        assert_eq!(machine.stack().depth(), 2);
        let callee = machine.stack().top(0).unwrap();
        assert_eq!(callee.int("n").unwrap(), 3);
        assert_eq!(callee.text("return_address").unwrap(), "main1");
        // Caller now holds its locals
        let caller = machine.stack().top(1).unwrap();
        assert_eq!(caller.int("n").unwrap(), 3);
        assert_eq!(caller.int("a").unwrap(), 0);
    }

    #[test]
    fn base_case_resumes_at_the_caller_supplied_address() {
        let mut machine = machine_for("0");
        machine.step().unwrap(); // main
        machine.step().unwrap(); // fib, n = 0
        assert_eq!(machine.address(), Address::Main1);
        assert_eq!(
            machine.stack().top(0).unwrap().int("return_value").unwrap(),
            0
        );
    }

    #[test]
    fn n_zero_runs_to_completion() {
        let mut machine = machine_for("0");
        assert_eq!(machine.run().unwrap(), 0);
        assert!(machine.stack().is_empty());
        assert_eq!(machine.outputs(), ["fib(0)=0".to_string()]);
        assert_eq!(machine.stats().fib_calls, 1);
        assert_eq!(machine.stats().max_call_depth, 1);
    }

    #[test]
    fn missing_argument_is_invalid() {
        let mut machine = Machine::new(vec!["stackstep".to_string()]);
        assert!(matches!(
            machine.step(),
            Err(MachineError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn non_numeric_argument_is_invalid() {
        let mut machine = machine_for("five");
        let err = machine.step().unwrap_err();
        assert_eq!(
            err,
            MachineError::InvalidArgument {
                reason: "'five' is not a base-10 integer".into()
            }
        );
    }

    #[test]
    fn snapshot_carries_no_references() {
        let mut machine = machine_for("2");
        machine.step().unwrap();
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.address, "fib");
        assert_eq!(snapshot.depth, 2);
        assert_eq!(snapshot.frames.len(), 2);
        assert_eq!(snapshot.frames[1].vars[0].name, "n");
        // Stepping on after the snapshot is taken does not disturb it
        machine.step().unwrap();
        assert_eq!(snapshot.depth, 2);
    }

    #[test]
    fn driven_run_honours_quit() {
        struct QuitAfter(usize);
        impl Renderer for QuitAfter {
            fn render(&mut self, _snapshot: &Snapshot) {}
            fn await_step(&mut self) -> StepSignal {
                if self.0 == 0 {
                    StepSignal::Quit
                } else {
                    self.0 -= 1;
                    StepSignal::Step
                }
            }
        }

        let mut machine = machine_for("5");
        let outcome = machine.run_with(&mut QuitAfter(3)).unwrap();
        assert_eq!(outcome, RunOutcome::Aborted);
        assert_eq!(machine.stats().steps, 3);
        assert!(!machine.stack().is_empty());
    }

    #[test]
    fn driven_run_finishes() {
        struct AlwaysStep;
        impl Renderer for AlwaysStep {
            fn render(&mut self, _snapshot: &Snapshot) {}
            fn await_step(&mut self) -> StepSignal {
                StepSignal::Step
            }
        }

        let mut machine = machine_for("4");
        assert_eq!(
            machine.run_with(&mut AlwaysStep).unwrap(),
            RunOutcome::Finished(3)
        );
    }

    #[test]
    fn trace_records_the_transition_narrative() {
        let mut machine = machine_for("0");
        machine.run().unwrap();
        let messages: Vec<&str> = machine
            .trace()
            .entries()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "enter main",
                "calling fib in main",
                "enter fib",
                "return n in fib",
                "return from fib in main",
                "return from main",
            ]
        );
    }
}
