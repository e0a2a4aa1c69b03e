//! Program-counter addresses for the simulated program
//!
//! The simulated control-flow graph has a finite set of points: two entry
//! addresses (`main`, `fib`), three resume addresses naming the instruction
//! after a call returns into its caller (`main1`, `fib1`, `fib2`), and the
//! terminal `return` address that exits to the OS.
//!
//! Static transitions move between these variants directly. The *dynamic*
//! jump at a function's exit goes through the text stored in the frame's
//! `return_address` slot, parsed here; a corrupted label surfaces as
//! [`MachineError::UnknownAddress`].

use crate::error::MachineError;
use std::fmt;
use std::str::FromStr;

/// A point in the simulated control-flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// Entry of the simulated `main`
    Main,
    /// Resume point in `main` after the `fib(n)` call returns
    Main1,
    /// Entry of the simulated `fib`
    Fib,
    /// Resume point in `fib` after the `fib(n-1)` call returns
    Fib1,
    /// Resume point in `fib` after the `fib(n-2)` call returns
    Fib2,
    /// Terminal address: pop the last frame and exit
    Return,
}

impl Address {
    /// The label stored in `return_address` slots and shown by renderers.
    pub fn label(self) -> &'static str {
        match self {
            Address::Main => "main",
            Address::Main1 => "main1",
            Address::Fib => "fib",
            Address::Fib1 => "fib1",
            Address::Fib2 => "fib2",
            Address::Return => "return",
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Address {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Address::Main),
            "main1" => Ok(Address::Main1),
            "fib" => Ok(Address::Fib),
            "fib1" => Ok(Address::Fib1),
            "fib2" => Ok(Address::Fib2),
            "return" => Ok(Address::Return),
            other => Err(MachineError::UnknownAddress {
                label: other.into(),
            }),
        }
    }
}
