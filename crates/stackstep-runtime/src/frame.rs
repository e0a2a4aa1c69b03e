//! Activation records for simulated calls
//!
//! A `Frame` is a named set of variables belonging to one simulated call.
//! Slots are stored in declaration order: frames here hold at most five
//! variables, so linear lookup wins over hashing and the rendered form is
//! deterministic without sorting.
//!
//! Lifecycle: the dispatcher creates a frame when it pushes a call, every
//! declared variable lives for the frame's whole lifetime, and the frame is
//! destroyed when popped (its `return_value` is read exactly once by the
//! caller before the drop).

use crate::error::MachineError;
use crate::value::{Value, ValueKind};

/// One activation record: an ordered `name -> Value` mapping with unique keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    slots: Vec<(String, Value)>,
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Build a frame from a fixed slot list.
    ///
    /// Used by the dispatcher, where slot names are distinct literals.
    pub(crate) fn from_slots(slots: Vec<(&str, Value)>) -> Self {
        debug_assert!(
            slots
                .iter()
                .all(|(name, _)| slots.iter().filter(|(n, _)| n == name).count() == 1),
            "frame slot names must be unique"
        );
        Self {
            slots: slots
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Insert a new slot. A name must be declared exactly once per frame.
    pub fn declare(&mut self, name: &str, initial: Value) -> Result<(), MachineError> {
        if self.find(name).is_some() {
            return Err(MachineError::DuplicateName { name: name.into() });
        }
        self.slots.push((name.to_string(), initial));
        Ok(())
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Declared `(name, value)` pairs in declaration order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|(name, value)| (name.as_str(), value))
    }

    // ── Typed accessors ──────────────────────────────────────────────────────
    //
    // The only mutation path into a frame after declaration. Wrong-variant
    // access is an error, never a coercion.

    /// Read an `Int` slot.
    pub fn int(&self, name: &str) -> Result<i64, MachineError> {
        match self.slot(name)? {
            Value::Int(n) => Ok(*n),
            other => Err(mismatch(name, ValueKind::Int, other)),
        }
    }

    /// Mutable handle to an `Int` slot.
    pub fn int_mut(&mut self, name: &str) -> Result<&mut i64, MachineError> {
        match self.slot_mut(name)? {
            Value::Int(n) => Ok(n),
            other => Err(mismatch(name, ValueKind::Int, other)),
        }
    }

    /// Read a `Text` slot.
    pub fn text(&self, name: &str) -> Result<&str, MachineError> {
        match self.slot(name)? {
            Value::Text(s) => Ok(s),
            other => Err(mismatch(name, ValueKind::Text, other)),
        }
    }

    /// Mutable handle to a `Text` slot.
    pub fn text_mut(&mut self, name: &str) -> Result<&mut String, MachineError> {
        match self.slot_mut(name)? {
            Value::Text(s) => Ok(s),
            other => Err(mismatch(name, ValueKind::Text, other)),
        }
    }

    /// Read a `StringList` slot.
    pub fn list(&self, name: &str) -> Result<&[String], MachineError> {
        match self.slot(name)? {
            Value::StringList(items) => Ok(items),
            other => Err(mismatch(name, ValueKind::StringList, other)),
        }
    }

    /// Render as `{name:value,...}` in declaration order. Side-effect-free.
    pub fn render(&self) -> String {
        let mut out = String::from("{");
        for (i, (name, value)) in self.slots.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(name);
            out.push(':');
            out.push_str(&value.to_string());
        }
        out.push('}');
        out
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|(n, _)| n == name)
    }

    fn slot(&self, name: &str) -> Result<&Value, MachineError> {
        match self.find(name) {
            Some(i) => Ok(&self.slots[i].1),
            None => Err(MachineError::UndeclaredName { name: name.into() }),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Value, MachineError> {
        match self.find(name) {
            Some(i) => Ok(&mut self.slots[i].1),
            None => Err(MachineError::UndeclaredName { name: name.into() }),
        }
    }
}

fn mismatch(name: &str, expected: ValueKind, found: &Value) -> MachineError {
    MachineError::TypeMismatch {
        name: name.into(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn declare_then_read() {
        let mut frame = Frame::new();
        frame.declare("n", Value::Int(5)).unwrap();
        assert_eq!(frame.int("n").unwrap(), 5);
    }

    #[test]
    fn duplicate_declare_is_rejected() {
        let mut frame = Frame::new();
        frame.declare("n", Value::Int(0)).unwrap();
        assert_eq!(
            frame.declare("n", Value::Int(1)),
            Err(MachineError::DuplicateName { name: "n".into() })
        );
        // Original slot is untouched
        assert_eq!(frame.int("n").unwrap(), 0);
    }

    #[test]
    fn access_before_declare_fails() {
        let frame = Frame::new();
        assert_eq!(
            frame.int("n"),
            Err(MachineError::UndeclaredName { name: "n".into() })
        );
    }

    #[test]
    fn wrong_variant_is_a_mismatch_not_a_coercion() {
        let mut frame = Frame::new();
        frame.declare("addr", Value::Text("fib1".into())).unwrap();
        assert_eq!(
            frame.int("addr"),
            Err(MachineError::TypeMismatch {
                name: "addr".into(),
                expected: ValueKind::Int,
                found: ValueKind::Text,
            })
        );
        // The slot still reads fine through the right accessor
        assert_eq!(frame.text("addr").unwrap(), "fib1");
    }

    #[test]
    fn mutation_goes_through_typed_handles() {
        let mut frame = Frame::new();
        frame.declare("rec1", Value::Int(0)).unwrap();
        *frame.int_mut("rec1").unwrap() = 13;
        assert_eq!(frame.int("rec1").unwrap(), 13);

        frame.declare("ra", Value::Text("fib1".into())).unwrap();
        *frame.text_mut("ra").unwrap() = "fib2".into();
        assert_eq!(frame.text("ra").unwrap(), "fib2");
    }

    #[test]
    fn render_is_declaration_ordered() {
        let mut frame = Frame::new();
        frame
            .declare("args", Value::StringList(vec!["prog".into(), "3".into()]))
            .unwrap();
        frame.declare("return_value", Value::Int(0)).unwrap();
        frame
            .declare("return_address", Value::Text("return".into()))
            .unwrap();
        assert_eq!(
            frame.render(),
            "{args:[prog,3],return_value:0,return_address:return}"
        );
    }

    #[test]
    fn from_slots_matches_declare_order() {
        let built = Frame::from_slots(vec![
            ("n", Value::Int(4)),
            ("return_value", Value::Int(0)),
            ("return_address", Value::Text("fib1".into())),
        ]);
        assert_eq!(built.render(), "{n:4,return_value:0,return_address:fib1}");
        assert_eq!(built.len(), 3);
    }
}
