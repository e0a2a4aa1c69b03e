//! Full-screen interactive stepper
//!
//! Mirrors the layout of the machine's console: transition log in the
//! top-left window, the current address top-right, and the rendered call
//! stack below the log. Any key applies one transition; `q`, `Esc`, or
//! Ctrl-C abandons the run.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style::Print};
use stackstep_runtime::{Renderer, Snapshot, StepSignal, DEFAULT_CAPACITY};
use std::io::{self, Stdout, Write};

/// Crossterm-backed renderer and step clock.
///
/// Raw mode and the alternate screen are entered on construction and
/// restored on drop, so the caller's terminal survives errors and quits.
pub struct StepTui {
    out: Stdout,
}

impl StepTui {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { out })
    }

    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))?;

        // Log window, top-left
        for (i, entry) in snapshot.log.iter().enumerate() {
            queue!(
                self.out,
                cursor::MoveTo(0, i as u16),
                Print(format!("{:04}> {}", entry.step, entry.message))
            )?;
        }

        // Current address, top-right of the log window
        queue!(
            self.out,
            cursor::MoveTo(40, 0),
            Print(format!("address: {}", snapshot.address))
        )?;

        // Call stack, bottom first, below the log window
        let base = (DEFAULT_CAPACITY + 1) as u16;
        for (i, frame) in snapshot.frames.iter().enumerate() {
            queue!(
                self.out,
                cursor::MoveTo(0, base + i as u16),
                Print(format!("frame {}:{}", frame.index, frame.rendered))
            )?;
        }

        queue!(
            self.out,
            cursor::MoveTo(0, base + snapshot.frames.len() as u16 + 1),
            Print("any key: step   q/Esc: quit")
        )?;
        self.out.flush()
    }
}

impl Renderer for StepTui {
    fn render(&mut self, snapshot: &Snapshot) {
        // Display only: a failed draw must not affect the step loop.
        let _ = self.draw(snapshot);
    }

    fn await_step(&mut self) -> StepSignal {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return StepSignal::Quit,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return StepSignal::Quit
                    }
                    _ => return StepSignal::Step,
                },
                // Resize and other events are not step signals.
                Ok(_) => continue,
                Err(_) => return StepSignal::Quit,
            }
        }
    }
}

impl Drop for StepTui {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}
