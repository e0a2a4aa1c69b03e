use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use stackstep_runtime::{Machine, RunOutcome, StepOutcome};

mod tui;

/// Explicit-stack execution simulator.
///
/// Runs a recursive Fibonacci as an interpreted state machine over an
/// explicit call stack of dynamically-typed variable frames, one transition
/// per keypress, with the stack and transition log rendered after each step.
///
/// EXAMPLES:
///     stackstep 10                 Step through fib(10) interactively
///     stackstep 10 --batch         Run to completion, print fib(10)=55
///     stackstep 10 --batch --json  Emit a JSON run report
///
/// ENVIRONMENT VARIABLES:
///     STACKSTEP_JSON    Set to '1' for JSON output by default
///
/// On normal termination the process exit code is the simulated program's
/// return value, i.e. fib(n).
#[derive(Parser)]
#[command(name = "stackstep")]
#[command(version)]
struct Cli {
    /// Fibonacci input n (ASCII integer, base 10)
    n: String,
    /// Run to completion without the interactive stepper
    #[arg(long, short = 'b')]
    batch: bool,
    /// Emit a JSON run report instead of plain output (implies --batch)
    #[arg(long, env = "STACKSTEP_JSON")]
    json: bool,
    /// Print every transition to stderr (implies --batch)
    #[arg(long, short = 't')]
    trace: bool,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut machine = Machine::new(vec!["stackstep".to_string(), cli.n.clone()]);

    let result = if cli.batch || cli.json || cli.trace {
        run_batch(&mut machine, cli.trace)?
    } else {
        run_interactive(&mut machine)?
    };

    let result = match result {
        Some(value) => value,
        // Quit from the stepper: nothing to report.
        None => return Ok(130),
    };

    if cli.json {
        let n: i64 = cli
            .n
            .parse()
            .context("run report requires a numeric <n>")?;
        let stats = machine.stats();
        let report = serde_json::json!({
            "n": n,
            "result": result,
            "steps": stats.steps,
            "fib_calls": stats.fib_calls,
            "max_call_depth": stats.max_call_depth,
        });
        println!("{report}");
    } else {
        for line in machine.outputs() {
            println!("{line}");
        }
    }

    Ok(result as i32)
}

/// Step to completion, optionally narrating each transition on stderr.
fn run_batch(machine: &mut Machine, trace: bool) -> Result<Option<i64>> {
    loop {
        if trace {
            let snapshot = machine.snapshot();
            let frames: Vec<&str> = snapshot.frames.iter().map(|f| f.rendered.as_str()).collect();
            eprintln!(
                "{:>4} {:<7} {}",
                snapshot.step,
                snapshot.address,
                frames.join(" ")
            );
        }
        match machine.step().context("simulation halted")? {
            StepOutcome::Running => {}
            StepOutcome::Finished(value) => return Ok(Some(value)),
        }
    }
}

/// Drive the machine from the full-screen stepper.
fn run_interactive(machine: &mut Machine) -> Result<Option<i64>> {
    let mut stepper = tui::StepTui::new().context("failed to initialize the terminal")?;
    let outcome = machine.run_with(&mut stepper);
    drop(stepper); // restore the terminal before touching stdout/stderr
    match outcome.context("simulation halted")? {
        RunOutcome::Finished(value) => Ok(Some(value)),
        RunOutcome::Aborted => {
            eprintln!("aborted at step {}", machine.stats().steps);
            Ok(None)
        }
    }
}
