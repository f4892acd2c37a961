use std::{fmt, path::PathBuf, sync::mpsc::Receiver};

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    assembler::{
        lexer::{parse_number, StringCharStream},
        CommandSetArgs,
    },
    emulator::{
        engine::Engine,
        event::EngineEvent,
        input::{InputPort, PromptInput, QueuedInput},
        session::{Fault, RunOutcome, Session},
    },
    hexdump::{format_output, hexdump, ByteFormat},
};

/// The RISC-8 virtual machine.
pub mod engine;

/// Notifications published by the engine.
pub mod event;

/// Sources for the `IN` instruction.
pub mod input;

/// Register and memory banks.
pub mod memory;

/// Compile, step, run and breakpoints for a front-end.
pub mod session;

/// Terminal debugger.
pub mod tui;

fn parse_byte(text: &str) -> Result<u8, String> {
    parse_number(text).ok_or_else(|| format!("\"{}\" is not a number", text))
}

/// 1-based source line
fn parse_line(text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(0) => Err("lines are numbered from 1".to_string()),
        Ok(line) => Ok(line),
        Err(err) => Err(format!("\"{}\" is not a line number: {}", text, err)),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[clap(help = "Source file")]
    pub file: PathBuf,
    #[command(flatten)]
    pub commands: CommandSetArgs,
    #[clap(short, long, value_delimiter = ',', value_parser = parse_byte, allow_hyphen_values = true)]
    #[clap(help = "Comma separated values for IN, prompted for on stdin if not given")]
    pub input: Option<Vec<u8>>,
    #[clap(short, long = "break", value_name = "LINE", value_parser = parse_line)]
    #[clap(help = "Stop before the instruction on this 1-based source line")]
    pub breakpoints: Vec<usize>,
    #[clap(long, value_name = "N")]
    #[clap(help = "Stop after N instructions")]
    pub max_steps: Option<usize>,
    #[clap(short, long, value_enum, default_value_t = ByteFormat::Hex)]
    #[clap(help = "Format of the register values")]
    pub format: ByteFormat,
}

#[derive(Args, Debug)]
pub struct EmulationArgs {
    #[clap(help = "Source file")]
    pub file: PathBuf,
    #[command(flatten)]
    pub commands: CommandSetArgs,
    #[clap(short, long, value_delimiter = ',', value_parser = parse_byte, allow_hyphen_values = true)]
    #[clap(help = "Comma separated values for IN")]
    pub input: Vec<u8>,
}

#[derive(Args, Debug)]
pub struct CommandsArgs {
    #[command(flatten)]
    pub commands: CommandSetArgs,
}

fn print_outputs(events: &Receiver<EngineEvent>) {
    for event in events.try_iter() {
        if let EngineEvent::Output(value) = event {
            println!("{}", format_output(value));
        }
    }
}

fn print_state(engine: &Engine, format: ByteFormat) {
    let registers = engine
        .registers()
        .iter()
        .enumerate()
        .map(|(index, value)| format!("r{}: {}", index, format.format(*value)))
        .collect::<Vec<String>>()
        .join("  ");
    println!("{}", registers);
    println!("Execution time: {} clocks", engine.execution_time());
    println!("{}", hexdump(engine.memory(), 2, 16));
}

/// Runs a program without the terminal user interface and prints what it did.
pub fn run(args: &RunArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Unable to read file {}", args.file.display()))?;
    let mut session = Session::new(args.commands.command_set()?);
    session
        .compile(&mut StringCharStream::new(&source))
        .with_context(|| format!("Compilation of {} failed", args.file.display()))?;

    let input: Box<dyn InputPort> = match &args.input {
        Some(values) => Box::new(QueuedInput::new(values.iter().copied())),
        None => Box::new(PromptInput::stdio()),
    };
    session.engine_mut().set_input_port(input);
    for line in &args.breakpoints {
        session.breakpoints_mut().insert(line - 1);
    }
    let events = session.engine_mut().subscribe();

    let summary = run_steps(&mut session, args.max_steps, |_| print_outputs(&events));
    println!("{}", summary);
    print_state(session.engine(), args.format);

    summary.outcome?;
    Ok(())
}

/// How a run from the command line ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: Result<RunOutcome, Fault>,
    /// Instructions executed
    pub steps: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(RunOutcome::Halted) => write!(f, "Halted after {} steps", self.steps),
            Ok(RunOutcome::Breakpoint(line)) => write!(f, "Breakpoint at line {}", line + 1),
            Ok(RunOutcome::StepLimit) => write!(f, "Stopped after {} steps", self.steps),
            Err(fault) => write!(f, "Runtime error: {}", fault),
        }
    }
}

/// Runs until the machine halts, faults, hits a breakpoint or has executed `max_steps`
/// instructions.
///
/// Goes one instruction at a time and calls `on_step` after each, so outputs can be shown before
/// the next `IN` prompts.
pub fn run_steps(
    session: &mut Session,
    max_steps: Option<usize>,
    mut on_step: impl FnMut(&Session),
) -> RunSummary {
    let mut steps = 0;
    loop {
        if session.engine().is_halted() {
            return RunSummary {
                outcome: Ok(RunOutcome::Halted),
                steps,
            };
        }
        if max_steps.is_some_and(|max| steps >= max) {
            return RunSummary {
                outcome: Ok(RunOutcome::StepLimit),
                steps,
            };
        }

        let outcome = session.run(Some(1));
        steps += 1;
        on_step(session);
        match outcome {
            Ok(RunOutcome::StepLimit) => {}
            outcome => return RunSummary { outcome, steps },
        }
    }
}

/// Opens the terminal debugger on a source file.
pub fn emulate(args: &EmulationArgs) -> Result<()> {
    let commands = args.commands.command_set()?;
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Unable to read file {}", args.file.display()))?;

    let app = tui::app::App::new(&source, commands, args.input.clone());
    tui::run(app)
}

/// Prints the mnemonics of a command set.
pub fn commands(args: &CommandsArgs) -> Result<()> {
    let commands = args.commands.command_set()?;
    println!("Command set variant {}:", args.commands.variant);
    for (name, descriptor) in commands.iter() {
        println!("  {:<5} {}", name, descriptor.opcode.usage());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assembler::compiler::CommandSet, emulator::engine::EngineError};

    use pretty_assertions::assert_eq;

    const COUNTDOWN: &str = include_str!("../demos/countdown.r8");

    fn session(source: &str, input: Option<&[u8]>) -> Session {
        let mut session = Session::new(CommandSet::zero());
        session
            .compile(&mut StringCharStream::new(source))
            .unwrap();
        if let Some(values) = input {
            let port = QueuedInput::new(values.iter().copied());
            session.engine_mut().set_input_port(Box::new(port));
        }
        session
    }

    fn outputs(events: &Receiver<EngineEvent>) -> Vec<u8> {
        events
            .try_iter()
            .filter_map(|event| match event {
                EngineEvent::Output(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_run_until_halt() {
        let mut session = session(COUNTDOWN, Some(&[2]));
        let events = session.engine_mut().subscribe();
        let mut seen = vec![];

        let summary = run_steps(&mut session, None, |_| seen.extend(outputs(&events)));
        assert_eq!(
            summary,
            RunSummary {
                outcome: Ok(RunOutcome::Halted),
                steps: 9,
            }
        );
        assert_eq!(seen, vec![2, 1]);
        assert_eq!(summary.to_string(), "Halted after 9 steps");
    }

    #[test]
    fn test_max_steps() {
        let mut session = session(COUNTDOWN, Some(&[2]));

        let summary = run_steps(&mut session, Some(3), |_| {});
        assert_eq!(summary.outcome, Ok(RunOutcome::StepLimit));
        assert_eq!(summary.steps, 3);
        assert_eq!(session.engine().ip(), 3);
        assert_eq!(summary.to_string(), "Stopped after 3 steps");

        let summary = run_steps(&mut session, Some(0), |_| {});
        assert_eq!(summary.steps, 0);
        assert_eq!(session.engine().ip(), 3);
    }

    #[test]
    fn test_breakpoint_then_continue() {
        let mut session = session(COUNTDOWN, Some(&[2]));
        // `SUB` is on the fourth line
        session.breakpoints_mut().insert(parse_line("4").unwrap() - 1);

        let summary = run_steps(&mut session, None, |_| {});
        assert_eq!(summary.outcome, Ok(RunOutcome::Breakpoint(3)));
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.to_string(), "Breakpoint at line 4");

        let summary = run_steps(&mut session, None, |_| {});
        assert_eq!(summary.outcome, Ok(RunOutcome::Breakpoint(3)));
        assert_eq!(summary.steps, 4);
    }

    #[test]
    fn test_fault_ends_run() {
        let mut session = session(COUNTDOWN, None);

        let summary = run_steps(&mut session, None, |_| {});
        assert_eq!(summary.steps, 1);
        let fault = summary.outcome.clone().unwrap_err();
        assert_eq!(fault.error, EngineError::NoInputPort);
        assert_eq!(fault.line, Some(1));
        assert_eq!(
            summary.to_string(),
            "Runtime error: No input port connected at line 2"
        );
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("1"), Ok(1));
        assert_eq!(parse_line("12"), Ok(12));
        assert!(parse_line("0").is_err());
        assert!(parse_line("-1").is_err());
        assert!(parse_line("x").is_err());
    }
}
