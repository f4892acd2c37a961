use std::{collections::BTreeSet, ops::RangeInclusive};

use thiserror::Error;

use super::engine::{Engine, EngineError};
use crate::assembler::{
    compiler::{Assembly, CommandSet, Compiler},
    lexer::CharStream,
    AssemblerError,
};

/// Where the session is in the edit-compile-debug cycle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No program is loaded or the source is being changed.
    #[default]
    Edit,
    /// A program is loaded and advances one instruction at a time.
    Step,
    /// The program runs until something stops it.
    Run,
    /// The machine halted.
    Halted,
}

/// Why [`Session::run`] returned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The machine halted.
    Halted,
    /// The next instruction is covered by a breakpoint on this 0-based line.
    Breakpoint(usize),
    /// The step limit was reached first.
    StepLimit,
}

/// A runtime fault, together with where it happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error} at {}", location(.ip, .line))]
pub struct Fault {
    pub error: EngineError,
    /// Instruction that faulted
    pub ip: usize,
    /// 0-based source line of that instruction
    pub line: Option<usize>,
}

fn location(ip: &usize, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("line {}", line + 1),
        None => format!("instruction {}", ip),
    }
}

/// 0-based source lines that stop a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Breakpoints {
    lines: BTreeSet<usize>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the breakpoint if it is missing and removes it otherwise. Returns whether it is set
    /// afterwards.
    pub fn toggle(&mut self, line: usize) -> bool {
        if self.lines.remove(&line) {
            false
        } else {
            self.lines.insert(line);
            true
        }
    }

    pub fn insert(&mut self, line: usize) {
        self.lines.insert(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn contains(&self, line: usize) -> bool {
        self.lines.contains(&line)
    }

    /// First breakpoint within `lines`.
    pub fn first_in(&self, lines: RangeInclusive<usize>) -> Option<usize> {
        self.lines.range(lines).next().copied()
    }
}

/// Ties a compiler and an engine together the way a debugger front-end drives them.
///
/// A failed compilation leaves the loaded program alone. A runtime fault halts the machine
/// and is returned with the source line of the faulting instruction.
#[derive(Debug)]
pub struct Session {
    compiler: Compiler,
    assembly: Option<Assembly>,
    engine: Engine,
    breakpoints: Breakpoints,
    state: SessionState,
}

impl Session {
    pub fn new(commands: CommandSet) -> Self {
        Self {
            compiler: Compiler::new(commands),
            assembly: None,
            engine: Engine::new(),
            breakpoints: Breakpoints::new(),
            state: SessionState::Edit,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// The last successfully compiled program.
    pub fn assembly(&self) -> Option<&Assembly> {
        self.assembly.as_ref()
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn breakpoints_mut(&mut self) -> &mut Breakpoints {
        &mut self.breakpoints
    }

    /// Compiles the source and loads it into the engine, which resets it.
    ///
    /// On failure the engine keeps its program and the session goes back to editing.
    #[tracing::instrument(skip_all)]
    pub fn compile(&mut self, stream: &mut dyn CharStream) -> Result<&Assembly, AssemblerError> {
        match self.compiler.compile(stream) {
            Ok(assembly) => {
                self.engine.set_program(assembly.program.clone());
                self.state = SessionState::Step;
                Ok(self.assembly.insert(assembly))
            }
            Err(err) => {
                tracing::debug!("compilation failed: {}", err);
                self.state = SessionState::Edit;
                Err(err)
            }
        }
    }

    /// Zeroes the machine and rewinds the loaded program.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        self.engine.reset();
        self.state = match self.assembly {
            Some(_) => SessionState::Step,
            None => SessionState::Edit,
        };
    }

    /// Stops a run and goes back to stepping.
    pub fn stop(&mut self) {
        if self.state == SessionState::Run {
            self.state = SessionState::Step;
        }
    }

    /// 0-based source line of the next instruction to execute.
    pub fn current_line(&self) -> Option<usize> {
        self.assembly
            .as_ref()
            .and_then(|assembly| assembly.source_line_for(self.engine.ip()))
    }

    /// Executes one instruction.
    #[tracing::instrument(skip(self))]
    pub fn step(&mut self) -> Result<(), Fault> {
        self.execute()?;
        self.state = if self.engine.is_halted() {
            SessionState::Halted
        } else {
            SessionState::Step
        };
        Ok(())
    }

    /// Steps until the machine halts, a breakpoint covers the next instruction, or `limit`
    /// steps have been executed.
    ///
    /// The first step is always taken, so a run that stopped at a breakpoint continues past it.
    /// Reaching the limit leaves the session in [`SessionState::Run`] so that the run can be
    /// continued in batches.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self, limit: Option<usize>) -> Result<RunOutcome, Fault> {
        self.state = SessionState::Run;
        let mut steps = 0;
        loop {
            if self.engine.is_halted() {
                self.state = SessionState::Halted;
                return Ok(RunOutcome::Halted);
            }
            if limit.is_some_and(|limit| steps >= limit) {
                return Ok(RunOutcome::StepLimit);
            }

            self.execute()?;
            steps += 1;

            if let Some(line) = self.breakpoint_hit() {
                tracing::debug!("breakpoint at line {}", line + 1);
                self.state = SessionState::Step;
                return Ok(RunOutcome::Breakpoint(line));
            }
        }
    }

    fn execute(&mut self) -> Result<(), Fault> {
        let ip = self.engine.ip();
        self.engine.step().map_err(|error| {
            tracing::warn!("runtime fault at instruction {}: {}", ip, error);
            self.engine.halt();
            self.state = SessionState::Halted;
            Fault {
                error,
                ip,
                line: self
                    .assembly
                    .as_ref()
                    .and_then(|assembly| assembly.source_line_for(ip)),
            }
        })
    }

    fn breakpoint_hit(&self) -> Option<usize> {
        let assembly = self.assembly.as_ref()?;
        let lines = assembly.breakpoint_lines(self.engine.ip())?;
        self.breakpoints.first_in(lines)
    }
}
