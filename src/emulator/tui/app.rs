pub mod state;
pub mod widget;

use std::{collections::BTreeSet, sync::mpsc::Receiver};

use crate::{
    assembler::{
        compiler::CommandSet,
        lexer::{Lexer, LinesCharStream, TokenType},
        AssemblerError,
    },
    emulator::{
        event::EngineEvent,
        input::QueuedInput,
        memory::REGISTER_COUNT,
        session::{RunOutcome, Session, SessionState},
    },
};

pub use state::{EmulationState, StateValue};
pub use widget::AppWidget;

/// Steps executed per tick while running.
const RUN_BATCH: usize = 1000;
/// Lines moved by a page scroll.
const PAGE_SIZE: usize = 10;
/// Rows in the memory grid.
const MEMORY_ROWS: u16 = 16;
/// Outputs kept in the log, older ones are dropped.
const OUTPUT_LOG_SIZE: usize = 1000;

pub struct App {
    /// Debugging session holding the compiler, engine and breakpoints
    session: Session,
    /// Events published by the engine
    events: Receiver<EngineEvent>,
    /// Values fed to `IN`, reinstalled on every reset
    input: Vec<u8>,

    /// Source lines as loaded
    source: Vec<String>,
    /// 0-based lines containing a misprinted token
    misprints: BTreeSet<usize>,
    /// Error from the last compilation
    compile_error: Option<AssemblerError>,

    /// Last bytes written by `OUT` since the last reset
    output: Vec<u8>,
    /// Number of bytes written by `OUT` since the last reset
    output_count: usize,
    /// Memory cells written during the last step or batch
    written_memory: BTreeSet<usize>,
    /// Status bar message
    status: String,

    /// State of the machine
    state: EmulationState,
    /// If a continuous run is in progress
    running: bool,

    pub selected_widget: AppWidget,
    /// Selected source line
    pub cursor: usize,
    pub source_scroll: u16,
    pub memory_scroll: u16,
    pub output_scroll: u16,

    /// If the app should quit
    should_quit: bool,
}

impl App {
    pub fn new(source: &str, commands: CommandSet, input: Vec<u8>) -> Self {
        let mut session = Session::new(commands);
        let events = session.engine_mut().subscribe();
        let source: Vec<String> = source.lines().map(str::to_owned).collect();
        let misprints = find_misprints(&source);

        let mut app = Self {
            session,
            events,
            input,
            source,
            misprints,
            compile_error: None,
            output: Vec::new(),
            output_count: 0,
            written_memory: BTreeSet::new(),
            status: String::new(),
            state: EmulationState::default(),
            running: false,
            selected_widget: AppWidget::default(),
            cursor: 0,
            source_scroll: 0,
            memory_scroll: 0,
            output_scroll: 0,
            should_quit: false,
        };

        app.compile();
        app
    }

    fn compile(&mut self) {
        let mut stream = LinesCharStream::new(&self.source);
        match self.session.compile(&mut stream) {
            Ok(assembly) => {
                self.status = format!("Compiled {} instructions", assembly.program.len());
                self.compile_error = None;
            }
            Err(err) => {
                self.status = format!("Compilation failed: {}", err);
                self.cursor = err.line();
                self.compile_error = Some(err);
            }
        }
        self.install_input();
        self.drain_events();
    }

    fn install_input(&mut self) {
        let port = QueuedInput::new(self.input.iter().copied());
        self.session.engine_mut().set_input_port(Box::new(port));
    }

    fn drain_events(&mut self) {
        for event in self.events.try_iter() {
            match event {
                EngineEvent::Reset => {
                    self.output.clear();
                    self.output_count = 0;
                    self.written_memory.clear();
                }
                EngineEvent::Output(value) => {
                    self.output.push(value);
                    self.output_count += 1;
                }
                EngineEvent::MemoryWritten(index) => {
                    self.written_memory.insert(index);
                }
                EngineEvent::RegisterWritten(_) | EngineEvent::Halt => {}
            }
        }

        if self.output.len() > OUTPUT_LOG_SIZE {
            let dropped = self.output.len() - OUTPUT_LOG_SIZE;
            self.output.drain(..dropped);
            self.output_scroll = self.output_scroll.saturating_sub(clamp_u16(dropped));
        }
    }

    fn can_execute(&mut self) -> bool {
        match self.session.state() {
            SessionState::Edit => {
                self.status = "Nothing to run, fix the compilation error first".to_string();
                false
            }
            SessionState::Halted => {
                self.status = "Halted, press `r` to reset".to_string();
                false
            }
            SessionState::Step | SessionState::Run => true,
        }
    }

    fn follow_current_line(&mut self) {
        if let Some(line) = self.session.current_line() {
            self.cursor = line;
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Quits the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Executes one instruction.
    pub fn step(&mut self) {
        if self.running || !self.can_execute() {
            return;
        }
        self.state.invalidate();
        self.written_memory.clear();
        match self.session.step() {
            Ok(()) if self.session.engine().is_halted() => self.status = "Halted".to_string(),
            Ok(()) => self.status = format!("Step to line {}", self.line_label()),
            Err(fault) => self.status = format!("Runtime error: {}", fault),
        }
        self.drain_events();
        self.follow_current_line();
    }

    /// Starts a continuous run, or stops the one in progress.
    pub fn toggle_run(&mut self) {
        if self.running {
            self.running = false;
            self.session.stop();
            self.status = format!("Stopped at line {}", self.line_label());
            self.follow_current_line();
            return;
        }
        if self.can_execute() {
            self.running = true;
            self.status = "Running".to_string();
        }
    }

    /// Advances a continuous run by one batch of instructions.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.state.invalidate();
        self.written_memory.clear();
        match self.session.run(Some(RUN_BATCH)) {
            Ok(RunOutcome::StepLimit) => {}
            Ok(RunOutcome::Halted) => {
                self.running = false;
                self.status = "Halted".to_string();
            }
            Ok(RunOutcome::Breakpoint(line)) => {
                self.running = false;
                self.status = format!("Breakpoint at line {}", line + 1);
            }
            Err(fault) => {
                self.running = false;
                self.status = format!("Runtime error: {}", fault);
            }
        }
        self.drain_events();
        if !self.running {
            self.follow_current_line();
        }
    }

    /// Zeroes the machine, restores the input values and rewinds the program.
    pub fn reset(&mut self) {
        self.running = false;
        self.session.reset();
        self.install_input();
        self.state.invalidate();
        self.drain_events();
        self.output_scroll = 0;
        self.status = "Reset".to_string();
        self.follow_current_line();
    }

    /// Toggles the breakpoint on the selected source line.
    pub fn toggle_breakpoint(&mut self) {
        let line = self.cursor;
        let set = self.session.breakpoints_mut().toggle(line);
        self.status = if set {
            format!("Breakpoint set on line {}", line + 1)
        } else {
            format!("Breakpoint cleared on line {}", line + 1)
        };
    }

    pub fn scroll_up(&mut self) {
        self.scroll_by(-1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_by(1);
    }

    pub fn scroll_up_page(&mut self) {
        self.scroll_by(-(PAGE_SIZE as isize));
    }

    pub fn scroll_down_page(&mut self) {
        self.scroll_by(PAGE_SIZE as isize);
    }

    fn scroll_by(&mut self, delta: isize) {
        match self.selected_widget {
            AppWidget::Source => {
                let last = self.source.len().saturating_sub(1);
                self.cursor = self.cursor.saturating_add_signed(delta).min(last);
            }
            AppWidget::Memory => {
                self.memory_scroll = step_scroll(self.memory_scroll, delta, MEMORY_ROWS - 1);
            }
            AppWidget::Output => {
                let last = clamp_u16(self.output.len().saturating_sub(1));
                self.output_scroll = step_scroll(self.output_scroll, delta, last);
            }
        }
    }

    /// Get the last and current state of the emulation
    pub fn state(&mut self) -> EmulationState {
        let engine = self.session.engine();
        for (index, value) in engine.registers().iter().enumerate().take(REGISTER_COUNT) {
            self.state.registers[index].set(*value);
        }
        self.state.ip.set(engine.ip());
        self.state.execution_time.set(engine.execution_time());
        self.state.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn source(&self) -> &[String] {
        &self.source
    }

    pub fn misprints(&self) -> &BTreeSet<usize> {
        &self.misprints
    }

    pub fn compile_error(&self) -> Option<&AssemblerError> {
        self.compile_error.as_ref()
    }

    /// The most recent outputs, oldest first.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// All outputs since the last reset, including those dropped from the log.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn written_memory(&self) -> &BTreeSet<usize> {
        &self.written_memory
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn line_label(&self) -> String {
        match self.session.current_line() {
            Some(line) => (line + 1).to_string(),
            None => "-".to_string(),
        }
    }
}

pub(super) fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn step_scroll(current: u16, delta: isize, max: u16) -> u16 {
    let next = (current as isize + delta).clamp(0, max as isize);
    next as u16
}

/// Lines holding characters the lexer cannot turn into a token.
fn find_misprints(source: &[String]) -> BTreeSet<usize> {
    let mut stream = LinesCharStream::new(source);
    let mut lexer = Lexer::new(&mut stream);
    let mut misprints = BTreeSet::new();
    loop {
        let token = lexer.next_token_lenient();
        match token.token {
            TokenType::EndOfSource => break,
            TokenType::Misprint => {
                misprints.insert(token.line);
            }
            _ => {}
        }
    }
    misprints
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ECHO: &str = "\
loop: IN r0
      OUT r0
      JZ 0, loop
";

    fn app(source: &str, input: Vec<u8>) -> App {
        App::new(source, CommandSet::zero(), input)
    }

    #[test]
    fn test_compiles_on_load() {
        let app = app(ECHO, vec![]);
        assert!(app.compile_error().is_none());
        assert_eq!(app.session().state(), SessionState::Step);
        assert_eq!(app.status(), "Compiled 3 instructions");
    }

    #[test]
    fn test_compile_error_moves_cursor() {
        let app = app("IN r0\nFOO r1\n", vec![]);
        assert!(app.compile_error().is_some());
        assert_eq!(app.cursor, 1);
        assert_eq!(app.session().state(), SessionState::Edit);

        // Missing operand at the end of the source
        let app = App::new("IN r0\nADD r0, r1\n", CommandSet::zero(), vec![]);
        assert_eq!(app.cursor, 1);
        assert!(app.cursor < app.source().len());
    }

    #[test]
    fn test_misprints() {
        let app = app("IN r0\nOUT r0 ?\nHALT\n", vec![]);
        assert_eq!(app.misprints().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_step_collects_output() {
        let mut app = app(ECHO, vec![7, 9]);
        app.step();
        app.step();
        assert_eq!(app.output(), &[7]);
        assert_eq!(app.state().registers[0].get(), 7);
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn test_run_until_input_exhausted() {
        let mut app = app(ECHO, vec![1, 2, 3]);
        app.toggle_run();
        assert!(app.is_running());
        app.tick();
        assert!(!app.is_running());
        assert_eq!(app.output(), &[1, 2, 3]);
        assert_eq!(app.session().state(), SessionState::Halted);
    }

    #[test]
    fn test_reset_restores_input() {
        let mut app = app(ECHO, vec![5]);
        app.toggle_run();
        app.tick();
        assert_eq!(app.output(), &[5]);
        app.reset();
        assert!(app.output().is_empty());
        app.toggle_run();
        app.tick();
        assert_eq!(app.output(), &[5]);
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut app = app(ECHO, vec![1, 2, 3]);
        app.cursor = 1;
        app.toggle_breakpoint();
        app.toggle_run();
        app.tick();
        assert!(!app.is_running());
        assert_eq!(app.status(), "Breakpoint at line 2");
        assert!(app.output().is_empty());
    }

    #[test]
    fn test_step_refused_without_program() {
        let mut app = app("JZ 0, nowhere\n", vec![]);
        app.step();
        assert_eq!(app.status(), "Nothing to run, fix the compilation error first");
        app.toggle_run();
        assert!(!app.is_running());
    }

    #[test]
    fn test_output_log_keeps_the_latest() {
        let source = "loop: OUT r0\n      ADD r0, 1, r0\n      JZ 0, loop\n";
        let mut app = app(source, vec![]);
        app.selected_widget = AppWidget::Output;
        app.toggle_run();
        // Each batch outputs a third of its steps
        for _ in 0..4 {
            app.tick();
        }
        assert_eq!(app.output().len(), OUTPUT_LOG_SIZE);
        assert!(app.output_count() > OUTPUT_LOG_SIZE);

        let dropped = app.output_count() - OUTPUT_LOG_SIZE;
        assert_eq!(app.output()[0], (dropped % 256) as u8);
        assert_eq!(app.output().last().copied(), Some(((app.output_count() - 1) % 256) as u8));

        app.scroll_down_page();
        assert!(usize::from(app.output_scroll) < app.output().len());
        assert_eq!(clamp_u16(usize::MAX), u16::MAX);
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let mut app = app(ECHO, vec![]);
        app.scroll_up();
        assert_eq!(app.cursor, 0);
        app.scroll_down_page();
        assert_eq!(app.cursor, 2);
        app.selected_widget = AppWidget::Memory;
        app.scroll_down_page();
        app.scroll_down_page();
        assert_eq!(app.memory_scroll, 15);
        app.scroll_up();
        assert_eq!(app.memory_scroll, 14);
    }
}
