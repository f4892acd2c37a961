use pretty_assertions::assert_eq;

use risc8::{
    assembler::{compiler::CommandSet, lexer::StringCharStream},
    emulator::{
        event::EngineEvent,
        input::QueuedInput,
        session::{RunOutcome, Session, SessionState},
    },
};

fn load(source: &str, commands: CommandSet, input: &[u8]) -> Session {
    let mut session = Session::new(commands);
    session.compile(&mut StringCharStream::new(source)).unwrap();
    session
        .engine_mut()
        .set_input_port(Box::new(QueuedInput::new(input.iter().copied())));
    session
}

fn outputs(events: &std::sync::mpsc::Receiver<EngineEvent>) -> Vec<u8> {
    events
        .try_iter()
        .filter_map(|event| match event {
            EngineEvent::Output(value) => Some(value),
            _ => None,
        })
        .collect()
}

#[test]
fn test_countdown_program() {
    let mut session = load(include_str!("../demos/countdown.r8"), CommandSet::zero(), &[4]);
    let events = session.engine_mut().subscribe();

    assert_eq!(session.run(None), Ok(RunOutcome::Halted));
    assert_eq!(outputs(&events), vec![4, 3, 2, 1]);
    assert_eq!(session.state(), SessionState::Halted);
}

#[test]
fn test_countdown_timing() {
    let mut session = load(include_str!("../demos/countdown.r8"), CommandSet::zero(), &[1]);
    session.run(None).unwrap();

    // IN 2, OUT 2, SUB 3, JZ taken 10, HALT 0
    assert_eq!(session.engine().execution_time(), 17);
}

#[test]
fn test_sum_program() {
    let mut session = load(include_str!("../demos/sum.r8"), CommandSet::zero(), &[10, 20, 0xf0, 0]);
    let events = session.engine_mut().subscribe();

    assert_eq!(session.run(None), Ok(RunOutcome::Halted));
    // 10 + 20 + 240 wraps around
    assert_eq!(outputs(&events), vec![14]);
    assert_eq!(session.engine().memory_cell(0x10), Ok(14));
}

#[test]
fn test_sum_cancelled_input() {
    let mut session = load(include_str!("../demos/sum.r8"), CommandSet::zero(), &[5]);
    let events = session.engine_mut().subscribe();

    // Running out of input halts before the total is printed
    assert_eq!(session.run(None), Ok(RunOutcome::Halted));
    assert!(outputs(&events).is_empty());
    assert_eq!(session.engine().memory_cell(0x10), Ok(5));
}

#[test]
fn test_fill_program() {
    let mut session = load(include_str!("../demos/fill.r8"), CommandSet::zero(), &[]);
    let events = session.engine_mut().subscribe();

    assert_eq!(session.run(None), Ok(RunOutcome::Halted));
    let memory = session.engine().memory();
    assert_eq!(&memory[0x20..0x28], &[0xff; 8]);
    assert_eq!(memory[0x1f], 0);
    assert_eq!(memory[0x28], 0);

    let written: Vec<usize> = events
        .try_iter()
        .filter_map(|event| match event {
            EngineEvent::MemoryWritten(index) => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(written, (0x20..0x28).collect::<Vec<_>>());
}

#[test]
fn test_variant_program() {
    let commands = CommandSet::variant(34).unwrap();
    let mut session = load(include_str!("../demos/variant34.r8"), commands, &[0x81]);
    let events = session.engine_mut().subscribe();

    assert_eq!(session.run(None), Ok(RunOutcome::Halted));
    assert_eq!(outputs(&events), vec![0x7e, 0x03]);
}

#[test]
fn test_breakpoint_and_continue() {
    let mut session = load(include_str!("../demos/countdown.r8"), CommandSet::zero(), &[2]);
    let events = session.engine_mut().subscribe();

    // The SUB on line 4
    session.breakpoints_mut().insert(3);
    assert_eq!(session.run(None), Ok(RunOutcome::Breakpoint(3)));
    assert_eq!(outputs(&events), vec![2]);
    assert_eq!(session.current_line(), Some(3));

    assert_eq!(session.run(None), Ok(RunOutcome::Breakpoint(3)));
    assert_eq!(outputs(&events), vec![1]);

    session.breakpoints_mut().clear();
    assert_eq!(session.run(None), Ok(RunOutcome::Halted));
}
