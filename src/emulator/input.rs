use std::{
    collections::VecDeque,
    io::{self, BufRead, StdinLock, Stdout, Write},
};

use crate::assembler::lexer::parse_number;

/// Source of bytes for the `IN` instruction.
///
/// After every call to [`InputPort::input`] the caller checks [`InputPort::is_failure`]. A
/// failure means the source declined to provide a value, and the returned byte is meaningless.
pub trait InputPort {
    fn input(&mut self) -> u8;
    fn is_failure(&self) -> bool;
}

/// Yields pre-supplied bytes in order and fails once they run out.
#[derive(Debug, Default, Clone)]
pub struct QueuedInput {
    values: VecDeque<u8>,
    failure: bool,
}

impl QueuedInput {
    pub fn new(values: impl IntoIterator<Item = u8>) -> Self {
        Self {
            values: values.into_iter().collect(),
            failure: false,
        }
    }
}

impl InputPort for QueuedInput {
    fn input(&mut self) -> u8 {
        match self.values.pop_front() {
            Some(value) => {
                self.failure = false;
                value
            }
            None => {
                self.failure = true;
                0
            }
        }
    }

    fn is_failure(&self) -> bool {
        self.failure
    }
}

const PROMPT: &str = "in> ";

const FORMAT_HELP: &str = "You can input a number in
 - decimal (10)
 - hex (0xA)
 - oct (012 or 0o12)
 - bin (0b1010)
An empty line cancels the input and halts the machine.";

/// Asks for every byte on a text stream, e.g. a terminal.
///
/// Lines are read with the assembler's number syntax. An empty line or the end of the stream
/// cancels, and a malformed number is asked for again.
pub struct PromptInput<R, W> {
    reader: R,
    writer: W,
    failure: bool,
}

impl<R: BufRead, W: Write> PromptInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            failure: false,
        }
    }

    fn prompt(&mut self) -> io::Result<Option<u8>> {
        loop {
            write!(self.writer, "{}", PROMPT)?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let text = line.trim();
            if text.is_empty() {
                return Ok(None);
            }
            match parse_number(text) {
                Some(value) => return Ok(Some(value)),
                None => writeln!(self.writer, "{}", FORMAT_HELP)?,
            }
        }
    }
}

impl PromptInput<StdinLock<'static>, Stdout> {
    /// Prompts on standard output and reads standard input.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> InputPort for PromptInput<R, W> {
    fn input(&mut self) -> u8 {
        match self.prompt() {
            Ok(Some(value)) => {
                self.failure = false;
                value
            }
            Ok(None) => {
                self.failure = true;
                0
            }
            Err(err) => {
                tracing::warn!("input failed: {}", err);
                self.failure = true;
                0
            }
        }
    }

    fn is_failure(&self) -> bool {
        self.failure
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_queued_input() {
        let mut input = QueuedInput::new([1, 2, 3]);
        assert_eq!(input.input(), 1);
        assert!(!input.is_failure());
        assert_eq!(input.input(), 2);
        assert_eq!(input.input(), 3);
        assert!(!input.is_failure());
        input.input();
        assert!(input.is_failure());

        // A new value clears the failure
        input.push(9);
        assert_eq!(input.input(), 9);
        assert!(!input.is_failure());
    }

    #[test]
    fn test_prompt_input() {
        let reader = Cursor::new("0x1f\nbad\n-1\n\n");
        let mut output = Vec::new();
        {
            let mut input = PromptInput::new(reader, &mut output);
            assert_eq!(input.input(), 0x1f);
            assert!(!input.is_failure());
            // The malformed line is asked for again
            assert_eq!(input.input(), 255);
            assert!(!input.is_failure());
            input.input();
            assert!(input.is_failure());
            // End of input also cancels
            input.input();
            assert!(input.is_failure());
        }
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches(PROMPT).count(), 5);
        assert!(output.contains("hex (0xA)"));
    }
}
