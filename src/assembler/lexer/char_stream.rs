/// A forward-only source of characters that keeps track of the current line.
///
/// The lexer never needs more than the one character under examination.
pub trait CharStream {
    /// Character under examination. Once the stream is exhausted a blank is returned instead.
    fn current_char(&self) -> char;
    /// Moves to the next character, counting lines as newlines are consumed.
    fn advance(&mut self);
    /// `false` once every character has been consumed.
    fn has_current(&self) -> bool;
    /// 0-based line of the character under examination.
    fn current_line(&self) -> usize;
}

/// Streams the characters of a plain string.
#[derive(Debug, Clone)]
pub struct StringCharStream {
    chars: Vec<char>,
    position: usize,
    line: usize,
}

impl StringCharStream {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 0,
        }
    }
}

impl From<&str> for StringCharStream {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl CharStream for StringCharStream {
    fn current_char(&self) -> char {
        self.chars.get(self.position).copied().unwrap_or(' ')
    }

    fn advance(&mut self) {
        if let Some(ch) = self.chars.get(self.position) {
            if *ch == '\n' {
                self.line += 1;
            }
            self.position += 1;
        }
    }

    fn has_current(&self) -> bool {
        self.position < self.chars.len()
    }

    fn current_line(&self) -> usize {
        self.line
    }
}

/// Streams a buffer of text lines, e.g. the lines held by an editor, as if every line ended
/// with `\n`.
#[derive(Debug, Clone)]
pub struct LinesCharStream<'a, S: AsRef<str>> {
    lines: &'a [S],
    line: usize,
    column: usize,
    current: Vec<char>,
}

impl<'a, S: AsRef<str>> LinesCharStream<'a, S> {
    pub fn new(lines: &'a [S]) -> Self {
        Self {
            lines,
            line: 0,
            column: 0,
            current: Self::chars_of(lines, 0),
        }
    }

    fn chars_of(lines: &[S], line: usize) -> Vec<char> {
        lines
            .get(line)
            .map(|text| text.as_ref().chars().collect())
            .unwrap_or_default()
    }
}

impl<'a, S: AsRef<str>> CharStream for LinesCharStream<'a, S> {
    fn current_char(&self) -> char {
        if !self.has_current() {
            return ' ';
        }
        self.current.get(self.column).copied().unwrap_or('\n')
    }

    fn advance(&mut self) {
        if !self.has_current() {
            return;
        }
        self.column += 1;
        // The column one past the last character is the synthetic newline
        if self.column > self.current.len() {
            self.line += 1;
            self.column = 0;
            self.current = Self::chars_of(self.lines, self.line);
        }
    }

    fn has_current(&self) -> bool {
        self.line < self.lines.len()
    }

    fn current_line(&self) -> usize {
        self.line
    }
}
