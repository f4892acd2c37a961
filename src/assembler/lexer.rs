use thiserror::Error;

pub use self::char_stream::{CharStream, LinesCharStream, StringCharStream};
pub use self::token::{Token, TokenType};

/// Character sources the lexer reads from.
pub mod char_stream;

/// Token definitions.
pub mod token;

// Example code:
//
//   IN r0
// loop:
//   SUB r0, 1, r0    ; count down
//   OUT r0
//   JZ r0, done
//   ADD 0, 0, r1
//   JZ r1, loop
// done:
//   HALT

// ':' = label suffix, e.g. `loop:`
// '[' ']' = memory reference, e.g. `[16]`, `[r1]`
// '0b' '0o' '0x' = binary, octal and hex prefixes, e.g. `0b1010`, `0o17`, `0xff`
// '0' followed by an octal digit = octal number, e.g. `012`
// ';' = comment, e.g. `; this is a comment`

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unknown token \"{character}\" at line {}", .line + 1)]
    UnknownToken { character: char, line: usize },
}

impl LexError {
    /// 0-based source line of the error.
    pub fn line(&self) -> usize {
        match self {
            LexError::UnknownToken { line, .. } => *line,
        }
    }
}

pub struct Lexer<'a> {
    stream: &'a mut dyn CharStream,
    current_token: Token,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned before the first token. Until [`Lexer::next_token`] is
    /// called the current token is [`TokenType::EndOfSource`].
    pub fn new(stream: &'a mut dyn CharStream) -> Self {
        let line = stream.current_line();
        Self {
            stream,
            current_token: Token::end_of_source(line),
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.current_token
    }

    /// Line of the current token.
    pub fn current_line(&self) -> usize {
        self.current_token.line
    }

    /// Scans the next token and makes it the current one.
    ///
    /// Once the source is exhausted every call yields [`TokenType::EndOfSource`] again.
    pub fn next_token(&mut self) -> Result<&Token, LexError> {
        self.current_token = self.scan(false)?;
        Ok(&self.current_token)
    }

    /// Like [`Lexer::next_token`], but characters that can't start a token are returned as
    /// [`TokenType::Misprint`] tokens instead of failing.
    pub fn next_token_lenient(&mut self) -> &Token {
        // Lenient scanning never reports an unknown character
        self.current_token = self
            .scan(true)
            .unwrap_or_else(|_| Token::end_of_source(self.stream.current_line()));
        &self.current_token
    }

    fn ch(&self) -> char {
        self.stream.current_char()
    }

    fn is_whitespace(ch: char) -> bool {
        matches!(ch, ' ' | '\t' | '\r' | '\n')
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.stream.has_current() {
            match self.ch() {
                ch if Self::is_whitespace(ch) => self.stream.advance(),
                ';' => self.skip_comment(),
                _ => break,
            }
        }
    }

    /// Consumes a comment up to and including the end of the line
    fn skip_comment(&mut self) {
        while self.stream.has_current() && self.ch() != '\n' {
            self.stream.advance();
        }
        self.stream.advance();
    }

    fn single(&mut self, token: TokenType) -> Token {
        let token = Token::new(token, &self.ch().to_string(), 0, self.stream.current_line());
        self.stream.advance();
        token
    }

    fn scan(&mut self, lenient: bool) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();
        let line = self.stream.current_line();
        if !self.stream.has_current() {
            return Ok(Token::end_of_source(line));
        }

        let token = match self.ch() {
            ',' => self.single(TokenType::Comma),
            ':' => self.single(TokenType::Colon),
            '[' => self.single(TokenType::LBracket),
            ']' => self.single(TokenType::RBracket),
            'A'..='Z' | 'a'..='z' | '_' => self.read_identifier(),
            '0'..='9' | '+' | '-' => self.read_number(),
            ch if lenient => {
                tracing::trace!("misprint {:?} at line {}", ch, line);
                self.single(TokenType::Misprint)
            }
            ch => return Err(LexError::UnknownToken { character: ch, line }),
        };
        Ok(token)
    }

    /// Mnemonic, register or label
    fn read_identifier(&mut self) -> Token {
        let line = self.stream.current_line();
        let mut literal = String::new();
        while self.stream.has_current() && (self.ch().is_ascii_alphanumeric() || self.ch() == '_')
        {
            literal.push(self.ch());
            self.stream.advance();
        }
        Token::new(TokenType::Identifier, &literal, 0, line)
    }

    fn read_number(&mut self) -> Token {
        let line = self.stream.current_line();
        let mut literal = String::new();
        let mut negative = false;

        if matches!(self.ch(), '+' | '-') {
            negative = self.ch() == '-';
            literal.push(self.ch());
            self.stream.advance();
            // A lone sign at the very end carries no number
            if !self.stream.has_current() {
                return Token::end_of_source(line);
            }
        }

        if self.ch() != '0' {
            return self.read_digits(literal, negative, 10, line);
        }

        literal.push('0');
        self.stream.advance();
        if !self.stream.has_current() {
            return Token::new(TokenType::Number, &literal, 0, line);
        }

        let base = match self.ch() {
            'b' => 2,
            'o' => 8,
            'x' => 16,
            '0'..='7' => return self.read_digits(literal, negative, 8, line),
            _ => return self.read_digits(literal, negative, 10, line),
        };
        literal.push(self.ch());
        self.stream.advance();
        self.read_digits(literal, negative, base, line)
    }

    /// Accumulates digits of `base`, keeping the value modulo 2^8 in the end
    fn read_digits(&mut self, mut literal: String, negative: bool, base: u32, line: usize) -> Token {
        let mut value: u32 = 0;
        while self.stream.has_current() {
            let ch = self.ch();
            match ch.to_digit(base) {
                Some(digit) => {
                    value = value.wrapping_mul(base).wrapping_add(digit);
                    literal.push(ch);
                    self.stream.advance();
                }
                None => break,
            }
        }
        if negative {
            value = value.wrapping_neg();
        }
        Token::new(TokenType::Number, &literal, value as u8, line)
    }
}

/// Parses a single number using the assembler's number syntax, e.g. `12`, `-1`, `0x0c`,
/// `014`, `0o14` or `0b1100`.
///
/// Returns `None` unless the whole text is exactly one number.
pub fn parse_number(text: &str) -> Option<u8> {
    let mut stream = StringCharStream::new(text);
    let mut lexer = Lexer::new(&mut stream);
    let value = match lexer.next_token() {
        Ok(token) if token.is(TokenType::Number) => token.value,
        _ => return None,
    };
    match lexer.next_token() {
        Ok(token) if token.is(TokenType::EndOfSource) => Some(value),
        _ => None,
    }
}
