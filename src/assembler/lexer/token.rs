/// TokenType defines the types of tokens that are found in source code.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    /// Mnemonic, register name or label.
    ///
    /// Anything that starts with a letter or underscore.
    Identifier,
    /// Numeric literal, e.g. `12`, `-1`, `0x0c`, `014`, `0b1100`
    Number,
    /// `,`
    Comma,
    /// `:` Label suffix character
    Colon,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// EndOfSource marks the end of the character stream
    EndOfSource,
    /// A character that can't start any token. Only produced when lexing leniently.
    Misprint,
}

impl Default for TokenType {
    fn default() -> Self {
        Self::EndOfSource
    }
}

/// Token is a lexical unit of source code.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Token {
    /// Type of Token
    pub token: TokenType,
    /// Literal string of token, e.g. `"ADD"`, `"0x0c"`, `":"` etc.
    pub literal: String,
    /// Byte value of a [`TokenType::Number`], zero for every other type
    pub value: u8,
    /// 0-based line where the token is found
    pub line: usize,
}

impl Token {
    pub fn new(token: TokenType, literal: &str, value: u8, line: usize) -> Self {
        Self {
            token,
            literal: literal.to_owned(),
            value,
            line,
        }
    }

    pub fn end_of_source(line: usize) -> Self {
        Self::new(TokenType::EndOfSource, "eos", 0, line)
    }

    pub fn is(&self, token: TokenType) -> bool {
        self.token == token
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?} '{}'", self.line + 1, self.token, self.literal)
    }
}
