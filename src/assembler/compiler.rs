use thiserror::Error;

use self::labels::LabelTable;
use super::lexer::{CharStream, Lexer, Token, TokenType};
use super::AssemblerError;
use crate::isa::{ArgShape, Instruction, Opcode, Program, Reference};

pub use self::assembly::{Assembly, SourceMap};
pub use self::command_set::{CommandDescriptor, CommandSet, VARIANT_COUNT};

/// Compiled program together with its source-line map.
mod assembly;

/// Legal mnemonics and the command-set variants.
pub mod command_set;

/// Label definitions and backpatching of jumps.
mod labels;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Bad expression \"{text}\" at line {}", .line + 1)]
    BadExpression { text: String, line: usize },
    #[error("Unresolved label \"{label}\" at line {}", .line + 1)]
    UnresolvedLabel { label: String, line: usize },
    #[error("Comma expected at line {}", .line + 1)]
    CommaExpected { line: usize },
    #[error("Label \"{label}\" is already defined, at line {}", .line + 1)]
    LabelRedefinition { label: String, line: usize },
    #[error("Undefined command \"{command}\" at line {}", .line + 1)]
    UndefinedCommand { command: String, line: usize },
    #[error("Bad reference \"{text}\" at line {}", .line + 1)]
    BadReference { text: String, line: usize },
    #[error("Reference expected, found \"{text}\" at line {}", .line + 1)]
    ReferenceExpected { text: String, line: usize },
    #[error("\"]\" expected, found \"{text}\" at line {}", .line + 1)]
    RbraceExpected { text: String, line: usize },
    #[error("Label expected, found \"{text}\" at line {}", .line + 1)]
    LabelExpected { text: String, line: usize },
    #[error("Register expected, found \"{text}\" at line {}", .line + 1)]
    RegisterExpected { text: String, line: usize },
}

impl CompileError {
    /// 0-based source line of the error.
    pub fn line(&self) -> usize {
        match self {
            CompileError::BadExpression { line, .. }
            | CompileError::UnresolvedLabel { line, .. }
            | CompileError::CommaExpected { line }
            | CompileError::LabelRedefinition { line, .. }
            | CompileError::UndefinedCommand { line, .. }
            | CompileError::BadReference { line, .. }
            | CompileError::ReferenceExpected { line, .. }
            | CompileError::RbraceExpected { line, .. }
            | CompileError::LabelExpected { line, .. }
            | CompileError::RegisterExpected { line, .. } => *line,
        }
    }

    /// The offending token text or name, if the error has one.
    pub fn text(&self) -> Option<&str> {
        match self {
            CompileError::CommaExpected { .. } => None,
            CompileError::BadExpression { text, .. }
            | CompileError::BadReference { text, .. }
            | CompileError::ReferenceExpected { text, .. }
            | CompileError::RbraceExpected { text, .. }
            | CompileError::LabelExpected { text, .. }
            | CompileError::RegisterExpected { text, .. } => Some(text),
            CompileError::UnresolvedLabel { label, .. }
            | CompileError::LabelRedefinition { label, .. } => Some(label),
            CompileError::UndefinedCommand { command, .. } => Some(command),
        }
    }
}

/// Single-pass assembler for RISC-8 source.
///
/// Only the mnemonics in the configured [`CommandSet`] compile. The set can be changed between
/// compilations through [`Compiler::commands_mut`].
#[derive(Debug, Clone)]
pub struct Compiler {
    commands: CommandSet,
}

impl Default for Compiler {
    fn default() -> Compiler {
        Compiler::new(CommandSet::zero())
    }
}

impl Compiler {
    pub fn new(commands: CommandSet) -> Compiler {
        Compiler { commands }
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandSet {
        &mut self.commands
    }

    /// Compiles everything the stream yields.
    ///
    /// Labels may be used before they are defined. On failure nothing is produced and the error
    /// carries the 0-based line it was found on.
    #[tracing::instrument(skip_all)]
    pub fn compile(&self, stream: &mut dyn CharStream) -> Result<Assembly, AssemblerError> {
        let mut pass = Pass {
            commands: &self.commands,
            lexer: Lexer::new(stream),
            program: Program::new(),
            labels: LabelTable::new(),
            source_map: SourceMap::new(),
            last_line: 0,
        };
        pass.run()?;

        tracing::debug!("compiled {} instructions", pass.program.len());
        Ok(Assembly::new(pass.program, pass.source_map))
    }
}

/// State of one compilation, dropped when it ends.
struct Pass<'c, 's> {
    commands: &'c CommandSet,
    lexer: Lexer<'s>,
    program: Program,
    labels: LabelTable,
    source_map: SourceMap,
    /// Line of the last token taken before the current one
    last_line: usize,
}

impl<'c, 's> Pass<'c, 's> {
    fn run(&mut self) -> Result<(), AssemblerError> {
        self.next_token()?;
        loop {
            match self.token().token {
                TokenType::EndOfSource => break,
                TokenType::Identifier => {
                    let id = self.token().clone();
                    self.next_token()?;
                    if self.token().is(TokenType::Colon) {
                        self.compile_label(&id)?;
                    } else {
                        self.source_map.record(self.program.len(), id.line);
                        self.compile_command(&id)?;
                    }
                }
                _ => {
                    return Err(CompileError::BadExpression {
                        text: self.token().literal.clone(),
                        line: self.line(),
                    }
                    .into())
                }
            }
        }
        self.resolve_references()
    }

    fn token(&self) -> &Token {
        self.lexer.current_token()
    }

    /// Line to blame for an error at the current token.
    ///
    /// The end of source lies past the last line, so errors there go to the last token read.
    fn line(&self) -> usize {
        if self.token().is(TokenType::EndOfSource) {
            self.last_line
        } else {
            self.lexer.current_line()
        }
    }

    fn next_token(&mut self) -> Result<(), AssemblerError> {
        if !self.token().is(TokenType::EndOfSource) {
            self.last_line = self.token().line;
        }
        self.lexer.next_token()?;
        Ok(())
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        self.labels.resolve(&mut self.program).map_err(|unresolved| {
            CompileError::UnresolvedLabel {
                line: self.source_map.line_for(unresolved.index).unwrap_or(0),
                label: unresolved.label,
            }
            .into()
        })
    }

    fn skip_comma(&mut self) -> Result<(), AssemblerError> {
        if !self.token().is(TokenType::Comma) {
            return Err(CompileError::CommaExpected { line: self.line() }.into());
        }
        self.next_token()
    }

    /// Consumes the colon and points the label at the next instruction
    fn compile_label(&mut self, id: &Token) -> Result<(), AssemblerError> {
        if self.labels.is_defined(&id.literal) {
            return Err(CompileError::LabelRedefinition {
                label: id.literal.clone(),
                line: id.line,
            }
            .into());
        }
        self.labels.define(&id.literal, self.program.len());
        self.next_token()
    }

    fn compile_command(&mut self, id: &Token) -> Result<(), AssemblerError> {
        let descriptor =
            self.commands
                .get(&id.literal)
                .ok_or_else(|| CompileError::UndefinedCommand {
                    command: id.literal.clone(),
                    line: id.line,
                })?;
        tracing::trace!("{} -> {:?}", id.literal, descriptor);

        let opcode: Opcode = descriptor.opcode;
        let instruction = match descriptor.shape {
            ArgShape::None => Instruction::new(opcode),
            ArgShape::Src => {
                let src = self.compile_src()?;
                Instruction::with_references(opcode, src, src, Reference::default())
            }
            ArgShape::Dst => {
                let dst = self.compile_dst()?;
                Instruction::with_references(opcode, Reference::default(), Reference::default(), dst)
            }
            ArgShape::SrcDst => {
                let src = self.compile_src()?;
                self.skip_comma()?;
                let dst = self.compile_dst()?;
                Instruction::with_references(opcode, src, src, dst)
            }
            ArgShape::SrcSrcDst => {
                let src1 = self.compile_src()?;
                self.skip_comma()?;
                let src2 = self.compile_src()?;
                self.skip_comma()?;
                let dst = self.compile_dst()?;
                Instruction::with_references(opcode, src1, src2, dst)
            }
            ArgShape::SrcLabel => {
                let src = self.compile_src()?;
                self.skip_comma()?;
                let label = self.compile_label_reference()?;
                Instruction::with_references(opcode, src, src, label)
            }
        };
        self.program.push(instruction);
        Ok(())
    }

    /// Register, constant, or memory reference
    fn compile_src(&mut self) -> Result<Reference, AssemblerError> {
        if self.token().is(TokenType::Number) {
            let reference = Reference::Constant(self.token().value);
            self.next_token()?;
            return Ok(reference);
        }
        self.compile_dst()
    }

    /// Register or memory reference
    fn compile_dst(&mut self) -> Result<Reference, AssemblerError> {
        match self.token().token {
            TokenType::Identifier => {
                let reference = Reference::Register(self.register_index()?);
                self.next_token()?;
                Ok(reference)
            }
            TokenType::LBracket => {
                self.next_token()?;
                let reference = match self.token().token {
                    TokenType::Identifier => Reference::MemoryByRegister(self.register_index()?),
                    TokenType::Number => Reference::MemoryByConstant(self.token().value),
                    _ => {
                        return Err(CompileError::BadReference {
                            text: self.token().literal.clone(),
                            line: self.line(),
                        }
                        .into())
                    }
                };
                self.next_token()?;
                if !self.token().is(TokenType::RBracket) {
                    return Err(CompileError::RbraceExpected {
                        text: self.token().literal.clone(),
                        line: self.line(),
                    }
                    .into());
                }
                self.next_token()?;
                Ok(reference)
            }
            _ => Err(CompileError::ReferenceExpected {
                text: self.token().literal.clone(),
                line: self.line(),
            }
            .into()),
        }
    }

    /// Leaves a placeholder target that is patched once all labels are known
    fn compile_label_reference(&mut self) -> Result<Reference, AssemblerError> {
        if !self.token().is(TokenType::Identifier) {
            return Err(CompileError::LabelExpected {
                text: self.token().literal.clone(),
                line: self.line(),
            }
            .into());
        }
        let name = self.token().literal.clone();
        self.labels.refer(&name, self.program.len());
        self.next_token()?;
        Ok(Reference::InstructionIndex(0))
    }

    /// Index of the register named by the current token, `r0` to `r7` in either case
    fn register_index(&self) -> Result<u8, CompileError> {
        let text = &self.token().literal;
        let mut chars = text.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('r' | 'R'), Some(digit @ '0'..='7'), None) => Ok(digit as u8 - b'0'),
            _ => Err(CompileError::RegisterExpected {
                text: text.clone(),
                line: self.line(),
            }),
        }
    }
}
