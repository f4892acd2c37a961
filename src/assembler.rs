use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use self::compiler::{Assembly, CommandSet, Compiler, VARIANT_COUNT};
use self::lexer::StringCharStream;

/// Lexes code into tokens.
///
/// Converts a character stream into tokens. For example, the line `ADD r0, 0x10, [r1]` is
/// converted into the following tokens:
///
/// ```text
/// [
///     Token { token: Identifier, literal: "ADD", value: 0, line: 0 },
///     Token { token: Identifier, literal: "r0", value: 0, line: 0 },
///     Token { token: Comma, literal: ",", value: 0, line: 0 },
///     Token { token: Number, literal: "0x10", value: 16, line: 0 },
///     Token { token: Comma, literal: ",", value: 0, line: 0 },
///     Token { token: LBracket, literal: "[", value: 0, line: 0 },
///     Token { token: Identifier, literal: "r1", value: 0, line: 0 },
///     Token { token: RBracket, literal: "]", value: 0, line: 0 },
///     Token { token: EndOfSource, literal: "eos", value: 0, line: 0 },
/// ]
/// ```
pub mod lexer;

/// Compiles tokens into a program in a single pass, patching jumps once all labels are known.
pub mod compiler;

/// Human readable listing of a compiled program.
pub mod listing;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblerError {
    #[error("{0}")]
    Lex(#[from] lexer::LexError),
    #[error("{0}")]
    Compile(#[from] compiler::CompileError),
}

impl AssemblerError {
    /// 0-based source line of the error.
    pub fn line(&self) -> usize {
        match self {
            AssemblerError::Lex(err) => err.line(),
            AssemblerError::Compile(err) => err.line(),
        }
    }
}

/// Utility function for compiling a source string with the given command set.
#[tracing::instrument(skip(commands))]
pub fn compile_code(input: &str, commands: &CommandSet) -> Result<Assembly, AssemblerError> {
    let mut stream = StringCharStream::new(input);
    Compiler::new(commands.clone()).compile(&mut stream)
}

#[derive(Args, Debug, Clone)]
pub struct CommandSetArgs {
    #[clap(short, long, default_value_t = 0)]
    #[clap(help = "Command set variant")]
    #[clap(long_help = "Command set variant. 0 is the zero set with every kind of operation,
1 to 48 select one shift, one logic group, one arithmetic and one jump command.")]
    pub variant: usize,
}

impl CommandSetArgs {
    pub fn command_set(&self) -> Result<CommandSet> {
        CommandSet::variant(self.variant).with_context(|| {
            format!(
                "No command set variant {}, expected 0 to {}",
                self.variant,
                VARIANT_COUNT - 1
            )
        })
    }
}

#[derive(Args, Debug)]
pub struct AssemblyArgs {
    #[clap(help = "Source file")]
    pub input: PathBuf,
    #[command(flatten)]
    pub commands: CommandSetArgs,
}

/// Reads a source file and compiles it.
pub fn read_and_compile(input: &Path, commands: &CommandSet) -> Result<Assembly> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("Unable to read file {}", input.display()))?;
    let assembly = compile_code(&source, commands)
        .with_context(|| format!("Compilation of {} failed", input.display()))?;
    Ok(assembly)
}

/// Compiles a file and prints its listing.
pub fn assemble(args: &AssemblyArgs) -> Result<()> {
    let commands = args.commands.command_set()?;
    let assembly = read_and_compile(&args.input, &commands)?;
    print!("{}", listing::generate(&assembly));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_code() {
        let assembly = compile_code("IN r0\nOUT r0\nHALT", &CommandSet::zero()).unwrap();
        assert_eq!(assembly.program.len(), 3);
    }

    #[test]
    fn test_error_lines() {
        let err = compile_code("HALT\n\n  #", &CommandSet::zero()).unwrap_err();
        assert_eq!(err.line(), 2);
        assert_eq!(err.to_string(), "Unknown token \"#\" at line 3");

        let err = compile_code("ROL r0, 1, r0", &CommandSet::variant(1).unwrap()).unwrap_err();
        assert_eq!(err.line(), 0);
        assert_eq!(err.to_string(), "Undefined command \"ROL\" at line 1");
    }

    #[test]
    fn test_command_set_args() {
        let args = CommandSetArgs { variant: 48 };
        assert!(args.command_set().is_ok());
        let args = CommandSetArgs { variant: 49 };
        assert!(args.command_set().is_err());
    }
}
