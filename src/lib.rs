/// Instruction set of the RISC-8 machine: opcodes, operand references and programs.
pub mod isa;

/// Transforms RISC-8 assembly code into a program.
///
/// The steps are:
/// 1. **Lexing** - converting a character stream into tokens
/// 2. **Compiling** - converting tokens into instructions in a single pass, recording jump
///    targets for labels that are not defined yet
/// 3. **Resolving** - patching every recorded jump once all labels are known
pub mod assembler;

/// RISC-8 virtual machine, debugging session and terminal debugger
pub mod emulator;

/// Hexdump utility
pub mod hexdump;

/// Tracing setup for the binary
pub mod instrumentation;
