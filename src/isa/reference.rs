use std::fmt;

/// Where an instruction reads an operand from or writes its result to.
///
/// The meaning of the payload depends on the variant: a literal byte, a register index, a memory
/// address, or an index into the [`Program`][super::Program].
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum Reference {
    /// `12`, `0x0c`, `-1`
    Constant(u8),
    /// `r0`..`r7`
    Register(u8),
    /// `[12]`
    MemoryByConstant(u8),
    /// `[r1]`
    MemoryByRegister(u8),
    /// Jump target, baked in by the compiler once labels are resolved.
    InstructionIndex(usize),
}

impl Default for Reference {
    fn default() -> Self {
        Reference::Constant(0)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Constant(value) => write!(f, "{}", value),
            Reference::Register(index) => write!(f, "r{}", index),
            Reference::MemoryByConstant(address) => write!(f, "[{}]", address),
            Reference::MemoryByRegister(index) => write!(f, "[r{}]", index),
            Reference::InstructionIndex(index) => write!(f, "@{}", index),
        }
    }
}
