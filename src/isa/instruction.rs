use std::fmt;

use super::{ArgShape, Opcode, Reference};

/// A single RISC-8 instruction in the form `opcode operand1, operand2, result`.
///
/// Not every opcode uses all three references. Unused ones stay at `Constant(0)`.
#[derive(Debug, Default, Eq, PartialEq, Clone, Copy)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand1: Reference,
    pub operand2: Reference,
    pub result: Reference,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Instruction {
        Instruction {
            opcode,
            ..Default::default()
        }
    }

    pub fn with_references(
        opcode: Opcode,
        operand1: Reference,
        operand2: Reference,
        result: Reference,
    ) -> Instruction {
        Instruction {
            opcode,
            operand1,
            operand2,
            result,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode.arg_shape() {
            ArgShape::None => write!(f, "{}", self.opcode),
            ArgShape::Src => write!(f, "{} {}", self.opcode, self.operand1),
            ArgShape::Dst => write!(f, "{} {}", self.opcode, self.result),
            ArgShape::SrcDst | ArgShape::SrcLabel => {
                write!(f, "{} {}, {}", self.opcode, self.operand1, self.result)
            }
            ArgShape::SrcSrcDst => write!(
                f,
                "{} {}, {}, {}",
                self.opcode, self.operand1, self.operand2, self.result
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let tests = vec![
            (Instruction::new(Opcode::Halt), "HALT"),
            (
                Instruction::with_references(
                    Opcode::Out,
                    Reference::MemoryByConstant(16),
                    Reference::MemoryByConstant(16),
                    Reference::default(),
                ),
                "OUT [16]",
            ),
            (
                Instruction::with_references(
                    Opcode::In,
                    Reference::default(),
                    Reference::default(),
                    Reference::Register(3),
                ),
                "IN r3",
            ),
            (
                Instruction::with_references(
                    Opcode::Add,
                    Reference::Register(0),
                    Reference::Constant(5),
                    Reference::MemoryByRegister(1),
                ),
                "ADD r0, 5, [r1]",
            ),
            (
                Instruction::with_references(
                    Opcode::Jz,
                    Reference::Register(0),
                    Reference::Register(0),
                    Reference::InstructionIndex(2),
                ),
                "JZ r0, @2",
            ),
        ];
        for (ins, expected) in tests {
            assert_eq!(ins.to_string(), expected);
        }
    }
}
