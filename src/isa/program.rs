use super::{Instruction, Opcode};

/// An ordered sequence of instructions.
///
/// Instructions are only ever appended, but a slot can be rewritten in place so that the
/// compiler can patch jump targets after all labels are known.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the instruction at `index`.
    ///
    /// Reading past the end yields a synthetic `HALT`, so stepping a halted or empty machine is
    /// always safe.
    pub fn instruction(&self, index: usize) -> Instruction {
        self.instructions
            .get(index)
            .copied()
            .unwrap_or_else(|| Instruction::new(Opcode::Halt))
    }

    /// Appends an instruction and returns its index.
    pub fn push(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Instruction> {
        self.instructions.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Program { instructions }
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Program {
            instructions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Reference;

    #[test]
    fn test_past_end_is_halt() {
        let mut program = Program::new();
        assert_eq!(program.instruction(0), Instruction::new(Opcode::Halt));

        let index = program.push(Instruction::new(Opcode::Out));
        assert_eq!(index, 0);
        assert_eq!(program.instruction(0).opcode, Opcode::Out);
        assert_eq!(program.instruction(1).opcode, Opcode::Halt);
        assert_eq!(program.instruction(usize::MAX).opcode, Opcode::Halt);
    }

    #[test]
    fn test_patch_in_place() {
        let mut program = Program::from(vec![
            Instruction::new(Opcode::Jz),
            Instruction::new(Opcode::Halt),
        ]);
        if let Some(ins) = program.get_mut(0) {
            ins.result = Reference::InstructionIndex(1);
        }
        assert_eq!(program.instruction(0).result, Reference::InstructionIndex(1));
        assert!(program.get_mut(2).is_none());
        assert_eq!(program.len(), 2);
    }
}
