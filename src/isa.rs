pub mod instruction;
pub mod opcode;
pub mod program;
pub mod reference;

pub use instruction::Instruction;
pub use opcode::{ArgShape, Opcode};
pub use program::Program;
pub use reference::Reference;
