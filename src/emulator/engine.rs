use std::{fmt, sync::mpsc};

use thiserror::Error;

use super::{
    event::EngineEvent,
    input::InputPort,
    memory::{Memory, Registers},
};
use crate::isa::{Instruction, Opcode, Program, Reference};

pub const REGISTER_ACCESS_TIME: u64 = 1;
pub const MEMORY_ACCESS_TIME: u64 = 8;
pub const CONSTANT_ACCESS_TIME: u64 = 0;
/// Charged once for every executed instruction except `HALT` and a cancelled `IN`.
pub const OPERATION_TIME: u64 = 1;
/// Charged on top of the operation time when a conditional jump is taken.
pub const JUMP_TIME: u64 = 8;

/// Runtime faults. They mean the program breaks an invariant the compiler guarantees, so the
/// machine should not go on after one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Incorrect register index {0}")]
    InvalidRegister(usize),
    #[error("Incorrect memory index {0}")]
    InvalidMemoryCell(usize),
    #[error("Bad reference for operand: {0}")]
    BadOperandReference(Reference),
    #[error("Bad reference for result: {0}")]
    BadResultReference(Reference),
    #[error("It is not a label reference: {0}")]
    NotALabelReference(Reference),
    #[error("No input port connected")]
    NoInputPort,
}

/// The RISC-8 virtual machine.
///
/// Executes a [`Program`] one instruction at a time against eight registers and 256 memory
/// cells while counting execution time. State changes are published as [`EngineEvent`]s to
/// every receiver handed out by [`Engine::subscribe`].
#[derive(Default)]
pub struct Engine {
    registers: Registers,
    memory: Memory,
    program: Program,
    input: Option<Box<dyn InputPort>>,
    /// Instruction pointer, equal to the program length when halted
    ip: usize,
    execution_time: u64,
    subscribers: Vec<mpsc::Sender<EngineEvent>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registers", &self.registers)
            .field("ip", &self.ip)
            .field("execution_time", &self.execution_time)
            .field("program_len", &self.program.len())
            .field("has_input", &self.input.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes registers, memory, instruction pointer and execution time.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        self.registers.clear();
        self.memory.clear();
        self.ip = 0;
        self.execution_time = 0;
        self.publish(EngineEvent::Reset);
    }

    /// Replaces the program and resets the machine.
    #[tracing::instrument(skip_all, fields(len = program.len()))]
    pub fn set_program(&mut self, program: Program) {
        self.program = program;
        self.reset();
    }

    pub fn set_input_port(&mut self, port: Box<dyn InputPort>) {
        self.input = Some(port);
    }

    /// Returns a receiver for every event published from now on.
    pub fn subscribe(&mut self) -> mpsc::Receiver<EngineEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn execution_time(&self) -> u64 {
        self.execution_time
    }

    pub fn is_halted(&self) -> bool {
        self.ip >= self.program.len()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn registers(&self) -> &[u8] {
        self.registers.as_slice()
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn register(&self, index: usize) -> Result<u8, EngineError> {
        self.registers
            .read(index)
            .ok_or(EngineError::InvalidRegister(index))
    }

    pub fn memory_cell(&self, index: usize) -> Result<u8, EngineError> {
        self.memory
            .read(index)
            .ok_or(EngineError::InvalidMemoryCell(index))
    }

    /// Moves to the halted position and tells the observers.
    pub fn halt(&mut self) {
        self.ip = self.program.len();
        self.publish(EngineEvent::Halt);
    }

    /// Executes the instruction at the instruction pointer.
    ///
    /// Stepping a halted machine executes the implicit trailing `HALT` again.
    #[tracing::instrument(skip(self), fields(ip = self.ip))]
    pub fn step(&mut self) -> Result<(), EngineError> {
        let ins = self.program.instruction(self.ip);
        tracing::trace!("{}", ins);

        match ins.opcode {
            Opcode::Halt => {
                self.halt();
                return Ok(());
            }
            Opcode::In => {
                if !self.read_input(ins.result)? {
                    return Ok(());
                }
                self.go_to_next_instruction();
            }
            Opcode::Out => {
                let value = self.operand(ins.operand1)?;
                self.publish(EngineEvent::Output(value));
                self.go_to_next_instruction();
            }
            Opcode::Ror => self.binary(&ins, |x, n| x.rotate_right(u32::from(n % 8)))?,
            Opcode::Rol => self.binary(&ins, |x, n| x.rotate_left(u32::from(n % 8)))?,
            Opcode::Not => {
                let x = self.operand(ins.operand1)?;
                self.set_result(ins.result, !x)?;
                self.go_to_next_instruction();
            }
            Opcode::Or => self.binary(&ins, |x, y| x | y)?,
            Opcode::And => self.binary(&ins, |x, y| x & y)?,
            Opcode::Nor => self.binary(&ins, |x, y| !(x | y))?,
            Opcode::Nand => self.binary(&ins, |x, y| !(x & y))?,
            Opcode::Xor => self.binary(&ins, |x, y| x ^ y)?,
            Opcode::Add => self.binary(&ins, |x, y| x.wrapping_add(y))?,
            Opcode::Sub => self.binary(&ins, |x, y| x.wrapping_add(!y).wrapping_add(1))?,
            Opcode::Jz => self.jump_if(&ins, |x| x == 0x00)?,
            Opcode::Jo => self.jump_if(&ins, |x| x == 0xFF)?,
        }

        self.update_execution_time(OPERATION_TIME);
        Ok(())
    }

    fn publish(&mut self, event: EngineEvent) {
        tracing::trace!("{:?}", event);
        self.subscribers.retain(|sender| sender.send(event).is_ok());
    }

    fn update_execution_time(&mut self, time: u64) {
        self.execution_time += time;
    }

    fn go_to_next_instruction(&mut self) {
        self.ip += 1;
    }

    /// `dst := f(src1, src2)`
    fn binary(&mut self, ins: &Instruction, f: fn(u8, u8) -> u8) -> Result<(), EngineError> {
        let x = self.operand(ins.operand1)?;
        let y = self.operand(ins.operand2)?;
        self.set_result(ins.result, f(x, y))?;
        self.go_to_next_instruction();
        Ok(())
    }

    fn jump_if(&mut self, ins: &Instruction, condition: fn(u8) -> bool) -> Result<(), EngineError> {
        let x = self.operand(ins.operand1)?;
        if condition(x) {
            self.ip = Self::target(ins.result)?;
            self.update_execution_time(JUMP_TIME);
        } else {
            self.go_to_next_instruction();
        }
        Ok(())
    }

    /// Returns `false` if the port declined, in which case the machine is halted
    fn read_input(&mut self, result: Reference) -> Result<bool, EngineError> {
        let port = self.input.as_mut().ok_or(EngineError::NoInputPort)?;
        let value = port.input();
        if port.is_failure() {
            tracing::debug!("input cancelled");
            self.halt();
            return Ok(false);
        }
        self.set_result(result, value)?;
        Ok(true)
    }

    fn target(reference: Reference) -> Result<usize, EngineError> {
        match reference {
            Reference::InstructionIndex(index) => Ok(index),
            _ => Err(EngineError::NotALabelReference(reference)),
        }
    }

    fn operand(&mut self, reference: Reference) -> Result<u8, EngineError> {
        match reference {
            Reference::Constant(value) => {
                self.update_execution_time(CONSTANT_ACCESS_TIME);
                Ok(value)
            }
            Reference::Register(index) => {
                self.update_execution_time(REGISTER_ACCESS_TIME);
                self.register(index as usize)
            }
            Reference::MemoryByConstant(address) => {
                self.update_execution_time(MEMORY_ACCESS_TIME);
                self.memory_cell(address as usize)
            }
            Reference::MemoryByRegister(index) => {
                self.update_execution_time(REGISTER_ACCESS_TIME + MEMORY_ACCESS_TIME);
                let address = self.register(index as usize)?;
                self.memory_cell(address as usize)
            }
            Reference::InstructionIndex(_) => Err(EngineError::BadOperandReference(reference)),
        }
    }

    fn set_result(&mut self, reference: Reference, value: u8) -> Result<(), EngineError> {
        match reference {
            Reference::Register(index) => {
                self.update_execution_time(REGISTER_ACCESS_TIME);
                self.set_register(index as usize, value)
            }
            Reference::MemoryByConstant(address) => {
                self.update_execution_time(MEMORY_ACCESS_TIME);
                self.set_memory_cell(address as usize, value)
            }
            Reference::MemoryByRegister(index) => {
                self.update_execution_time(REGISTER_ACCESS_TIME + MEMORY_ACCESS_TIME);
                let address = self.register(index as usize)?;
                self.set_memory_cell(address as usize, value)
            }
            Reference::Constant(_) | Reference::InstructionIndex(_) => {
                Err(EngineError::BadResultReference(reference))
            }
        }
    }

    fn set_register(&mut self, index: usize, value: u8) -> Result<(), EngineError> {
        let cell = self
            .registers
            .cell_mut(index)
            .ok_or(EngineError::InvalidRegister(index))?;
        *cell = value;
        self.publish(EngineEvent::RegisterWritten(index));
        Ok(())
    }

    fn set_memory_cell(&mut self, index: usize, value: u8) -> Result<(), EngineError> {
        let cell = self
            .memory
            .cell_mut(index)
            .ok_or(EngineError::InvalidMemoryCell(index))?;
        *cell = value;
        self.publish(EngineEvent::MemoryWritten(index));
        Ok(())
    }
}
