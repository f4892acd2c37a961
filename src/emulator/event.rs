/// State changes published by the [`Engine`](super::engine::Engine).
///
/// Events carry indices rather than values. Observers read the current value back from the
/// engine when they need it. Within one step writes are published before an output or a halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Registers, memory, instruction pointer and execution time were zeroed.
    Reset,
    /// The machine stopped, either by `HALT` or by a cancelled input.
    Halt,
    /// `OUT` produced a byte.
    Output(u8),
    /// A register was written.
    RegisterWritten(usize),
    /// A memory cell was written.
    MemoryWritten(usize),
}
