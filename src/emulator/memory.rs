/// Number of general purpose registers, `r0` to `r7`.
pub const REGISTER_COUNT: usize = 8;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = u8::MAX as usize + 1;

/// A fixed number of byte cells, zeroed on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank<const SIZE: usize> {
    cells: [u8; SIZE],
}

/// The register file.
pub type Registers = Bank<REGISTER_COUNT>;

/// The data memory.
pub type Memory = Bank<MEMORY_SIZE>;

impl<const SIZE: usize> Bank<SIZE> {
    pub fn new() -> Self {
        Self { cells: [0; SIZE] }
    }

    /// Reads a cell, `None` if `index` is outside the bank.
    pub fn read(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied()
    }

    /// Mutable access to a cell, `None` if `index` is outside the bank.
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut u8> {
        self.cells.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        SIZE
    }

    pub fn is_empty(&self) -> bool {
        SIZE == 0
    }
}

impl<const SIZE: usize> Default for Bank<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_bounds() {
        let mut registers = Registers::new();
        assert_eq!(registers.len(), 8);
        assert_eq!(registers.read(7), Some(0));
        assert_eq!(registers.read(8), None);
        assert!(registers.cell_mut(8).is_none());

        if let Some(cell) = registers.cell_mut(3) {
            *cell = 0x42;
        }
        assert_eq!(registers.read(3), Some(0x42));
        registers.clear();
        assert_eq!(registers.as_slice(), &[0; 8]);
    }

    #[test]
    fn test_memory_is_byte_addressed() {
        let mut memory = Memory::new();
        assert_eq!(memory.len(), 256);
        assert_eq!(MEMORY_SIZE, 256);
        for address in [0u8, 0x7f, u8::MAX] {
            assert!(memory.cell_mut(address as usize).is_some());
        }
        assert_eq!(memory.read(256), None);
    }
}
