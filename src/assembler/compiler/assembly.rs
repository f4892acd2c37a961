use std::ops::RangeInclusive;

use crate::isa::Program;

/// Source line of every compiled instruction, indexed by instruction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceMap {
    lines: Vec<usize>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the instruction at `index` was produced by source `line`.
    pub fn record(&mut self, index: usize, line: usize) {
        if index < self.lines.len() {
            self.lines[index] = line;
        } else {
            self.lines.resize(index + 1, line);
        }
    }

    /// 0-based source line of the instruction at `index`.
    pub fn line_for(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The result of a successful compilation: the program and where each instruction came from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub program: Program,
    pub source_map: SourceMap,
}

impl Assembly {
    pub fn new(program: Program, source_map: SourceMap) -> Self {
        Self {
            program,
            source_map,
        }
    }

    /// 0-based source line of the instruction at `ip`, `None` past the end of the program.
    pub fn source_line_for(&self, ip: usize) -> Option<usize> {
        self.source_map.line_for(ip)
    }

    /// Source lines whose breakpoints stop execution before the instruction at `ip` runs.
    ///
    /// This is the instruction's own line plus any lines between it and the line of the next
    /// instruction, so a breakpoint on a blank line or a label stops at the instruction below.
    /// When several instructions share a line only that line is covered.
    pub fn breakpoint_lines(&self, ip: usize) -> Option<RangeInclusive<usize>> {
        let current = self.source_line_for(ip)?;
        match self.source_line_for(ip + 1) {
            Some(next) if next > current => Some(current..=next - 1),
            _ => Some(current..=current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn assembly(lines: &[usize]) -> Assembly {
        let mut source_map = SourceMap::new();
        for (index, line) in lines.iter().enumerate() {
            source_map.record(index, *line);
        }
        Assembly::new(Program::new(), source_map)
    }

    #[test]
    fn test_source_lines() {
        let assembly = assembly(&[0, 2, 2, 5]);
        assert_eq!(assembly.source_line_for(1), Some(2));
        assert_eq!(assembly.source_line_for(4), None);
    }

    #[test]
    fn test_breakpoint_lines() {
        let assembly = assembly(&[0, 2, 2, 5]);
        assert_eq!(assembly.breakpoint_lines(0), Some(0..=1));
        // Shares its line with the next instruction
        assert_eq!(assembly.breakpoint_lines(1), Some(2..=2));
        assert_eq!(assembly.breakpoint_lines(2), Some(2..=4));
        // Last instruction only covers its own line
        assert_eq!(assembly.breakpoint_lines(3), Some(5..=5));
        assert_eq!(assembly.breakpoint_lines(4), None);
    }
}
