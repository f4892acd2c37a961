use crate::{assembler::compiler::Assembly, isa::Instruction};

/// Generate a listing line from an instruction, its index and its 0-based source line
///
/// E.g. `  0     1  JZ r0, @2`
pub fn generate_line(index: usize, line: Option<usize>, ins: &Instruction) -> String {
    let line = line.map(|line| (line + 1).to_string()).unwrap_or_default();
    format!("{:>3}  {:>4}  {}\n", index, line, ins)
}

/// Generate the listing of a whole program, one row per instruction.
#[tracing::instrument(skip_all)]
pub fn generate(assembly: &Assembly) -> String {
    let mut str = String::new();
    str.push_str(" Ix  Line  Instruction\n");
    str.push_str("----------------------\n");
    //              0     1  JZ r0, @2

    for (index, ins) in assembly.program.iter().enumerate() {
        str.push_str(&generate_line(index, assembly.source_line_for(index), ins));
    }
    str
}
