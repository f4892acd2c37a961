/// Operation performed by an [`Instruction`][super::Instruction].
///
/// The set is closed: the engine matches on it exhaustively, and the mnemonic of each opcode is
/// its upper-case name.
#[derive(
    Debug,
    Default,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Clone,
    Copy,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Opcode {
    /// End of program. Also what the program yields for indices past its end.
    #[default]
    Halt,
    In,
    Out,
    Ror,
    Rol,
    Not,
    Or,
    And,
    Nor,
    Nand,
    Xor,
    Add,
    Sub,
    Jz,
    Jo,
}

/// How the operands of a mnemonic are written in source code.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum ArgShape {
    /// `halt`
    None,
    /// `out <src>`, the source is stored in both operand slots
    Src,
    /// `in <dst>`
    Dst,
    /// `not <src>, <dst>`
    SrcDst,
    /// `add <src1>, <src2>, <dst>`
    SrcSrcDst,
    /// `jz <src>, <label>`
    SrcLabel,
}

impl Opcode {
    /// The argument shape the opcode is normally bound to.
    pub fn arg_shape(self) -> ArgShape {
        match self {
            Opcode::Halt => ArgShape::None,
            Opcode::In => ArgShape::Dst,
            Opcode::Out => ArgShape::Src,
            Opcode::Not => ArgShape::SrcDst,
            Opcode::Ror
            | Opcode::Rol
            | Opcode::Or
            | Opcode::And
            | Opcode::Nor
            | Opcode::Nand
            | Opcode::Xor
            | Opcode::Add
            | Opcode::Sub => ArgShape::SrcSrcDst,
            Opcode::Jz | Opcode::Jo => ArgShape::SrcLabel,
        }
    }

    /// One line of usage help, e.g. `add <src1>, <src2>, <dst>   ;dst := src1 + src2`.
    pub fn usage(self) -> &'static str {
        match self {
            Opcode::Halt => "halt   ;stop execution",
            Opcode::In => "in <dst>   ;dst := input",
            Opcode::Out => "out <src>   ;output := src",
            Opcode::Ror => "ror <src1>, <src2>, <dst>   ;dst := src1 >>> src2",
            Opcode::Rol => "rol <src1>, <src2>, <dst>   ;dst := src1 <<< src2",
            Opcode::Not => "not <src>, <dst>   ;dst := NOT(src)",
            Opcode::Or => "or <src1>, <src2>, <dst>   ;dst := OR(src1,src2)",
            Opcode::And => "and <src1>, <src2>, <dst>   ;dst := AND(src1,src2)",
            Opcode::Nor => "nor <src1>, <src2>, <dst>   ;dst := NOT(OR(src1,src2))",
            Opcode::Nand => "nand <src1>, <src2>, <dst>   ;dst := NOT(AND(src1,src2))",
            Opcode::Xor => "xor <src1>, <src2>, <dst>   ;dst := XOR(src1,src2)",
            Opcode::Add => "add <src1>, <src2>, <dst>   ;dst := src1 + src2",
            Opcode::Sub => "sub <src1>, <src2>, <dst>   ;dst := src1 - src2",
            Opcode::Jz => "jz <src>, <lbl>   ;if (src=0x00) goto lbl",
            Opcode::Jo => "jo <src>, <lbl>   ;if (src=0xFF) goto lbl",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_mnemonic_names() {
        let tests = vec![
            ("HALT", Opcode::Halt),
            ("nand", Opcode::Nand),
            ("Jz", Opcode::Jz),
            ("xor", Opcode::Xor),
        ];
        for (input, expected) in tests {
            assert_eq!(Opcode::from_str(input), Ok(expected));
        }
        assert!(Opcode::from_str("MOV").is_err());
        assert_eq!(Opcode::Nand.to_string(), "NAND");
    }

    #[test]
    fn test_usage_starts_with_mnemonic() {
        for opcode in Opcode::iter() {
            let name = opcode.to_string().to_lowercase();
            assert!(opcode.usage().starts_with(&name), "{}", opcode.usage());
        }
    }
}
