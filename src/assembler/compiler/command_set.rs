use std::collections::BTreeMap;

use lazy_static::lazy_static;

pub use crate::isa::ArgShape;
use crate::isa::Opcode;

/// Number of selectable command-set variants. Variant 0 is the zero set.
pub const VARIANT_COUNT: usize = 49;

/// Binds a mnemonic to the way its operands are written and the opcode it compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub shape: ArgShape,
    pub opcode: Opcode,
}

impl CommandDescriptor {
    pub fn new(shape: ArgShape, opcode: Opcode) -> Self {
        Self { shape, opcode }
    }
}

impl From<Opcode> for CommandDescriptor {
    fn from(opcode: Opcode) -> Self {
        Self::new(opcode.arg_shape(), opcode)
    }
}

/// The mnemonics that are currently legal, keyed by their upper-case name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    commands: BTreeMap<String, CommandDescriptor>,
}

impl CommandSet {
    /// An empty set where nothing compiles.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Makes `name` legal, replacing whatever it was bound to.
    pub fn set(&mut self, name: &str, descriptor: CommandDescriptor) {
        self.commands.insert(name.to_uppercase(), descriptor);
    }

    /// Makes the opcode legal under its own mnemonic and canonical argument shape.
    pub fn enable(&mut self, opcode: Opcode) {
        self.set(&opcode.to_string(), opcode.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<CommandDescriptor> {
        self.commands.remove(&name.to_uppercase())
    }

    /// Looks up a mnemonic, ignoring case.
    pub fn get(&self, name: &str) -> Option<CommandDescriptor> {
        self.commands.get(&name.to_uppercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Mnemonics in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandDescriptor)> {
        self.commands
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// The zero set: every common command plus one of each kind of operation.
    pub fn zero() -> Self {
        VARIANTS[0].clone()
    }

    /// Returns command-set variant `n`, or `None` if `n` is not below [`VARIANT_COUNT`].
    pub fn variant(n: usize) -> Option<Self> {
        VARIANTS.get(n).cloned()
    }

    fn build_variant(n: usize) -> Self {
        let mut set: CommandSet = [Opcode::In, Opcode::Out, Opcode::Halt]
            .into_iter()
            .collect();

        if n == 0 {
            set.extend([
                Opcode::And,
                Opcode::Not,
                Opcode::Or,
                Opcode::Xor,
                Opcode::Rol,
                Opcode::Ror,
                Opcode::Add,
                Opcode::Sub,
                Opcode::Jo,
                Opcode::Jz,
            ]);
            return set;
        }

        // Mixed-radix digits of n - 1: shift, logic, arithmetic, jump
        let mut v = n - 1;
        set.extend(SHIFTS[v % SHIFTS.len()].iter().copied());
        v /= SHIFTS.len();
        set.extend(LOGIC[v % LOGIC.len()].iter().copied());
        v /= LOGIC.len();
        set.extend(ARITHMETIC[v % ARITHMETIC.len()].iter().copied());
        v /= ARITHMETIC.len();
        set.extend(JUMPS[v % JUMPS.len()].iter().copied());
        set
    }
}

impl Extend<Opcode> for CommandSet {
    fn extend<I: IntoIterator<Item = Opcode>>(&mut self, iter: I) {
        for opcode in iter {
            self.enable(opcode);
        }
    }
}

impl FromIterator<Opcode> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Opcode>>(iter: I) -> Self {
        let mut set = CommandSet::new();
        set.extend(iter);
        set
    }
}

const SHIFTS: [&[Opcode]; 2] = [&[Opcode::Ror], &[Opcode::Rol]];

const LOGIC: [&[Opcode]; 6] = [
    &[Opcode::And, Opcode::Not],
    &[Opcode::Or, Opcode::Not],
    &[Opcode::Xor, Opcode::Or],
    &[Opcode::Xor, Opcode::And],
    &[Opcode::Nand],
    &[Opcode::Nor],
];

const ARITHMETIC: [&[Opcode]; 2] = [&[Opcode::Add], &[Opcode::Sub]];

const JUMPS: [&[Opcode]; 2] = [&[Opcode::Jz], &[Opcode::Jo]];

lazy_static! {
    static ref VARIANTS: Vec<CommandSet> = (0..VARIANT_COUNT).map(CommandSet::build_variant).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn names(set: &CommandSet) -> Vec<&str> {
        set.iter().map(|(name, _)| name).collect()
    }

    #[test]
    fn test_zero_set() {
        let set = CommandSet::zero();
        assert_eq!(
            names(&set),
            vec!["ADD", "AND", "HALT", "IN", "JO", "JZ", "NOT", "OR", "OUT", "ROL", "ROR", "SUB", "XOR"]
        );
        assert_eq!(set, CommandSet::variant(0).unwrap());
    }

    #[test]
    fn test_first_and_last_variant() {
        let first = CommandSet::variant(1).unwrap();
        assert_eq!(
            names(&first),
            vec!["ADD", "AND", "HALT", "IN", "JZ", "NOT", "OUT", "ROR"]
        );

        let last = CommandSet::variant(VARIANT_COUNT - 1).unwrap();
        assert_eq!(
            names(&last),
            vec!["HALT", "IN", "JO", "NOR", "OUT", "ROL", "SUB"]
        );

        assert_eq!(CommandSet::variant(VARIANT_COUNT), None);
    }

    #[test]
    fn test_variants_are_distinct() {
        let variants: Vec<CommandSet> = (1..VARIANT_COUNT)
            .map(|n| CommandSet::variant(n).unwrap())
            .collect();
        for (i, a) in variants.iter().enumerate() {
            for b in &variants[i + 1..] {
                assert_ne!(a, b);
            }
            // Common commands are always there
            assert!(a.contains("in") && a.contains("out") && a.contains("halt"));
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut set = CommandSet::new();
        assert!(set.is_empty());
        set.set("move", CommandDescriptor::new(ArgShape::SrcDst, Opcode::Or));
        assert_eq!(
            set.get("Move"),
            Some(CommandDescriptor::new(ArgShape::SrcDst, Opcode::Or))
        );
        assert_eq!(names(&set), vec!["MOVE"]);
        assert!(set.remove("MOVE").is_some());
        assert_eq!(set.get("move"), None);
    }

    #[test]
    fn test_canonical_shapes() {
        let set = CommandSet::zero();
        assert_eq!(set.get("HALT").unwrap().shape, ArgShape::None);
        assert_eq!(set.get("IN").unwrap().shape, ArgShape::Dst);
        assert_eq!(set.get("OUT").unwrap().shape, ArgShape::Src);
        assert_eq!(set.get("NOT").unwrap().shape, ArgShape::SrcDst);
        assert_eq!(set.get("ROL").unwrap().shape, ArgShape::SrcSrcDst);
        assert_eq!(set.get("JO").unwrap().shape, ArgShape::SrcLabel);
    }
}
