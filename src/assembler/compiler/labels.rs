use std::collections::BTreeMap;

use crate::isa::{Program, Reference};

/// A label that was jumped to but never defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLabel {
    pub label: String,
    /// Index of the earliest instruction referring to the label
    pub index: usize,
}

/// Label definitions and the jumps waiting for them.
///
/// Names are case-insensitive and stored upper-cased. Jumps are compiled with a placeholder
/// target and patched by [`LabelTable::resolve`] once the whole source has been read, so a label
/// may be used before it is defined.
#[derive(Debug, Default)]
pub struct LabelTable {
    definitions: BTreeMap<String, usize>,
    references: BTreeMap<String, Vec<usize>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(&name.to_uppercase())
    }

    /// Binds `name` to the instruction at `index`.
    pub fn define(&mut self, name: &str, index: usize) {
        self.definitions.insert(name.to_uppercase(), index);
    }

    /// Records that the instruction at `index` jumps to `name`.
    pub fn refer(&mut self, name: &str, index: usize) {
        self.references
            .entry(name.to_uppercase())
            .or_default()
            .push(index);
    }

    /// Patches the result of every referring instruction with the index its label points at.
    ///
    /// Nothing is patched unless every referenced label is defined. If several are missing, the
    /// one referenced earliest in the program is reported.
    #[tracing::instrument(skip_all)]
    pub fn resolve(&self, program: &mut Program) -> Result<(), UnresolvedLabel> {
        let unresolved = self
            .references
            .iter()
            .filter(|(name, _)| !self.definitions.contains_key(*name))
            .filter_map(|(name, indices)| indices.iter().min().map(|index| (name, *index)))
            .min_by_key(|(_, index)| *index);
        if let Some((label, index)) = unresolved {
            return Err(UnresolvedLabel {
                label: label.clone(),
                index,
            });
        }

        for (name, indices) in &self.references {
            let target = self.definitions[name];
            tracing::debug!("label {} -> {} ({} jumps)", name, target, indices.len());
            for index in indices {
                if let Some(instruction) = program.get_mut(*index) {
                    instruction.result = Reference::InstructionIndex(target);
                }
            }
        }
        Ok(())
    }
}
