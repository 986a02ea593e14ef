/// A single labeled atom of a ligand.
///
/// Atoms are identified by their zero-based position in the structure file they were
/// read from, which is the index space atom mappings are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// Zero-based index of the atom within its molecule.
    pub index: usize,
    /// The atom name as written in the structure file (e.g., "C1", "H12").
    pub name: String,
}

impl Atom {
    pub fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
        }
    }
}
