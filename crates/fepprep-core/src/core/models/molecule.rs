use super::atom::Atom;

/// An ordered container of labeled atoms.
///
/// Atoms are stored in file order, so `atoms()[i].index == i` for any molecule built
/// through [`Molecule::from_names`] or the structure readers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Molecule {
    pub name: String,
    atoms: Vec<Atom>,
}

impl Molecule {
    /// Creates a molecule from atom names, assigning indices in order.
    pub fn from_names<I, S>(name: &str, atom_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let atoms = atom_names
            .into_iter()
            .enumerate()
            .map(|(index, atom_name)| Atom::new(index, atom_name.as_ref()))
            .collect();
        Self {
            name: name.to_string(),
            atoms,
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Looks up an atom by its index.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index).filter(|atom| atom.index == index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
