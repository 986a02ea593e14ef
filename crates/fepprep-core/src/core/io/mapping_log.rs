use crate::core::models::mapping::AtomMapping;
use crate::core::models::molecule::Molecule;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Identifies which end state of the perturbation an atom belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Molecule0,
    Molecule1,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Molecule0 => f.write_str("molecule 0"),
            Side::Molecule1 => f.write_str("molecule 1"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MappingLogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Mapped atom index {index} does not exist in {side} '{molecule}'")]
    AtomNotFound {
        side: Side,
        index: usize,
        molecule: String,
    },
}

/// One line of the mapping log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingLogEntry {
    Matched {
        index0: usize,
        name0: String,
        index1: usize,
        name1: String,
    },
    /// An atom of molecule 0 that becomes a dummy in the end state.
    Unmatched0 { index: usize, name: String },
    /// An atom of molecule 1 that is a dummy in the initial state.
    Unmatched1 { index: usize, name: String },
}

impl fmt::Display for MappingLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingLogEntry::Matched {
                index0,
                name0,
                index1,
                name1,
            } => write!(f, "{} {} --> {} {}", index0, name0, index1, name1),
            MappingLogEntry::Unmatched0 { index, name } => {
                write!(f, "{} {} --> dummy", index, name)
            }
            MappingLogEntry::Unmatched1 { index, name } => {
                write!(f, "dummy --> {} {}", index, name)
            }
        }
    }
}

/// Builds the log entries for `mapping` between `mol0` and `mol1`.
///
/// Matched pairs come first in mapping order, followed by the unmatched atoms of
/// `mol0` and then those of `mol1`, each in container order.
pub fn entries(
    mol0: &Molecule,
    mol1: &Molecule,
    mapping: &AtomMapping,
) -> Result<Vec<MappingLogEntry>, MappingLogError> {
    let mut entries = Vec::with_capacity(mol0.len().max(mol1.len()));
    let mut logged0 = HashSet::with_capacity(mapping.len());
    let mut logged1 = HashSet::with_capacity(mapping.len());

    for (index0, index1) in mapping.iter() {
        let atom0 = mol0
            .atom(index0)
            .ok_or_else(|| MappingLogError::AtomNotFound {
                side: Side::Molecule0,
                index: index0,
                molecule: mol0.name.clone(),
            })?;
        let atom1 = mol1
            .atom(index1)
            .ok_or_else(|| MappingLogError::AtomNotFound {
                side: Side::Molecule1,
                index: index1,
                molecule: mol1.name.clone(),
            })?;
        logged0.insert(atom0);
        logged1.insert(atom1);
        entries.push(MappingLogEntry::Matched {
            index0: atom0.index,
            name0: atom0.name.clone(),
            index1: atom1.index,
            name1: atom1.name.clone(),
        });
    }

    entries.extend(
        mol0.atoms()
            .iter()
            .filter(|atom| !logged0.contains(atom))
            .map(|atom| MappingLogEntry::Unmatched0 {
                index: atom.index,
                name: atom.name.clone(),
            }),
    );
    entries.extend(
        mol1.atoms()
            .iter()
            .filter(|atom| !logged1.contains(atom))
            .map(|atom| MappingLogEntry::Unmatched1 {
                index: atom.index,
                name: atom.name.clone(),
            }),
    );

    Ok(entries)
}

/// Writes the mapping log, one newline-terminated entry per line, no header.
pub fn write_to(
    mol0: &Molecule,
    mol1: &Molecule,
    mapping: &AtomMapping,
    writer: &mut impl Write,
) -> Result<(), MappingLogError> {
    for entry in entries(mol0, mol1, mapping)? {
        writeln!(writer, "{}", entry)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the mapping log to `path`, replacing any existing file.
///
/// The entries are built before the file is created, so an invalid mapping leaves an
/// existing log untouched.
pub fn write_to_path<P: AsRef<Path>>(
    mol0: &Molecule,
    mol1: &Molecule,
    mapping: &AtomMapping,
    path: P,
) -> Result<(), MappingLogError> {
    let entries = entries(mol0, mol1, mapping)?;
    let mut writer = BufWriter::new(File::create(path)?);
    for entry in entries {
        writeln!(writer, "{}", entry)?;
    }
    writer.flush()?;
    Ok(())
}
