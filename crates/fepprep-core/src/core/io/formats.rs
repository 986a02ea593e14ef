use super::error::StructureError;
use super::mol2::Mol2File;
use super::pdb::PdbFile;
use super::prm7::Prm7File;
use super::traits::StructureFile;
use crate::core::models::molecule::Molecule;
use phf::{Map, phf_map};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Prm7,
    Pdb,
    Mol2,
    /// Coordinate-only formats (restart and coordinate files) that carry no atom names.
    Coordinates,
}

static FORMATS_BY_EXTENSION: Map<&'static str, Format> = phf_map! {
    "prm7" => Format::Prm7,
    "parm7" => Format::Prm7,
    "prmtop" => Format::Prm7,
    "top" => Format::Prm7,
    "pdb" => Format::Pdb,
    "mol2" => Format::Mol2,
    "rst7" => Format::Coordinates,
    "rst" => Format::Coordinates,
    "crd" => Format::Coordinates,
    "inpcrd" => Format::Coordinates,
};

impl Format {
    /// Detects the format of a file from its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        FORMATS_BY_EXTENSION.get(extension.as_str()).copied()
    }

    pub fn has_atom_names(self) -> bool {
        !matches!(self, Format::Coordinates)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Prm7 => "AMBER prm7",
            Format::Pdb => "PDB",
            Format::Mol2 => "MOL2",
            Format::Coordinates => "coordinate",
        };
        f.write_str(name)
    }
}

/// Reads atom labels from a structure file set.
///
/// The first file whose format carries atom names is read; coordinate files and files
/// with unrecognized extensions are skipped.
pub fn read_molecule(files: &[PathBuf]) -> Result<Molecule, StructureError> {
    for path in files {
        match Format::from_path(path) {
            Some(Format::Prm7) => return Prm7File::read_from_path(path),
            Some(Format::Pdb) => return PdbFile::read_from_path(path),
            Some(Format::Mol2) => return Mol2File::read_from_path(path),
            Some(Format::Coordinates) => {
                debug!("Skipping coordinate-only file {:?} for atom labels.", path);
            }
            None => {
                debug!("Skipping file {:?} with unrecognized extension.", path);
            }
        }
    }
    Err(StructureError::NoTopology {
        files: files.to_vec(),
    })
}
