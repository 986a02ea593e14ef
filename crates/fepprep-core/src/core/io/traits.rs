use super::error::StructureError;
use crate::core::models::molecule::Molecule;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading atom labels from a structure file format.
///
/// Only atom indices and names are extracted; coordinates and parameters stay with the
/// external toolkit, which reads the same files itself.
pub trait StructureFile {
    /// Reads a labeled molecule from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `name` - The name given to the resulting molecule.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or the reader fails.
    fn read_from(reader: &mut impl BufRead, name: &str) -> Result<Molecule, StructureError>;

    /// Reads a labeled molecule from a file path, named after the file stem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Molecule, StructureError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, &name)
    }
}
