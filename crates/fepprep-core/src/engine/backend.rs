use super::config::{MatchOptions, MergeOptions};
use super::error::EngineError;
use crate::core::io::error::StructureError;
use crate::core::io::formats;
use crate::core::models::mapping::AtomMapping;
use crate::core::models::molecule::Molecule;
use std::path::{Path, PathBuf};

/// Suffixes of the files an engine writes for `<process_name>` in `write_inputs`.
pub const ENGINE_INPUT_SUFFIXES: [&str; 4] = ["mergeat0.pdb", "pert", "prm7", "rst7"];

/// A ligand as seen by the engine: its atom labels plus the structure files that
/// describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ligand {
    pub molecule: Molecule,
    pub files: Vec<PathBuf>,
}

impl Ligand {
    /// Reads atom labels from `files` and keeps the file set for the engine.
    pub fn load(files: &[PathBuf]) -> Result<Self, StructureError> {
        let molecule = formats::read_molecule(files)?;
        Ok(Self {
            molecule,
            files: files.to_vec(),
        })
    }
}

/// The merged, perturbable molecule produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSystem {
    pub files: Vec<PathBuf>,
}

/// The external simulation toolkit.
///
/// Every call blocks until the toolkit is done. Errors are opaque to the caller and are
/// propagated without retry.
pub trait PerturbationEngine {
    /// Searches for atom mappings between `mol0` and `mol1`, best first.
    ///
    /// The timeout and prematch in `options` are forwarded as-is.
    fn match_atoms(
        &self,
        mol0: &Ligand,
        mol1: &Ligand,
        options: &MatchOptions,
    ) -> Result<Vec<AtomMapping>, EngineError>;

    /// Aligns `mol0` onto `mol1` by RMSD over the mapped atoms.
    fn rmsd_align(
        &self,
        mol0: &Ligand,
        mol1: &Ligand,
        mapping: &AtomMapping,
    ) -> Result<Ligand, EngineError>;

    /// Merges the two ligands into a single perturbable molecule.
    fn merge(
        &self,
        mol0: &Ligand,
        mol1: &Ligand,
        mapping: &AtomMapping,
        options: &MergeOptions,
    ) -> Result<MergedSystem, EngineError>;

    /// Writes the simulation inputs for `merged` into `work_dir`, named
    /// `<process_name>.<suffix>` for each of [`ENGINE_INPUT_SUFFIXES`].
    fn write_inputs(
        &self,
        merged: &MergedSystem,
        work_dir: &Path,
        process_name: &str,
    ) -> Result<(), EngineError>;
}
