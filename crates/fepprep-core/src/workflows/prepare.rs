use crate::core::io::error::StructureError;
use crate::core::io::mapping_file::{MappingFile, MappingFileError};
use crate::core::io::mapping_log::{self, MappingLogError};
use crate::core::models::mapping::{AtomMapping, PrematchError};
use crate::engine::backend::{Ligand, PerturbationEngine};
use crate::engine::config::{MappingSource, PrepareConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::staging::{OutputFileSet, OutputStager, StagingError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Coarse classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: mapping file, structure file, prematch or an inconsistent mapping.
    Parse,
    /// Missing or unwritable files.
    Io,
    /// A failure reported by the external toolkit.
    External,
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("Failed to read ligand structure: {0}")]
    Structure(#[from] StructureError),

    #[error("Failed to read mapping file '{}': {source}", path.display())]
    MappingFile {
        path: PathBuf,
        #[source]
        source: MappingFileError,
    },

    #[error("Invalid prematch: {0}")]
    Prematch(#[from] PrematchError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to write mapping log '{}': {source}", path.display())]
    MappingLog {
        path: PathBuf,
        #[source]
        source: MappingLogError,
    },

    #[error(transparent)]
    Staging(#[from] StagingError),
}

impl PrepareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrepareError::Structure(StructureError::Io(_)) => ErrorKind::Io,
            PrepareError::Structure(_) => ErrorKind::Parse,
            PrepareError::MappingFile { source, .. } => match source {
                MappingFileError::Io(_) => ErrorKind::Io,
                MappingFileError::Csv(e) if e.is_io_error() => ErrorKind::Io,
                MappingFileError::Csv(_) | MappingFileError::Parse { .. } => ErrorKind::Parse,
            },
            PrepareError::Prematch(_) => ErrorKind::Parse,
            PrepareError::Engine(_) => ErrorKind::External,
            PrepareError::MappingLog { source, .. } => match source {
                MappingLogError::Io(_) => ErrorKind::Io,
                MappingLogError::AtomNotFound { .. } => ErrorKind::Parse,
            },
            PrepareError::Staging(_) => ErrorKind::Io,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrepareOutcome {
    /// The mapping that drove alignment and merging.
    pub mapping: AtomMapping,
    pub outputs: OutputFileSet,
}

#[instrument(skip_all, name = "prepare_workflow")]
pub fn run<E>(
    config: &PrepareConfig,
    engine: &E,
    reporter: &ProgressReporter,
) -> Result<PrepareOutcome, PrepareError>
where
    E: PerturbationEngine + ?Sized,
{
    // === Phase 1: Load ligand labels ===
    let (mol0, mol1) = reporter.phase("Loading ligands", || {
        let mol0 = Ligand::load(&config.mol0_files)?;
        let mol1 = Ligand::load(&config.mol1_files)?;
        Ok::<_, PrepareError>((mol0, mol1))
    })?;
    info!(
        "Loaded ligands '{}' ({} atoms) and '{}' ({} atoms).",
        mol0.molecule.name,
        mol0.molecule.len(),
        mol1.molecule.name,
        mol1.molecule.len()
    );

    // === Phase 2: Atom mapping ===
    let mapping = reporter.phase("Mapping atoms", || {
        obtain_mapping(&config.mapping_source, engine, &mol0, &mol1)
    })?;
    reporter.report(Progress::Message(format!(
        "Mapping covers {} atom pair(s).",
        mapping.len()
    )));

    // === Phase 3: Alignment, merge and input generation ===
    let aligned = reporter.phase("Aligning", || engine.rmsd_align(&mol0, &mol1, &mapping))?;
    let merged = reporter.phase("Merging", || {
        engine.merge(&aligned, &mol1, &mapping, &config.merge)
    })?;
    reporter.phase("Writing simulation inputs", || {
        engine.write_inputs(
            &merged,
            &config.output.work_dir,
            &config.output.process_name,
        )
    })?;

    // === Phase 4: Mapping log ===
    let stager = OutputStager::new(&config.output.work_dir, &config.output.process_name);
    let log_path = stager.source_path("mapping");
    mapping_log::write_to_path(&mol0.molecule, &mol1.molecule, &mapping, &log_path).map_err(
        |source| PrepareError::MappingLog {
            path: log_path.clone(),
            source,
        },
    )?;
    info!("Mapping log written to {:?}.", log_path);

    // === Phase 5: Staging ===
    let outputs = reporter.phase("Staging outputs", || {
        stager.stage(&config.output.root, reporter)
    })?;

    info!("Workflow complete. {} output file(s) staged.", outputs.len());
    Ok(PrepareOutcome { mapping, outputs })
}

fn obtain_mapping<E>(
    source: &MappingSource,
    engine: &E,
    mol0: &Ligand,
    mol1: &Ligand,
) -> Result<AtomMapping, PrepareError>
where
    E: PerturbationEngine + ?Sized,
{
    match source {
        MappingSource::File(path) => {
            info!("Loading atom mapping from {:?}.", path);
            MappingFile::read_from_path(path).map_err(|source| PrepareError::MappingFile {
                path: path.clone(),
                source,
            })
        }
        MappingSource::Search(options) => {
            info!(
                "Searching for an atom mapping (timeout {:?}, {} prematched pair(s)).",
                options.timeout,
                options.prematch.len()
            );
            options
                .prematch
                .check_bounds(mol0.molecule.len(), mol1.molecule.len())?;
            let best = engine
                .match_atoms(mol0, mol1, options)?
                .into_iter()
                .next()
                .ok_or(EngineError::NoMapping)?;
            if !best.honors(&options.prematch) {
                warn!("The top-ranked mapping does not contain every prematched pair.");
            }
            Ok(best)
        }
    }
}
