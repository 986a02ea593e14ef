use crate::cli::LogArgs;
use crate::error::{CliError, Result};
use fepprep::core::io::mapping_file::MappingFile;
use fepprep::core::io::mapping_log;
use fepprep::engine::backend::Ligand;
use std::io::{self, Write};
use tracing::info;

pub fn run(args: LogArgs) -> Result<()> {
    let mol0 = Ligand::load(&args.mol0)?;
    let mol1 = Ligand::load(&args.mol1)?;

    let mapping = MappingFile::read_from_path(&args.mapping).map_err(|e| {
        CliError::FileParsing {
            path: args.mapping.clone(),
            source: e.into(),
        }
    })?;
    info!(
        "Describing {} mapped pair(s) between '{}' and '{}'.",
        mapping.len(),
        mol0.molecule.name,
        mol1.molecule.name
    );

    match &args.output {
        Some(path) => {
            mapping_log::write_to_path(&mol0.molecule, &mol1.molecule, &mapping, path).map_err(
                |e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                },
            )?;
            println!("Mapping log written to: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            mapping_log::write_to(&mol0.molecule, &mol1.molecule, &mapping, &mut stdout)
                .map_err(|e| CliError::Other(e.into()))?;
            stdout.flush()?;
        }
    }

    Ok(())
}
