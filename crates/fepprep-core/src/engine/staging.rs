use super::progress::{Progress, ProgressReporter};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Suffixes of the staged outputs, in the order they are renamed and returned.
pub const OUTPUT_SUFFIXES: [&str; 5] = ["mergeat0.pdb", "pert", "prm7", "rst7", "mapping"];

/// Suffixes of the per-process temporaries removed after staging.
const TEMPORARY_SUFFIXES: [&str; 3] = ["cfg", "out", "err"];

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to rename '{}' to '{}': {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The final artifact set of a run, in [`OUTPUT_SUFFIXES`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFileSet {
    paths: Vec<PathBuf>,
}

impl OutputFileSet {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl IntoIterator for OutputFileSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Appends `.<suffix>` to `root` without touching any extension-like part of it.
fn with_suffix(root: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(root.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Moves the engine's outputs to their final names and clears the temporaries.
#[derive(Debug, Clone)]
pub struct OutputStager {
    work_dir: PathBuf,
    process_name: String,
    temporaries: Vec<PathBuf>,
}

impl OutputStager {
    /// Creates a stager for `<work_dir>/<process_name>.*` with the default temporaries:
    /// the process `.cfg`, `.out` and `.err` files.
    pub fn new(work_dir: impl Into<PathBuf>, process_name: &str) -> Self {
        let work_dir = work_dir.into();
        let temporaries = TEMPORARY_SUFFIXES
            .iter()
            .map(|suffix| work_dir.join(format!("{}.{}", process_name, suffix)))
            .collect();
        Self {
            work_dir,
            process_name: process_name.to_string(),
            temporaries,
        }
    }

    pub fn with_temporaries(mut self, temporaries: Vec<PathBuf>) -> Self {
        self.temporaries = temporaries;
        self
    }

    /// Path of the engine-side file for `suffix`.
    pub fn source_path(&self, suffix: &str) -> PathBuf {
        self.work_dir
            .join(format!("{}.{}", self.process_name, suffix))
    }

    pub fn temporaries(&self) -> &[PathBuf] {
        &self.temporaries
    }

    /// Renames each output to `<root>.<suffix>`, then runs [`OutputStager::cleanup`].
    ///
    /// Renames happen one at a time with no rollback: when one fails, the outputs
    /// renamed before it keep their new names and the error is returned without cleanup.
    pub fn stage(
        &self,
        root: &Path,
        reporter: &ProgressReporter,
    ) -> Result<OutputFileSet, StagingError> {
        reporter.report(Progress::TaskStart {
            total_steps: OUTPUT_SUFFIXES.len() as u64,
        });

        let mut paths = Vec::with_capacity(OUTPUT_SUFFIXES.len());
        for suffix in OUTPUT_SUFFIXES {
            let from = self.source_path(suffix);
            let to = with_suffix(root, suffix);
            debug!("Renaming {:?} -> {:?}", from, to);
            fs::rename(&from, &to).map_err(|source| StagingError::Rename {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            paths.push(to);
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);

        let removed = self.cleanup();
        info!(
            "Staged {} output file(s); removed {} temporary file(s).",
            paths.len(),
            removed
        );
        Ok(OutputFileSet { paths })
    }

    /// Best-effort removal of the temporaries. Never fails; returns how many files were
    /// actually removed.
    pub fn cleanup(&self) -> usize {
        let mut removed = 0;
        for path in &self.temporaries {
            match fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("Temporary {:?} not present, nothing to remove.", path);
                }
                Err(e) => {
                    warn!("Could not remove temporary {:?}: {}", path, e);
                }
            }
        }
        removed
    }
}
