use crate::core::io::mapping_file::MappingFileError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the external toolkit. They are surfaced as-is and never retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch engine executable '{}' for step '{step}': {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine step '{step}' exited with {status}: {stderr}")]
    CommandFailed {
        step: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Engine step '{step}' produced unusable output: {reason}")]
    InvalidOutput { step: &'static str, reason: String },

    #[error("Engine step '{step}' could not exchange the atom mapping: {source}")]
    MappingExchange {
        step: &'static str,
        #[source]
        source: MappingFileError,
    },

    #[error("The atom mapping search returned no mappings")]
    NoMapping,

    /// A failure raised by an in-process [`PerturbationEngine`] implementation, which has
    /// no exit status or stderr to report.
    ///
    /// [`PerturbationEngine`]: super::backend::PerturbationEngine
    #[error("Engine step '{step}' failed: {message}")]
    Toolkit { step: &'static str, message: String },
}
