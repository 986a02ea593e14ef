use super::formats::Format;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {format} data on line {line}: {details}")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("Inconsistent {format} data: {details}")]
    Inconsistency { format: Format, details: String },

    #[error("Missing required {format} section: {section}")]
    MissingSection {
        format: Format,
        section: &'static str,
    },

    #[error("None of the structure files carries atom names: {files:?}")]
    NoTopology { files: Vec<PathBuf> },
}

impl StructureError {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }
}
