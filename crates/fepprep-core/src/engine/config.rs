use crate::core::models::mapping::Prematch;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_PROCESS_NAME: &str = "somd";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Structure file set '{0}' must contain at least one file")]
    EmptyFileSet(&'static str),

    #[error("Invalid process name '{0}': must be non-empty and contain no path separators")]
    InvalidProcessName(String),
}

/// Parameters forwarded to the external mapping search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    pub timeout: Duration,
    pub prematch: Prematch,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_MATCH_TIMEOUT,
            prematch: Prematch::default(),
        }
    }
}

/// Ring-handling switches forwarded to the external merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub allow_ring_breaking: bool,
    pub allow_ring_size_change: bool,
}

/// Where the atom mapping of a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    /// A user-supplied mapping file; the search is skipped.
    File(PathBuf),
    /// The top-ranked result of the external search.
    Search(MatchOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Root of the staged output names, `<root>.<suffix>`.
    pub root: PathBuf,
    /// Directory in which the engine writes its files.
    pub work_dir: PathBuf,
    /// Base name of the files the engine writes, `<process_name>.<suffix>`.
    pub process_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareConfig {
    pub mol0_files: Vec<PathBuf>,
    pub mol1_files: Vec<PathBuf>,
    pub mapping_source: MappingSource,
    pub merge: MergeOptions,
    pub output: OutputConfig,
}

#[derive(Default)]
pub struct PrepareConfigBuilder {
    mol0_files: Option<Vec<PathBuf>>,
    mol1_files: Option<Vec<PathBuf>>,
    mapping_file: Option<PathBuf>,
    prematch: Option<Prematch>,
    timeout: Option<Duration>,
    allow_ring_breaking: Option<bool>,
    allow_ring_size_change: Option<bool>,
    output_root: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    process_name: Option<String>,
}

impl PrepareConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mol0_files(mut self, files: Vec<PathBuf>) -> Self {
        self.mol0_files = Some(files);
        self
    }
    pub fn mol1_files(mut self, files: Vec<PathBuf>) -> Self {
        self.mol1_files = Some(files);
        self
    }
    pub fn mapping_file(mut self, path: Option<PathBuf>) -> Self {
        self.mapping_file = path;
        self
    }
    pub fn prematch(mut self, prematch: Prematch) -> Self {
        self.prematch = Some(prematch);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn allow_ring_breaking(mut self, allow: bool) -> Self {
        self.allow_ring_breaking = Some(allow);
        self
    }
    pub fn allow_ring_size_change(mut self, allow: bool) -> Self {
        self.allow_ring_size_change = Some(allow);
        self
    }
    pub fn output_root(mut self, root: PathBuf) -> Self {
        self.output_root = Some(root);
        self
    }
    pub fn work_dir(mut self, dir: PathBuf) -> Self {
        self.work_dir = Some(dir);
        self
    }
    pub fn process_name(mut self, name: &str) -> Self {
        self.process_name = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<PrepareConfig, ConfigError> {
        let mol0_files = self
            .mol0_files
            .ok_or(ConfigError::MissingParameter("mol0_files"))?;
        if mol0_files.is_empty() {
            return Err(ConfigError::EmptyFileSet("mol0"));
        }
        let mol1_files = self
            .mol1_files
            .ok_or(ConfigError::MissingParameter("mol1_files"))?;
        if mol1_files.is_empty() {
            return Err(ConfigError::EmptyFileSet("mol1"));
        }

        let process_name = self
            .process_name
            .unwrap_or_else(|| DEFAULT_PROCESS_NAME.to_string());
        if process_name.is_empty() || process_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidProcessName(process_name));
        }

        let output = OutputConfig {
            root: self
                .output_root
                .ok_or(ConfigError::MissingParameter("output_root"))?,
            work_dir: self.work_dir.unwrap_or_else(|| PathBuf::from(".")),
            process_name,
        };

        let mapping_source = match self.mapping_file {
            Some(path) => {
                if self.prematch.as_ref().is_some_and(|p| !p.is_empty()) {
                    warn!("A mapping file was supplied; the prematch constraint will be ignored.");
                }
                MappingSource::File(path)
            }
            None => MappingSource::Search(MatchOptions {
                timeout: self.timeout.unwrap_or(DEFAULT_MATCH_TIMEOUT),
                prematch: self.prematch.unwrap_or_default(),
            }),
        };

        Ok(PrepareConfig {
            mol0_files,
            mol1_files,
            mapping_source,
            merge: MergeOptions {
                allow_ring_breaking: self.allow_ring_breaking.unwrap_or(false),
                allow_ring_size_change: self.allow_ring_size_change.unwrap_or(false),
            },
            output,
        })
    }
}
