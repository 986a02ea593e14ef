use crate::cli::PrepareArgs;
use crate::error::{CliError, Result};
use fepprep::core::models::mapping::Prematch;
use fepprep::engine::command::CommandEngine;
use fepprep::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Helper looked up on `PATH` when neither the CLI nor the config file names one.
pub const DEFAULT_ENGINE_EXECUTABLE: &str = "fepprep-engine";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialInputsConfig {
    mol0: Option<Vec<PathBuf>>,
    mol1: Option<Vec<PathBuf>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialMatchingConfig {
    #[serde(rename = "mapping-file")]
    mapping_file: Option<PathBuf>,
    prematch: Option<String>,
    #[serde(rename = "timeout-secs")]
    timeout_secs: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialMergeConfig {
    #[serde(rename = "allow-ring-breaking")]
    allow_ring_breaking: Option<bool>,
    #[serde(rename = "allow-ring-size-change")]
    allow_ring_size_change: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    root: Option<PathBuf>,
    #[serde(rename = "work-dir")]
    work_dir: Option<PathBuf>,
    #[serde(rename = "process-name")]
    process_name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialEngineConfig {
    executable: Option<PathBuf>,
    args: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialPrepareConfig {
    inputs: Option<PartialInputsConfig>,
    matching: Option<PartialMatchingConfig>,
    merge: Option<PartialMergeConfig>,
    output: Option<PartialOutputConfig>,
    engine: Option<PartialEngineConfig>,
}

impl PartialPrepareConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Resolves the final run configuration and engine. CLI arguments win over `-S`
    /// overrides, which win over the file.
    pub fn merge_with_cli(
        mut self,
        args: &PrepareArgs,
    ) -> Result<(core_config::PrepareConfig, CommandEngine)> {
        self.apply_set_values(&args.set_values)?;

        let inputs = self.inputs.take().unwrap_or_default();
        let matching = self.matching.take().unwrap_or_default();
        let merge = self.merge.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();
        let engine = self.engine.take().unwrap_or_default();

        let pick_files = |cli: &[PathBuf], file: Option<Vec<PathBuf>>| {
            if cli.is_empty() {
                file.unwrap_or_default()
            } else {
                cli.to_vec()
            }
        };
        let mol0_files = pick_files(&args.mol0, inputs.mol0);
        let mol1_files = pick_files(&args.mol1, inputs.mol1);

        let prematch = args
            .prematch
            .as_ref()
            .or(matching.prematch.as_ref())
            .map(|s| s.parse::<Prematch>())
            .transpose()
            .map_err(|e| CliError::Argument(e.to_string()))?
            .unwrap_or_default();

        let timeout = match args.timeout.or(matching.timeout_secs) {
            Some(secs) => Some(Duration::try_from_secs_f64(secs).map_err(|_| {
                CliError::Argument(format!(
                    "Timeout must be a non-negative number of seconds, got {}",
                    secs
                ))
            })?),
            None => None,
        };

        let root = args.output.clone().or(output.root).ok_or_else(|| {
            CliError::Config(
                "An output root is required either in the config file (`output.root`) or via --output."
                    .to_string(),
            )
        })?;
        let work_dir = args
            .work_dir
            .clone()
            .or(output.work_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut builder = core_config::PrepareConfigBuilder::new()
            .mol0_files(mol0_files)
            .mol1_files(mol1_files)
            .mapping_file(args.mapping.clone().or(matching.mapping_file))
            .prematch(prematch)
            .allow_ring_breaking(
                args.allow_ring_breaking || merge.allow_ring_breaking.unwrap_or(false),
            )
            .allow_ring_size_change(
                args.allow_ring_size_change || merge.allow_ring_size_change.unwrap_or(false),
            )
            .output_root(root)
            .work_dir(work_dir.clone());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(name) = &output.process_name {
            builder = builder.process_name(name);
        }
        let config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let executable = args
            .engine
            .clone()
            .or(engine.executable)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_EXECUTABLE));
        let command_engine = CommandEngine::new(executable, work_dir)
            .with_leading_args(engine.args.unwrap_or_default());

        Ok((config, command_engine))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            let parse_bool = |value: &str| -> Result<bool> {
                value.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value))
                })
            };

            match key {
                "matching.mapping-file" => {
                    self.matching
                        .get_or_insert_with(Default::default)
                        .mapping_file = Some(PathBuf::from(value_str));
                }
                "matching.prematch" => {
                    self.matching.get_or_insert_with(Default::default).prematch =
                        Some(value_str.to_string());
                }
                "matching.timeout-secs" => {
                    self.matching
                        .get_or_insert_with(Default::default)
                        .timeout_secs = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                    })?);
                }
                "merge.allow-ring-breaking" => {
                    self.merge
                        .get_or_insert_with(Default::default)
                        .allow_ring_breaking = Some(parse_bool(value_str)?);
                }
                "merge.allow-ring-size-change" => {
                    self.merge
                        .get_or_insert_with(Default::default)
                        .allow_ring_size_change = Some(parse_bool(value_str)?);
                }
                "output.root" => {
                    self.output.get_or_insert_with(Default::default).root =
                        Some(PathBuf::from(value_str));
                }
                "output.work-dir" => {
                    self.output.get_or_insert_with(Default::default).work_dir =
                        Some(PathBuf::from(value_str));
                }
                "output.process-name" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .process_name = Some(value_str.to_string());
                }
                "engine.executable" => {
                    self.engine.get_or_insert_with(Default::default).executable =
                        Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
