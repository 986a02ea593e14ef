use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "fepprep",
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "fepprep CLI - Prepare merged-ligand inputs for relative free-energy-perturbation simulations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Map, align and merge two ligands, then stage the perturbation inputs.
    Prepare(PrepareArgs),
    /// Write the human-readable mapping log for an existing mapping file.
    Log(LogArgs),
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    // --- Inputs ---
    /// Structure file(s) of the first ligand (e.g., ligand31.prm7 ligand31.rst7).
    #[arg(long = "mol0", value_name = "FILE", num_args(1..))]
    pub mol0: Vec<PathBuf>,

    /// Structure file(s) of the second ligand.
    #[arg(long = "mol1", value_name = "FILE", num_args(1..))]
    pub mol1: Vec<PathBuf>,

    /// Root of the output names; files are written as <ROOT>.mergeat0.pdb, <ROOT>.pert, etc.
    #[arg(short, long, value_name = "ROOT")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Matching ---
    /// Use this mapping file instead of searching for a mapping.
    #[arg(short, long, value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Atom pairs the mapping search must keep, e.g. '3-1,7-5'.
    #[arg(long, value_name = "A-B,...")]
    pub prematch: Option<String>,

    /// Time limit handed to the mapping search, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    // --- Merging ---
    /// Allow the merge to break rings.
    #[arg(long)]
    pub allow_ring_breaking: bool,

    /// Allow the merge to change ring sizes.
    #[arg(long)]
    pub allow_ring_size_change: bool,

    // --- Engine ---
    /// Helper executable that drives the simulation toolkit.
    #[arg(long, value_name = "EXE")]
    pub engine: Option<PathBuf>,

    /// Directory in which the helper writes its intermediate files.
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S matching.timeout-secs=30
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `log` subcommand.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Structure file(s) of the first ligand.
    #[arg(long = "mol0", value_name = "FILE", num_args(1..), required = true)]
    pub mol0: Vec<PathBuf>,

    /// Structure file(s) of the second ligand.
    #[arg(long = "mol1", value_name = "FILE", num_args(1..), required = true)]
    pub mol1: Vec<PathBuf>,

    /// The mapping file to describe.
    #[arg(short, long, value_name = "PATH", required = true)]
    pub mapping: PathBuf,

    /// Where to write the log. Defaults to standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
