use crate::cli::PrepareArgs;
use crate::config::PartialPrepareConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use fepprep::engine::progress::ProgressReporter;
use fepprep::workflows;
use tracing::info;

pub fn run(args: PrepareArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialPrepareConfig::from_file(path)?,
        None => PartialPrepareConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let (config, engine) = partial_config.merge_with_cli(&args)?;
    info!(
        "Using engine helper {:?} with work directory {:?}.",
        engine.executable(),
        config.output.work_dir
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Preparing perturbation inputs...");
    let outcome = workflows::prepare::run(&config, &engine, &reporter)?;

    println!(
        "Mapping of {} atom pair(s) applied. Outputs written:",
        outcome.mapping.len()
    );
    for path in outcome.outputs.iter() {
        println!("  {}", path.display());
    }

    Ok(())
}
