mod logging;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use daoforge_core::{Error as CoreError, Schema, load_schema, validate_schema};
use daoforge_engine::{GenerationEngine, GenerationError, GenerationReport, build_strategy};
use daoforge_options::{GenOptions, load_options};

#[derive(Debug, Error)]
enum CliError {
    #[error("definition error: {0}")]
    Definition(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("generation failed: {0}")]
    Failed(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "daoforge", version, about = "Schema-driven data access generator")]
struct Cli {
    /// Raise log verbosity (repeat for more).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate data access artifacts from a schema definition.
    Generate(GenerateArgs),
    /// Parse and validate the options and schema without generating.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Options definition file.
    #[arg(long, value_name = "FILE")]
    options: PathBuf,
    /// Override the configured output directory.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Override the configured worker limit.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Options definition file.
    #[arg(long, value_name = "FILE")]
    options: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init(cli.verbose).map_err(CliError::Logging)?;

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Check(args) => run_check(args),
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        options: options_path,
        out_dir,
        workers,
    } = args;

    let (mut options, schema) = load_inputs(&options_path)?;
    if let Some(dir) = out_dir {
        options.output_base_path = dir;
    }
    if let Some(limit) = workers {
        if limit == 0 {
            return Err(CliError::InvalidConfig(
                "worker limit must be at least 1".to_string(),
            ));
        }
        options.worker_limit = limit;
    }

    let strategy = build_strategy(options.code_strategy, &options);
    let engine = GenerationEngine::new(options, strategy);

    match engine.run(schema).await {
        Ok(report) => {
            print_report(&report);
            tracing::info!(event = "run_finished", status = "success");
            Ok(())
        }
        Err(GenerationError::Failed(report)) => {
            print_report(&report);
            let message = report
                .failure
                .clone()
                .unwrap_or_else(|| "no failure detail recorded".to_string());
            Err(CliError::Failed(message))
        }
        Err(other) => Err(other.into()),
    }
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let (options, mut schema) = load_inputs(&args.options)?;
    options.overrides.apply(&mut schema.objects)?;

    let objects = &schema.objects;
    println!(
        "schema '{}' is valid: {} objects ({} enums, {} tables, {} views, {} stored procedures, {} custom views, {} commands)",
        schema.name,
        objects.declared_len(),
        objects.enums.len(),
        objects.tables.len(),
        objects.views.len(),
        objects.procedures.len(),
        objects.custom_views.len(),
        objects.commands.len(),
    );
    tracing::info!(event = "check_finished", schema = %schema.name);
    Ok(())
}

fn load_inputs(path: &Path) -> Result<(GenOptions, Schema), CliError> {
    let options = load_options(path)?;
    tracing::info!(event = "options_loaded", path = %path.display());

    let mut schema = load_schema(&options.schema_path)?;
    if let Some(additional) = &options.additional_schema_path {
        let extra = load_schema(additional)?;
        schema.merge(extra)?;
    }
    validate_schema(&schema)?;
    tracing::info!(
        event = "schema_loaded",
        schema = %schema.name,
        objects = schema.objects.declared_len()
    );
    Ok((options, schema))
}

fn print_report(report: &GenerationReport) {
    for line in &report.feedback {
        println!("{line}");
    }
    if !report.unused_rules.is_empty() {
        eprintln!("warning: {} filter rule(s) never matched:", report.unused_rules.len());
        for rule in &report.unused_rules {
            eprintln!("  {rule}");
        }
    }
}
