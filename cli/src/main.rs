//! CLI entrypoint for codequorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use codequorum_application::{
    CheckSpecInput, NoProgress, ReviewLoop, ReviewParams, ReviewProgressNotifier, RunReviewError,
    RunReviewInput, RunReviewUseCase, SpecDocument,
};
use codequorum_domain::{AggregateReview, OutputFormat};
use codequorum_infrastructure::{
    CliModelRunner, ConfigLoader, FileConfig, GitDiffSource, JsonlReviewLogger,
    LocalObservationRunner,
};
use codequorum_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter, TargetArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

type ReviewUseCase = RunReviewUseCase<GitDiffSource, CliModelRunner, LocalObservationRunner>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting codequorum");

    if cli.show_config {
        println!("{}", ConfigLoader::describe_sources(cli.config.as_deref()));
        return Ok(());
    }

    let config = load_config(&cli)?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(command) = cli.command.as_ref() else {
        bail!("No command given. Run with --help for usage.");
    };

    // A gate that cannot run must not read as PASS or CONCERN
    let failure_code = if matches!(command, Command::Gate { .. }) { 2 } else { 1 };

    let code = match run(command, &cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            failure_code
        }
    };

    drop(log_guard);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Initialize logging based on verbosity level.
///
/// Diagnostics go to stderr so reports on stdout stay clean. The returned
/// guard flushes the optional log file when dropped.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow!("Cannot open log file {}: {}", path.display(), e))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        info!("Configuration files disabled");
        return Ok(ConfigLoader::load_defaults());
    }

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    for issue in config.validate() {
        warn!("Config: {}", issue);
    }
    Ok(config)
}

async fn run(command: &Command, cli: &Cli, config: &FileConfig) -> Result<i32> {
    match command {
        Command::Review {
            target,
            spec,
            output,
        } => {
            let format = config.output.effective_format(output.map(OutputFormat::from));
            run_review(target, spec.as_deref(), format, cli.quiet, config).await
        }
        Command::Gate { target, spec } => {
            run_gate(target, spec.as_deref(), cli.quiet, config).await
        }
        Command::Compare { target } => run_compare(target, cli.quiet, config).await,
        Command::CheckSpec {
            spec,
            branch,
            base,
            model,
        } => run_check_spec(spec, branch.clone(), base.clone(), model, config).await,
        Command::Models => {
            let runner = CliModelRunner::new(config.models.commands.clone());
            let entries: Vec<(&str, &str, bool)> = config
                .models
                .commands
                .iter()
                .map(|(name, argv)| {
                    let program = argv.first().map(String::as_str).unwrap_or("");
                    (name.as_str(), program, runner.is_available(name))
                })
                .collect();
            print!("{}", ConsoleFormatter::format_models(entries));
            Ok(0)
        }
    }
}

async fn run_review(
    target: &TargetArgs,
    spec: Option<&Path>,
    format: OutputFormat,
    quiet: bool,
    config: &FileConfig,
) -> Result<i32> {
    let models = selected_models(target, config);
    if let Some(code) = preflight(config, &models, 1) {
        return Ok(code);
    }

    let spec = match spec {
        Some(path) => {
            let document = read_spec(path).await;
            if document.is_none() {
                eprintln!("Warning: Spec file not found: {}", path.display());
            }
            document
        }
        None => None,
    };

    let input = RunReviewInput::new(models)
        .with_reference(target.branch.clone())
        .with_base(target.base.clone())
        .with_spec(spec);

    let Some(result) = execute(target, config, input, quiet, "review").await? else {
        return Ok(0);
    };

    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&result),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", output);

    Ok(0)
}

async fn run_gate(
    target: &TargetArgs,
    spec: Option<&Path>,
    quiet: bool,
    config: &FileConfig,
) -> Result<i32> {
    let models = selected_models(target, config);
    if let Some(code) = preflight(config, &models, 2) {
        return Ok(code);
    }

    let spec = match spec {
        Some(path) => read_spec(path).await,
        None => None,
    };

    let input = RunReviewInput::new(models)
        .with_reference(target.branch.clone())
        .with_base(target.base.clone())
        .with_spec(spec);

    let Some(result) = execute(target, config, input, quiet, "review").await? else {
        return Ok(0);
    };

    println!("{}", ConsoleFormatter::format_summary(&result));
    Ok(result.gate.exit_code())
}

async fn run_compare(target: &TargetArgs, quiet: bool, config: &FileConfig) -> Result<i32> {
    let models = selected_models(target, config);
    if models.len() < 2 {
        eprintln!("Need at least 2 models to compare.");
        return Ok(1);
    }
    if let Some(code) = preflight(config, &models, 1) {
        return Ok(code);
    }

    let input = RunReviewInput::new(models)
        .with_reference(target.branch.clone())
        .with_base(target.base.clone());

    let Some(result) = execute(target, config, input, quiet, "compare").await? else {
        return Ok(0);
    };

    print!("{}", ConsoleFormatter::format_compare(&result));
    Ok(0)
}

async fn run_check_spec(
    spec: &Path,
    branch: Option<String>,
    base: Option<String>,
    model: &str,
    config: &FileConfig,
) -> Result<i32> {
    if let Some(code) = preflight(config, &[model.to_string()], 1) {
        return Ok(code);
    }

    let Some(document) = read_spec(spec).await else {
        bail!("Cannot read spec file: {}", spec.display());
    };

    let target = TargetArgs {
        branch: branch.clone(),
        base: base.clone(),
        ..TargetArgs::default()
    };
    let use_case = build_use_case(&target, config)?;

    eprintln!("Checking spec compliance with {}...", model);
    let input = CheckSpecInput {
        model: model.to_string(),
        reference: branch,
        base,
        spec: document,
    };

    match use_case.check_spec(input).await {
        Ok(response) => {
            println!("{}", response);
            Ok(0)
        }
        Err(RunReviewError::EmptyDiff) => {
            println!("No changes to check.");
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the review use case, returning `None` when there is nothing to review.
async fn execute(
    target: &TargetArgs,
    config: &FileConfig,
    input: RunReviewInput,
    quiet: bool,
    action: &str,
) -> Result<Option<AggregateReview>> {
    let use_case = build_use_case(target, config)?;

    let progress: Box<dyn ReviewProgressNotifier> = if quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    match use_case.execute_with_progress(input, progress.as_ref()).await {
        Ok(result) => Ok(Some(result)),
        Err(RunReviewError::EmptyDiff) => {
            eprintln!("No changes to {}.", action);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

// === Dependency Injection ===
fn build_use_case(target: &TargetArgs, config: &FileConfig) -> Result<ReviewUseCase> {
    let repo = repository(target)?;

    let diff_source = GitDiffSource::new()
        .with_working_dir(&repo)
        .with_context_lines(config.review.context_lines)
        .with_default_base(config.review.base.clone());

    let runner = CliModelRunner::new(config.models.commands.clone());
    let observations = LocalObservationRunner::new(config.review.observation_timeout());

    let mut params: ReviewParams = config.review.to_review_params().with_repo_path(&repo);
    if let Some(max) = target.max_observations {
        params = params.with_max_observations(max);
    }

    let mut review_loop = ReviewLoop::new(Arc::new(runner), Arc::new(observations), params);
    if let Some(path) = &config.log.transcript {
        match JsonlReviewLogger::new(path) {
            Some(logger) => {
                info!("Writing review transcript to {}", logger.path().display());
                review_loop = review_loop.with_review_logger(Arc::new(logger));
            }
            None => warn!("Cannot open review transcript {}", path.display()),
        }
    }

    Ok(RunReviewUseCase::new(Arc::new(diff_source), review_loop))
}

fn repository(target: &TargetArgs) -> Result<PathBuf> {
    match &target.repo {
        Some(repo) => Ok(repo.clone()),
        None => std::env::current_dir()
            .map_err(|e| anyhow!("Cannot determine current directory: {}", e)),
    }
}

fn selected_models(target: &TargetArgs, config: &FileConfig) -> Vec<String> {
    if target.model.is_empty() {
        config.models.default.clone()
    } else {
        target.model.clone()
    }
}

/// Report unavailable model CLIs; returns the exit code when any are missing.
fn preflight(config: &FileConfig, models: &[String], code: i32) -> Option<i32> {
    let runner = CliModelRunner::new(config.models.commands.clone());
    let missing = runner.preflight(models);
    if missing.is_empty() {
        return None;
    }

    eprintln!("Error: Missing CLI tools: {}", missing.join(", "));
    eprintln!("Install the missing tools or use --model to select available ones.");
    Some(code)
}

async fn read_spec(path: &Path) -> Option<SpecDocument> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(SpecDocument::new(path.display().to_string(), content)),
        Err(e) => {
            warn!("Cannot read spec file {}: {}", path.display(), e);
            None
        }
    }
}
