//! CLI entrypoint for Keyword Navigator
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use navigator_application::{
    CallLogger, NoCallLogger, NoProgress, ProgressNotifier, RetryChunksInput,
    RetryChunksUseCase, RunEvaluationInput, RunEvaluationUseCase,
};
use navigator_domain::{EvaluationReport, Model, OutputFormat as DomainOutputFormat};
use navigator_infrastructure::{
    ConfigLoader, FileConfig, JsonProfileStore, JsonReportStore, JsonlCallLogger, RoutingGateway,
};
use navigator_presentation::{
    Cli, Command, ConsoleFormatter, OutputArgs, OutputFormatter, ProgressReporter,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Marks errors found before any remote call; they exit with status 2
#[derive(Debug)]
struct InvalidConfig;

impl std::fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid configuration")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<InvalidConfig>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Install the stderr subscriber, plus a daily log file when requested.
///
/// `RUST_LOG` takes precedence over the `-v` count.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    let stderr = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "keyword-navigator.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            None
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    info!("Starting Keyword Navigator");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("{}", e))
            .context(InvalidConfig)?
    };

    let command = cli.command();
    apply_overrides(&mut config, &command);
    config.validate().context(InvalidConfig)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let provider_config = config
        .providers
        .to_provider_config()
        .context(InvalidConfig)?;
    let gateway = Arc::new(RoutingGateway::from_config(&provider_config));
    let profiles = Arc::new(JsonProfileStore::new(&config.data.profile_dir));
    let reports = Arc::new(JsonReportStore::new(&config.output.path));
    let call_logger: Arc<dyn CallLogger> = match &config.output.call_log {
        Some(path) => match JsonlCallLogger::open(path) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoCallLogger),
        },
        None => Arc::new(NoCallLogger),
    };

    let params = config.evaluation.to_params();
    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let report = match command {
        Command::Run(_) => {
            let models = config.evaluation.parse_models();
            info!(
                "Evaluating {} model(s), writing {}",
                models.len(),
                config.output.path.display()
            );

            let cancellation = CancellationToken::new();
            spawn_interrupt_handler(cancellation.clone());

            let use_case = RunEvaluationUseCase::new(gateway, profiles, reports)
                .with_call_logger(call_logger)
                .with_cancellation(cancellation);

            let output = use_case
                .execute_with_progress(RunEvaluationInput::new(models, params), progress.as_ref())
                .await
                .map_err(|e| {
                    let config_error = e.is_config();
                    let e = anyhow::Error::new(e);
                    if config_error { e.context(InvalidConfig) } else { e }
                })?;

            if output.interrupted {
                warn!("Run interrupted; completed models were saved");
            }
            output.report
        }
        Command::Retry(args) => {
            let Ok(model) = args.model.parse::<Model>();
            let input = RetryChunksInput {
                model,
                chunks: args.chunks.clone(),
                params,
            };

            let use_case =
                RetryChunksUseCase::new(gateway, profiles, reports).with_call_logger(call_logger);

            let output = use_case
                .execute_with_progress(input, progress.as_ref())
                .await
                .map_err(|e| {
                    let config_error = e.is_config();
                    let e = anyhow::Error::new(e);
                    if config_error { e.context(InvalidConfig) } else { e }
                })?;

            if output.retried.is_empty() {
                println!("{} has no failed chunks; nothing to retry", args.model);
            } else {
                info!(
                    "Retried chunks {:?} of {}: {}",
                    output.retried, args.model, output.state
                );
            }
            output.report
        }
    };

    print_report(&report, config.output.format.unwrap_or_default());
    Ok(())
}

/// Apply CLI flags on top of the merged file configuration.
fn apply_overrides(config: &mut FileConfig, command: &Command) {
    if let Command::Run(args) = command {
        if !args.model.is_empty() {
            config.evaluation.models = args.model.clone();
        }
        if let Some(size) = args.chunk_size {
            config.evaluation.chunk_size = size;
        }
        if let Some(min) = args.min_chunks {
            config.evaluation.min_successful_chunks = min;
        }
    }

    let OutputArgs {
        output,
        format,
        call_log,
        profile_dir,
        delay_ms,
        timeout,
    } = command.output_args();

    if let Some(path) = output {
        config.output.path = path.clone();
    }
    if let Some(format) = format {
        config.output.format = Some(DomainOutputFormat::from(*format));
    }
    if let Some(path) = call_log {
        config.output.call_log = Some(path.clone());
    }
    if let Some(dir) = profile_dir {
        config.data.profile_dir = dir.clone();
    }
    if let Some(ms) = delay_ms {
        config.evaluation.inter_call_delay_ms = *ms;
    }
    if let Some(seconds) = timeout {
        config.evaluation.timeout_seconds = Some(*seconds);
    }
}

fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current model");
            token.cancel();
        }
    });
}

fn print_report(report: &EvaluationReport, format: DomainOutputFormat) {
    println!("{}", ConsoleFormatter.render(report, format));
}
