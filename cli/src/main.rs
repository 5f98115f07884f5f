//! CLI entrypoint for deepdive
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use deepdive_application::{
    InferenceRouter, NoEventLogger, NoProgress, ResearchEventLogger, ResearchProgressNotifier,
    RunResearchUseCase,
};
use deepdive_domain::{ChatMessage, LlmRequest, ModelId, ResearchRequest, TaskKind};
use deepdive_infrastructure::{
    ConfigLoader, EnvCredentialResolver, FileConfig, HttpProviderGateway, JsonlEventLogger,
    WebSourceConfig, WebSourceProvider,
};
use deepdive_presentation::{
    AskArgs, Cli, Command, ConsoleFormatter, OutputFormatter, ProgressReporter, ResearchArgs,
    SimpleProgress,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    check_config(&config)?;

    info!("Starting deepdive");

    // === Dependency Injection ===
    let registry = Arc::new(config.build_registry().context("Invalid model registry")?);
    let credentials = EnvCredentialResolver::from_env(config.credential_names());
    let missing = credentials.missing();
    if !missing.is_empty() {
        info!("Credentials not set, those models will be skipped: {}", missing.join(", "));
    }

    let router_config = config.router_config();
    // Client-level backstop behind the router's per-call deadline
    let gateway = Arc::new(
        HttpProviderGateway::with_timeout(router_config.call_timeout + CLIENT_TIMEOUT_SLACK)
            .context("Failed to build HTTP client")?,
    );
    let router = Arc::new(InferenceRouter::new(
        registry,
        gateway,
        Arc::new(credentials),
        router_config,
    ));

    let Some(command) = cli.command.as_ref() else {
        bail!("A subcommand is required. Run `deepdive --help` for usage.");
    };

    let success = match command {
        Command::Models => {
            print!("{}", ConsoleFormatter::format_models(router.registry()));
            true
        }
        Command::Ask(args) => run_ask(&router, args).await,
        Command::Research(args) => run_research(&cli, &config, router, args).await?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `-v` count sets the level; `RUST_LOG` overrides it when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let (file, guard) = match &cli.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "deepdive.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .ok();

    Ok(guard)
}

/// Warnings are logged; any error aborts startup.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("Config: {}", issue.message);
    }

    let errors: Vec<&str> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.message.as_str())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  - {}", errors.join("\n  - "));
    }
    Ok(())
}

async fn run_ask(router: &InferenceRouter<HttpProviderGateway>, args: &AskArgs) -> bool {
    let defaults = router.config();

    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(ChatMessage::system(system.as_str()));
    }
    messages.push(ChatMessage::user(args.prompt.as_str()));

    let mut request = LlmRequest::new(messages)
        .with_orchestration(args.pattern.to_pattern(defaults.retry))
        .with_max_tokens(defaults.default_max_tokens)
        .with_temperature(defaults.default_temperature)
        .with_prefer_local(args.prefer_local);
    if let Some(task) = &args.task {
        let task: TaskKind = task.parse().unwrap_or_default();
        request = request.with_task(task);
    }
    if let Some(model) = &args.model {
        request = request.with_model(model.as_str());
    }
    if !args.fallback_chain.is_empty() {
        request = request.with_fallback_chain(
            args.fallback_chain.iter().map(|id| ModelId::new(id.as_str())).collect(),
        );
    }

    let response = router.execute(&request).await;
    if args.json {
        println!("{}", ConsoleFormatter::format_answer_json(&response));
    } else {
        print!("{}", ConsoleFormatter::format_answer(&response));
    }

    response.success
}

async fn run_research(
    cli: &Cli,
    config: &FileConfig,
    router: Arc<InferenceRouter<HttpProviderGateway>>,
    args: &ResearchArgs,
) -> Result<bool> {
    let sources = WebSourceProvider::new(WebSourceConfig::from_file(&config.sources))
        .context("Failed to build web source provider")?;

    let events: Arc<dyn ResearchEventLogger> = match &cli.event_log {
        Some(path) => match JsonlEventLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoEventLogger),
        },
        None => Arc::new(NoEventLogger),
    };

    let use_case = RunResearchUseCase::new(router, Arc::new(sources), config.research_config())
        .with_event_logger(events);

    let mut request = ResearchRequest::new(args.query.as_str())
        .with_report_type(args.report_type.into())
        .with_fact_verification(!args.no_verify)
        .with_prefer_local(args.prefer_local);
    if let Some(max) = args.max_sources {
        request = request.with_max_sources(max);
    }

    // Ctrl-C stops the run at the next phase boundary.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let progress: Box<dyn ResearchProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let response = use_case
        .execute_with_cancellation(request, progress.as_ref(), &cancel)
        .await;

    println!("{}", ConsoleFormatter.render(&response, args.output));

    Ok(response.is_success())
}
