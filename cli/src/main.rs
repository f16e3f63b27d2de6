//! CLI entrypoint for agent-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod logging;
mod turns;

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    AuditLog, CalibrateUseCase, CalibrationHandle, LoadRegistryUseCase, NoAuditLog,
    NoProgress, OrchestrateInput, OrchestrateUseCase, ProgressNotifier, RegistryStore, SharedRegistry,
};
use council_domain::{OutputFormat, SessionId, retain_participants, session_participants};
use council_infrastructure::{
    ConfigLoader, FileConfig, FileContextProvider, JsonFileRegistryStore, JsonlAuditLog,
    ProcessGateway, ResolvedConfig,
};
use council_presentation::{
    Cli, Command, ConfigAction, ConsoleFormatter, FeedbackArgs, OutputConfig, OutputFormatter,
    ProgressReporter, RegistryAction, RunArgs, SimpleProgress,
};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use turns::TurnInputs;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    let _log_guard = logging::init(cli.verbose, cli.quiet, file_config.logging.dir().as_deref());
    info!("Starting agent-council");

    if let Command::Config {
        action: ConfigAction::Show,
    } = cli.command
    {
        return show_config(&cli, &file_config);
    }

    // Validation failures list every issue before any session runs
    let resolved = file_config.resolve()?;
    for issue in &resolved.warnings {
        warn!("Config: {}", issue);
    }

    match cli.command {
        Command::Run(args) => run(args, cli.quiet, &file_config, &resolved).await,
        Command::Registry { action } => registry(action, &file_config, &resolved).await,
        Command::Feedback(args) => feedback(args, &file_config, &resolved).await,
        Command::Config { .. } => Ok(()),
    }
}

fn show_config(cli: &Cli, file_config: &FileConfig) -> Result<()> {
    let sources = if cli.no_config {
        vec![]
    } else {
        ConfigLoader::sources(cli.config.as_ref())
    };
    let effective = toml::to_string_pretty(file_config).context("failed to render configuration")?;

    let output = ConsoleFormatter::format_config(
        sources
            .iter()
            .map(|s| (s.label, s.location.as_str(), s.found)),
        &effective,
    );
    println!("{}", output);
    Ok(())
}

fn registry_store(file_config: &FileConfig) -> Result<Arc<JsonFileRegistryStore>> {
    let path = file_config
        .storage
        .registry_path()
        .context("no data directory available; set [storage] registry_path")?;
    Ok(Arc::new(JsonFileRegistryStore::new(path)))
}

/// Load (seeding or reconciling) the registry and start the calibration worker.
async fn start_registry(
    file_config: &FileConfig,
    resolved: &ResolvedConfig,
) -> Result<(Arc<SharedRegistry>, CalibrationHandle, JoinHandle<()>)> {
    let store = registry_store(file_config)?;
    let loaded = LoadRegistryUseCase::new(store.clone())
        .execute(&resolved.agents)
        .await?;
    if loaded.seeded {
        info!(path = %store.path().display(), "Seeded weight registry from configuration");
    }
    if !loaded.added.is_empty() {
        info!(added = ?loaded.added, "Added configured agents to the registry");
    }

    let registry = Arc::new(SharedRegistry::new(loaded.registry, store));
    let calibration = CalibrateUseCase::new(registry.clone(), *resolved.orchestrator.calibration());
    let (handle, worker) =
        calibration.spawn(resolved.orchestrator.execution().calibration_queue_capacity);
    Ok((registry, handle, worker))
}

async fn run(
    args: RunArgs,
    quiet: bool,
    file_config: &FileConfig,
    resolved: &ResolvedConfig,
) -> Result<()> {
    let output = OutputConfig {
        format: file_config.output.format.unwrap_or_default(),
        color: file_config.output.color,
        show_progress: file_config.output.show_progress,
    }
    .with_cli_overrides(args.output, quiet);
    output.apply_color();

    let (registry, calibration, worker) = start_registry(file_config, resolved).await?;

    // === Dependency Injection ===
    let gateway = Arc::new(ProcessGateway::from_config(file_config));
    let audit: Arc<dyn AuditLog> = match file_config.storage.audit_path() {
        Some(path) => Arc::new(JsonlAuditLog::open(&path)?),
        None => {
            warn!("No data directory available; audit log disabled");
            Arc::new(NoAuditLog)
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; closing the session with partial results");
            ctrl_c.cancel();
        }
    });

    let mut use_case = OrchestrateUseCase::new(
        gateway.clone(),
        gateway,
        registry,
        resolved.orchestrator.clone(),
    )
    .with_audit_log(audit)
    .with_calibration(calibration)
    .with_cancellation(cancel.clone());
    if let Some(path) = file_config.storage.context_path() {
        use_case = use_case.with_context_provider(Arc::new(FileContextProvider::new(path)));
    }

    let session = args.session.unwrap_or_else(default_session_id);
    let progress: Box<dyn ProgressNotifier> = if !output.show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let mut inputs = TurnInputs::new(session, args.prior_roster, args.feedback_accuracy);

    let mut turns = 0usize;
    match args.request {
        Some(text) => {
            run_turn(&use_case, inputs.next(text)?, progress.as_ref(), output.format).await?;
            turns += 1;
        }
        None => {
            // Each line runs as soon as it arrives
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = tokio::select! {
                    line = lines.next_line() => line?,
                    _ = cancel.cancelled() => None,
                };
                let Some(line) = line else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                run_turn(&use_case, inputs.next(line)?, progress.as_ref(), output.format).await?;
                turns += 1;
                if cancel.is_cancelled() {
                    break;
                }
            }
        }
    }

    // Dropping the last handle lets the worker drain and stop
    drop(use_case);
    if let Err(e) = worker.await {
        error!("Calibration worker panicked: {}", e);
    }
    if turns == 0 {
        bail!("No request given. Pass one as an argument or pipe turns on stdin.");
    }
    Ok(())
}

async fn run_turn(
    use_case: &OrchestrateUseCase<ProcessGateway, ProcessGateway>,
    input: OrchestrateInput,
    progress: &dyn ProgressNotifier,
    format: OutputFormat,
) -> Result<()> {
    let outcome = use_case.execute_with_progress(input, progress).await?;
    println!("{}", ConsoleFormatter.render(&outcome, format));
    Ok(())
}

async fn registry(
    action: RegistryAction,
    file_config: &FileConfig,
    resolved: &ResolvedConfig,
) -> Result<()> {
    let store = registry_store(file_config)?;
    match action {
        RegistryAction::Show => match store.get().await? {
            Some(registry) => println!("{}", ConsoleFormatter::format_registry(&registry)),
            None => println!(
                "No registry stored yet at {}; it is seeded on the first run.",
                store.path().display()
            ),
        },
        RegistryAction::Repair => {
            let repaired = LoadRegistryUseCase::new(store.clone())
                .repair(&resolved.agents)
                .await?;
            info!(version = repaired.version(), "Registry repaired");
            println!("{}", ConsoleFormatter::format_registry(&repaired));
        }
    }
    Ok(())
}

async fn feedback(
    args: FeedbackArgs,
    file_config: &FileConfig,
    resolved: &ResolvedConfig,
) -> Result<()> {
    let session = SessionId::new(args.session);
    let audit_path = file_config
        .storage
        .audit_path()
        .context("no data directory available; set [storage] audit_path")?;
    let entries = JsonlAuditLog::read_all(&audit_path)
        .with_context(|| format!("failed to read audit log {}", audit_path.display()))?;
    let participants = session_participants(&entries, &session);
    if participants.is_empty() {
        bail!("Session {} has no audit entry in {}", session, audit_path.display());
    }

    let (accuracy, dropped) = retain_participants(args.accuracy, &participants);
    for agent in &dropped {
        warn!(session = %session, agent = %agent, "Agent did not take part in the session; ignoring its accuracy");
    }
    if accuracy.is_empty() {
        bail!("None of the given agents took part in session {}", session);
    }

    let (registry, calibration, worker) = start_registry(file_config, resolved).await?;
    if !calibration.submit_feedback(session, accuracy) {
        bail!("Calibration queue rejected the feedback");
    }
    drop(calibration);
    worker.await.context("calibration worker failed")?;

    println!("{}", ConsoleFormatter::format_registry(&registry.snapshot()));
    Ok(())
}

fn default_session_id() -> String {
    chrono::Utc::now().format("session-%Y%m%d-%H%M%S").to_string()
}
