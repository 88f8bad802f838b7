//! CLI entrypoint for kowalski
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use kowalski_application::{
    AccountService, ChatUseCase, DocumentStore, ExecutionParams, RunAgentUseCase, SessionStore,
};
use kowalski_domain::ToolProvider;
use kowalski_infrastructure::{
    ConfigLoader, DataService, DataToolProvider, DocumentSessionRepository,
    DocumentUserRepository, FileConfig, FileDataConfig, FileLoggingConfig, GeminiGateway,
    MemoryDocumentStore, MongoDocumentStore, ProviderSetDiscovery, RemoteToolProvider,
    ScriptToolProvider, SearchToolProvider, Sha256PasswordHasher, StoreKind,
};
use kowalski_presentation::{Cli, Command, GatewayState, gateway_router, serve, tool_server_router};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    if cli.command == Command::Config {
        return print_config(&cli, &config);
    }

    let _log_guard = init_logging(cli.verbose, &config.logging)?;
    config.validate().context("Invalid configuration")?;

    info!(command = ?cli.command, "Starting kowalski");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                shutdown.cancel();
            }
        });
    }

    match cli.command {
        Command::Gateway => {
            let store = open_store(&config.data).await?;
            run_gateway(&config, store, shutdown).await
        }
        Command::Scripts => run_scripts(&config, shutdown).await,
        Command::Search => run_search(&config, shutdown).await,
        Command::Data => {
            let store = open_store(&config.data).await?;
            run_data(&config, store, shutdown).await
        }
        Command::All => {
            let store = open_store(&config.data).await?;
            let servers = tokio::try_join!(
                run_scripts(&config, shutdown.clone()),
                run_search(&config, shutdown.clone()),
                run_data(&config, store.clone(), shutdown.clone()),
                run_gateway(&config, store, shutdown.clone()),
            );
            shutdown.cancel();
            servers.map(|_| ())
        }
        Command::Config => Ok(()),
    }
}

/// Install the stderr subscriber and, when configured, a daily log file.
///
/// `RUST_LOG` wins over `-v` flags.
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let (file_layer, guard) = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, &logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn print_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    ConfigLoader::print_config_sources(cli.config.as_ref());

    let mut shown = config.clone();
    if shown.agent.api_key.is_some() {
        shown.agent.api_key = Some("***".to_string());
    }
    if shown.search.weather_api_key.is_some() {
        shown.search.weather_api_key = Some("***".to_string());
    }
    let rendered = toml::to_string_pretty(&shown).context("Failed to render configuration")?;
    println!();
    println!("{}", rendered);

    if let Err(e) = config.validate() {
        println!("Warning: {}", e);
    }
    Ok(())
}

async fn open_store(data: &FileDataConfig) -> Result<Arc<dyn DocumentStore>> {
    match data.store {
        StoreKind::Memory => {
            warn!("Using the in-memory document store; data is lost on exit");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreKind::Mongo => {
            let store = MongoDocumentStore::connect(&data.url)
                .await
                .context("Failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
    }
}

async fn run_gateway(
    config: &FileConfig,
    store: Arc<dyn DocumentStore>,
    shutdown: CancellationToken,
) -> Result<()> {
    let auth_db = &config.gateway.auth_database;
    let users = Arc::new(DocumentUserRepository::new(store.clone(), auth_db));
    let session_rows = Arc::new(DocumentSessionRepository::new(store, auth_db));
    let sessions = Arc::new(SessionStore::init(session_rows).await);
    let accounts = AccountService::new(users, Arc::new(Sha256PasswordHasher::new()), sessions.clone());

    let tool_timeout = Duration::from_secs(config.agent.tool_timeout_secs);
    let backends = config
        .agent
        .backends
        .iter()
        .map(|backend| {
            RemoteToolProvider::new(&backend.name, &backend.url, tool_timeout)
                .map(|p| Arc::new(p) as Arc<dyn ToolProvider>)
                .with_context(|| format!("Invalid tool backend '{}'", backend.name))
        })
        .collect::<Result<Vec<_>>>()?;

    let llm = GeminiGateway::from_config(&config.agent).context("Failed to set up the Gemini gateway")?;
    let agent = RunAgentUseCase::new(Arc::new(llm), Arc::new(ProviderSetDiscovery::new(backends)))
        .with_params(ExecutionParams::default().with_max_tool_rounds(config.agent.max_tool_rounds))
        .with_cancellation(shutdown.clone());

    let state = GatewayState::new(accounts, ChatUseCase::new(agent))
        .with_require_auth(config.gateway.require_auth);

    serve("gateway", gateway_router(state), &config.gateway.bind, shutdown)
        .await
        .context("Gateway server failed")?;
    sessions.teardown().await;
    Ok(())
}

async fn run_scripts(config: &FileConfig, shutdown: CancellationToken) -> Result<()> {
    let provider = ScriptToolProvider::from_config(&config.sandbox)
        .await
        .context("Failed to open the script workspace")?;
    serve("scripts", tool_server_router(Arc::new(provider)), &config.sandbox.bind, shutdown)
        .await
        .context("Script server failed")
}

async fn run_search(config: &FileConfig, shutdown: CancellationToken) -> Result<()> {
    let provider =
        SearchToolProvider::from_config(&config.search).context("Failed to set up search")?;
    if config.search.weather_api_key.is_none() {
        warn!("OPENWEATHER_API_KEY is not set; get_weather will fail");
    }
    serve("search", tool_server_router(Arc::new(provider)), &config.search.bind, shutdown)
        .await
        .context("Search server failed")
}

async fn run_data(
    config: &FileConfig,
    store: Arc<dyn DocumentStore>,
    shutdown: CancellationToken,
) -> Result<()> {
    let provider = DataToolProvider::new(DataService::new(store));
    serve("data", tool_server_router(Arc::new(provider)), &config.data.bind, shutdown)
        .await
        .context("Data server failed")
}
