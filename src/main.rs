use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use autobot::application::errors::BotError;
use autobot::application::messaging::EventRouter;
use autobot::application::services::{
    CooldownThrottle, LoginOutcome, LoginRequest, PermissionEvaluator, SessionManager,
};
use autobot::domain::entities::PluginRegistry;
use autobot::infrastructure::adapters::console::{console_credential, ConsoleConnector, CONSOLE_USER};
use autobot::infrastructure::config::Config;
use autobot::infrastructure::plugins::{HandlerCatalog, PluginLoader};
use autobot::infrastructure::storage::{JsonHistoryStore, JsonThreadAdminStore};

#[derive(Parser)]
#[command(name = "autobot")]
#[command(about = "Command-dispatch engine for chat-automation accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Command prefix (overrides config)
    #[arg(short, long)]
    prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot with a console account
    Run,
    /// Print registered commands and event handlers as JSON
    Commands,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config, cli.prefix),
        Commands::Commands => list_commands(&cli.config),
        Commands::Version => {
            println!("autobot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        Config::load(config_path)
            .map(Config::with_env)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            })
    } else {
        tracing::warn!("Config {} not found, using defaults", config_path);
        Config::load_env()
    }
}

fn load_registry(config: &Config) -> PluginRegistry {
    let outcome =
        PluginLoader::new(&config.plugins.directory, HandlerCatalog::builtin(config)).load();
    for e in &outcome.errors {
        tracing::error!("Error installing command: {}", e);
    }
    tracing::info!(
        "Plugin registry built: {} commands, {} event handlers, {} errors",
        outcome.registry.commands().len(),
        outcome.registry.event_handlers().len(),
        outcome.errors.len()
    );
    outcome.registry
}

fn run_bot(config_path: &str, prefix_override: Option<String>) -> Result<(), BotError> {
    let mut config = load_config(config_path);
    if let Some(prefix) = prefix_override {
        config.bot.prefix = prefix;
    }

    tracing::info!("Starting autobot: {}", config.bot.name);

    let registry = Arc::new(load_registry(&config));
    let history = Arc::new(JsonHistoryStore::new(&config.data.history_path));
    let threads = Arc::new(JsonThreadAdminStore::new(&config.data.thread_admin_path));
    let permissions =
        PermissionEvaluator::new(config.master_key.admin.clone(), history.clone(), threads);
    let router = Arc::new(EventRouter::new(registry, permissions, CooldownThrottle::new()));
    let sessions = SessionManager::new(
        Arc::new(ConsoleConnector::new()),
        router,
        history,
        config.client_options.clone(),
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    rt.block_on(async {
        let request = LoginRequest {
            credential: console_credential(),
            enabled_commands: Vec::new(),
            prefix: config.bot.prefix.clone(),
            admins: vec![CONSOLE_USER.to_string()],
        };
        match sessions.login(request).await? {
            LoginOutcome::LoggedIn(session) | LoginOutcome::AlreadyActive(session) => {
                tracing::info!(
                    "Session active: {} ({}s online), prefix '{}'",
                    session.display_name,
                    session.elapsed_seconds,
                    config.bot.prefix
                );
            }
        }

        let mut flush = tokio::time::interval(Duration::from_secs(config.history_flush_seconds.0));
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down");
                    break;
                }
                _ = flush.tick() => {
                    if let Err(e) = sessions.persist_history().await {
                        tracing::error!("Failed to persist history: {}", e);
                    }
                }
            }
        }

        sessions.shutdown().await;
        Ok(())
    })
}

fn list_commands(config_path: &str) -> Result<(), BotError> {
    let config = load_config(config_path);
    let registry = load_registry(&config);
    let json = serde_json::to_string_pretty(&registry.listing())
        .map_err(|e| BotError::Internal(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
