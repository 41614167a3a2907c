//! Hospital Admin Console - Main entry point
//!
//! Serves the administrative web console for billing, departments, medicine
//! inventory, physical resources and staff accounts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hospital_admin::admin::{AdminState, app_router};
use hospital_admin::auth::{Role, SessionStore};
use hospital_admin::config::{self, Config};
use hospital_admin::db::Database;

/// Hospital Admin Console - Manage bills, departments, medicines, resources and staff
#[derive(Parser)]
#[command(name = "hospital-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value_os_t = Config::default_path())]
    config: PathBuf,

    /// Data directory for the database and logs
    #[arg(short, long, default_value_os_t = Config::default_data_dir())]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web console
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Create an Administrator account for signing in to the console
    CreateAdmin {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (prefer the environment variable over the command line)
        #[arg(short, long, env = "HOSPITAL_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Generate a default configuration file
    InitConfig {
        /// Output path (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on command type
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    match cli.command {
        Commands::Serve { listen } => {
            // For daemon mode: log to both stdout and file with rotation
            init_daemon_logging(&cli.data_dir, filter)?;
            serve(&cli.config, &cli.data_dir, listen).await
        }
        Commands::CreateAdmin { username, password } => {
            init_cli_logging(filter);
            create_admin(&cli.config, &cli.data_dir, &username, &password).await
        }
        Commands::InitConfig { output } => {
            init_cli_logging(filter);
            generate_config(output)
        }
    }
}

/// Initialize logging for CLI commands (stdout only).
fn init_cli_logging(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Initialize logging for daemon mode (stdout + rotating file).
fn init_daemon_logging(data_dir: &Path, filter: EnvFilter) -> Result<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    // Daily rotating file, e.g. hospital-admin.2026-01-15.log
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("hospital-admin")
        .filename_suffix("log")
        .build(&log_dir)
        .with_context(|| "Failed to create log file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer must outlive every log call; the server runs until exit
    std::mem::forget(guard);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false)) // stdout
        .with(fmt::layer().with_target(true).with_ansi(false).with_writer(non_blocking)) // file
        .init();

    info!("Logging to: {}", log_dir.display());
    Ok(())
}

fn ensure_data_dir(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))
}

/// Run the web console until interrupted.
async fn serve(config_path: &Path, data_dir: &Path, listen_override: Option<SocketAddr>) -> Result<()> {
    ensure_data_dir(data_dir)?;
    let config = Config::load(config_path)?;

    let listen_addr: SocketAddr = match listen_override {
        Some(addr) => addr,
        None => config
            .http
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address in config: {}", config.http.listen_addr))?,
    };

    let db = Database::new(&config.database, data_dir).await?;
    let state = Arc::new(AdminState::new(db.pool(), config.session.timeout_secs));

    match state.sessions.cleanup_expired_sessions().await {
        Ok(0) => {}
        Ok(n) => info!("Removed {} expired admin sessions", n),
        Err(e) => warn!("Failed to clean up expired sessions: {:#}", e),
    }

    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;

    info!("Hospital admin console starting...");
    info!("Listening on: http://{}/admin/login", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Bootstrap an Administrator account.
async fn create_admin(config_path: &Path, data_dir: &Path, username: &str, password: &str) -> Result<()> {
    let username = username.trim();
    anyhow::ensure!(!username.is_empty(), "Username must not be empty");
    anyhow::ensure!(!password.is_empty(), "Password must not be empty");

    ensure_data_dir(data_dir)?;
    let config = Config::load(config_path)?;
    let db = Database::new(&config.database, data_dir).await?;

    let sessions = SessionStore::new(db.pool());
    let user_id = sessions
        .create_user(username, password, Role::Administrator)
        .await?;

    println!("Administrator '{username}' created (user id {user_id}).");
    Ok(())
}

/// Generate a default configuration file
fn generate_config(output: Option<PathBuf>) -> Result<()> {
    let config = config::default_config_template();

    match output {
        Some(path) => {
            std::fs::write(&path, &config)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Configuration written to: {}", path.display());
        }
        None => {
            print!("{}", config);
        }
    }

    Ok(())
}
