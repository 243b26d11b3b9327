//! Items service entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use items_service::api::{create_router, AppState};
use items_service::audit::AuditClient;
use items_service::config::Config;
use items_service::items::{ItemStore, PgItemStore};
use items_service::metrics;
use items_service::utils::{mask_secret, shutdown_signal};

/// Items HTTP microservice.
#[derive(Parser, Debug)]
#[command(name = "items-service")]
#[command(about = "Create and list items stored in PostgreSQL")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run the database health probe once.
    CheckDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::CheckDb) => cmd_check_db(args.verbose).await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port), args.verbose).await,
        None => cmd_serve(args.port, args.verbose).await,
    }
}

/// Initialize the tracing subscriber from config and CLI flags.
fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("items_service=debug,info")
    } else {
        EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let (plain, json) = if config.log_json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>, verbose: bool) -> anyhow::Result<()> {
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(port) = port_override {
        config.port = port;
    }

    init_logging(&config, verbose);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    // Initialize metrics
    let handle = metrics::install_recorder()?;
    metrics::init_metrics();
    tokio::spawn(metrics::run_upkeep(handle.clone()));

    let store = PgItemStore::from_config(&config);
    let audit = AuditClient::new(&config).context("failed to build audit client")?;
    let state = AppState::new(Arc::new(store), Arc::new(audit), handle);

    info!("========================================");
    info!("Database: {}@{}:{}/{}", config.db_user, config.db_host, config.db_port, config.db_name);
    info!("Audit endpoint: {}", config.audit_log_url());
    info!("========================================");

    let addr = config.listen_addr().map_err(anyhow::Error::msg)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ITEMS SERVICE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Database: {}:{}/{}", config.db_host, config.db_port, config.db_name);
    println!("  Database User: {}", config.db_user);
    println!("  Database Password: {}", mask_secret(&config.db_password));
    println!("  Database Timeout: {}ms", config.db_timeout_ms);
    println!("  Audit Endpoint: {}", config.audit_log_url());
    println!("  Audit Timeout: {}ms", config.audit_timeout_ms);
    println!("  Listen: {}:{}", config.host, config.port);
    println!("  Log Format: {}", if config.log_json { "JSON" } else { "Text" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the health probe against the configured database.
async fn cmd_check_db(verbose: bool) -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config, verbose);

    println!("======================================================================");
    println!("ITEMS SERVICE - DATABASE CHECK");
    println!("======================================================================");
    println!(
        "Target: {}@{}:{}/{}",
        config.db_user, config.db_host, config.db_port, config.db_name
    );

    print!("Running SELECT 1... ");
    let store = PgItemStore::from_config(&config);
    match store.ping().await {
        Ok(()) => {
            println!("OK");
            println!("DATABASE CHECK PASSED");
            Ok(())
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            Err(anyhow::anyhow!("Database unreachable"))
        }
    }
}
