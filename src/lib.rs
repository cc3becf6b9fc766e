use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, Level};

pub mod api;
pub mod config;
pub mod error;
pub mod patient;
pub mod repository;
pub mod service;
pub mod validation;

use config::{ConfigManager, LoggingConfig};
use service::PatientService;

#[derive(Parser)]
#[command(name = "patientdb")]
#[command(about = "patientdb - Patient records REST service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Start {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
        /// Config file (.toml or .json)
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "patientdb.toml")]
        output: String,
    },
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Start { port, config }) => {
            start_server(port, config).await?;
        }
        Some(Commands::Init { output }) => {
            run_init(&output).await?;
        }
        None => {
            start_server(None, None).await?;
        }
    }

    Ok(())
}

/// Install the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    let level: Level = config.level.parse()
        .map_err(|_| format!("Unknown log level: {}", config.level))?;

    let builder = tracing_subscriber::fmt().with_max_level(level);
    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| format!("Failed to install subscriber: {}", e))
}

async fn run_init(output: &str) -> Result<(), Box<dyn std::error::Error>> {
    if tokio::fs::try_exists(output).await? {
        return Err(format!("{} already exists", output).into());
    }

    let toml = ConfigManager::new().export_toml().await?;
    tokio::fs::write(output, toml).await?;
    println!("Wrote default configuration to {}", output);
    Ok(())
}

async fn start_server(port: Option<u16>, config_path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut manager = ConfigManager::new();
    if let Some(path) = &config_path {
        manager.load(path).await?;
    }
    manager.validate().await.map_err(|errors| errors.join("; "))?;

    let mut config = manager.get().await;
    if let Some(port) = port {
        config.server.port = port;
    }

    init_logging(&config.logging)?;
    info!("Starting patientdb...");
    if let Some(path) = manager.path() {
        info!("Loaded configuration from {}", path);
    }

    // Explicit wiring: storage -> service -> router
    let repo = repository::connect(&config.storage).await?;
    let service = PatientService::new(repo);
    let app = api::router(service, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("patientdb listening on {}", addr);
    info!("API Endpoints:");
    info!("  - Patients: http://{}/patient", addr);
    info!("  - Health: http://{}/health", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
