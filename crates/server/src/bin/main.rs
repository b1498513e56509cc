//! Binary entry point for the chatgate server.

use anyhow::Context;
use chatgate::{RoleRegistry, audit};
use clap::Parser;
use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Mutex};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Chatbot endpoint gated by token authentication and prompt validation.
#[derive(Parser, Debug)]
#[command(name = "chatgate", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// JSON file mapping tokens to roles, e.g. {"admin_token": "admin"}.
    /// Uses the built-in reference tokens when omitted.
    #[arg(long, value_name = "FILE")]
    registry: Option<PathBuf>,

    /// File that audit entries are appended to.
    #[arg(long, value_name = "FILE", default_value = "logs.log")]
    audit_log: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let audit_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.audit_log)
        .with_context(|| format!("failed to open audit log {}", cli.audit_log.display()))?;

    tracing_subscriber::registry()
        .with(audit::layer::<Registry, _>(Mutex::new(audit_file)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                ),
        )
        .init();

    let registry = match &cli.registry {
        Some(path) => RoleRegistry::from_path(path)
            .with_context(|| format!("failed to load registry {}", path.display()))?,
        None => RoleRegistry::reference(),
    };
    let roles: Vec<String> = registry.roles().map(|role| role.to_string()).collect();
    tracing::info!(credentials = registry.len(), roles = ?roles, "role registry loaded");

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, path = chatgate_server::CHATBOT_PATH, "listening");

    axum::serve(listener, chatgate_server::app(registry))
        .await
        .context("server error")
}
