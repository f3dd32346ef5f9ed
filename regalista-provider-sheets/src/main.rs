//! regalista-provider-sheets - Google Sheets provider for regalista
//!
//! This binary implements the regalista provider protocol, communicating
//! with regalista via JSON over stdin/stdout.
//!
//! The provider manages its own credentials and tokens:
//!   ~/.config/regalista/providers/sheets/app_config.toml
//!   ~/.config/regalista/providers/sheets/session.toml

mod app_config;
mod commands;
mod oauth;
mod session;
mod sheets;

use std::io::{self, BufRead, Write};

use regalista_core::SyncError;
use regalista_core::remote::protocol::{Command, Request, Response};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&SyncError::provider(format!("Failed to parse request: {}", e))),
        };

        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    let result = match request.command {
        Command::Initialize => commands::initialize::handle(request.params).await,
        Command::Authenticate => commands::authenticate::handle(request.params).await,
        Command::FindOrCreateDocument => {
            commands::find_or_create_document::handle(request.params).await
        }
        Command::Pull => commands::pull::handle(request.params).await,
        Command::Push => commands::push::handle(request.params).await,
    };

    match result {
        Ok(data) => Response::success(data),
        Err(e) => {
            let err = commands::to_sync_error(&e);
            tracing::warn!(command = ?request.command, kind = %err.kind, "{:#}", e);
            Response::error(&err)
        }
    }
}
