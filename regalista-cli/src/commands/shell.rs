use std::io::Write;

use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use regalista_core::sync::SyncEvent;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::App;
use crate::utils::tui::split_words;
use crate::{Cli, Commands, run_command};

const PROMPT: &str = "regalista> ";

enum Step {
    Line(Option<String>),
    Sync(SyncEvent),
}

/// Read commands line by line while the orchestrator pushes in the
/// background. Exits on `exit`, `quit` or end of input, flushing first.
pub async fn run(app: &mut App) -> Result<()> {
    app.interactive = true;
    println!("Type a command (e.g. `list`, `add Ana -d 3 -m mayo`), `help`, or `exit`.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    loop {
        let step = tokio::select! {
            line = lines.next_line() => Step::Line(line?),
            event = app.sync.next_event() => Step::Sync(event),
        };

        match step {
            Step::Line(None) => break,
            Step::Line(Some(line)) => {
                let line = line.trim();
                if line == "exit" || line == "quit" {
                    break;
                }
                if !line.is_empty() {
                    if let Err(e) = run_line(app, line).await {
                        eprintln!("{}", format!("{:#}", e).red());
                    }
                }
                prompt();
            }
            Step::Sync(event) => report(&event),
        }
    }

    app.flush().await;
    Ok(())
}

async fn run_line(app: &mut App, line: &str) -> Result<()> {
    let words = split_words(line).map_err(|e| anyhow::anyhow!(e))?;
    let args = std::iter::once("regalista".to_string()).chain(words);

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            // Help and usage errors are printed by clap.
            let _ = e.print();
            return Ok(());
        }
    };

    match cli.command {
        Commands::Shell => anyhow::bail!("Already in the shell"),
        command => run_command(app, command).await,
    }
}

fn report(event: &SyncEvent) {
    match event {
        SyncEvent::PushStarted => tracing::debug!("push started"),
        SyncEvent::PushDropped => tracing::debug!("push dropped, another is running"),
        SyncEvent::PushSucceeded => println!("\r{}", "✓ synced".green().dimmed()),
        SyncEvent::PushFailed(err) => {
            if !err.is_silent() {
                println!("\r{}", err.user_message().red());
            }
        }
    }
    if !matches!(event, SyncEvent::PushStarted | SyncEvent::PushDropped) {
        prompt();
    }
}

fn prompt() {
    print!("{}", PROMPT);
    let _ = std::io::stdout().flush();
}
