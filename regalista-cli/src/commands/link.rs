use anyhow::Result;
use dialoguer::Select;
use owo_colors::OwoColorize;
use regalista_core::Person;
use regalista_core::sync::{LinkOutcome, Resolution};

use crate::app::App;
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(app: &mut App, demo: bool) -> Result<()> {
    let linked = app.sync.status().document_id.is_some();
    if !linked && demo != app.is_demo() {
        app.switch_mode(demo);
    } else if linked && demo && !app.is_demo() {
        anyhow::bail!("Already linked to a spreadsheet. Run `regalista unlink` first.");
    }

    if let Some(info) = app.initialize_provider().await? {
        if !info.configured {
            anyhow::bail!(
                "{}",
                info.setup_hint
                    .unwrap_or_else(|| "The provider is not configured.".to_string())
            );
        }
    }

    if linked {
        println!("Signing in again...");
    } else if app.is_demo() {
        println!("Linking in demo mode (nothing leaves this device)...");
    } else {
        println!("Signing in to Google...");
    }

    let outcome = match app.sync.link().await {
        Ok(outcome) => outcome,
        Err(e) if e.is_silent() => {
            println!("{}", e.user_message().dimmed());
            return Ok(());
        }
        Err(e) => anyhow::bail!(e.user_message()),
    };

    match outcome {
        LinkOutcome::Linked => {
            println!("{}", app.sync.status().render());
            Ok(())
        }
        LinkOutcome::Conflict { local, remote } => {
            print_conflict(&local, &remote);
            if app.interactive {
                println!(
                    "Run {} or {} to continue.",
                    "resolve adopt".bold(),
                    "resolve keep".bold()
                );
                return Ok(());
            }

            let items = [
                format!("Use the spreadsheet ({} people)", remote.len()),
                format!("Keep this device's list ({} people)", local.len()),
                "Cancel".to_string(),
            ];
            let selection = Select::new()
                .with_prompt("The spreadsheet already has data")
                .items(&items)
                .default(0)
                .interact()?;

            match selection {
                0 => resolve(app, Resolution::AdoptRemote).await,
                1 => resolve(app, Resolution::KeepLocal).await,
                _ => {
                    app.sync.cancel_link();
                    println!("{}", "Link cancelled.".dimmed());
                    Ok(())
                }
            }
        }
    }
}

pub async fn resolve(app: &mut App, resolution: Resolution) -> Result<()> {
    let spinner = create_spinner("Linking".to_string());
    let result = app.sync.resolve_conflict(resolution).await;
    spinner.finish_and_clear();

    result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("{}", app.sync.status().render());
    Ok(())
}

pub fn unlink(app: &mut App) -> Result<()> {
    if app.sync.status().document_id.is_none() {
        println!("{}", "Not linked.".dimmed());
        return Ok(());
    }
    app.sync.unlink();
    println!("Unlinked. Your list stays on this device.");
    Ok(())
}

fn print_conflict(local: &[Person], remote: &[Person]) {
    println!("\n{}", "The spreadsheet already has data.".yellow());
    println!("   This device: {}", names(local).dimmed());
    println!("   Spreadsheet: {}\n", names(remote).dimmed());
}

fn names(people: &[Person]) -> String {
    const SHOWN: usize = 5;
    if people.is_empty() {
        return "(empty)".to_string();
    }
    let mut shown: Vec<&str> = people.iter().take(SHOWN).map(|p| p.name.as_str()).collect();
    if people.len() > SHOWN {
        shown.push("...");
    }
    shown.join(", ")
}
