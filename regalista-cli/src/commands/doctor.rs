use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use regalista_core::config::RegalistaConfig;
use regalista_core::remote::AnyRemote;

use crate::app::App;
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(app: &mut App, reset: bool) -> Result<()> {
    if reset {
        return reset_device(app);
    }

    println!("{}", "Local".bold());
    match RegalistaConfig::config_path() {
        Ok(path) => println!("   Config: {}", path.display()),
        Err(e) => println!("   Config: {}", e.to_string().red()),
    }
    println!("   Data: {}", app.config.data_path().display());
    println!("   People: {}", app.sync.people().len());
    println!();

    println!("{}", "Provider".bold());
    match app.sync.remote() {
        AnyRemote::Demo(_) => println!("   {}", "Demo mode, no provider in use".dimmed()),
        AnyRemote::Provider(remote) => {
            let provider = remote.provider();
            match provider.binary_path() {
                Ok(path) => println!("   Binary: {}", path.display()),
                Err(e) => {
                    println!("   {}", e.message.red());
                    return Ok(());
                }
            }

            let spinner = create_spinner("   Asking provider".to_string());
            let result = remote.initialize().await;
            spinner.finish_and_clear();

            match result {
                Ok(info) => {
                    let client_id = info.client_id.as_deref().unwrap_or("(not set)");
                    println!("   Client ID: {}", client_id);
                    // Must match the authorized redirect URI of the OAuth client.
                    println!("   Redirect URI: {}", info.redirect_uri.bold());
                    println!("   Scopes:");
                    for scope in &info.scopes {
                        println!("     {}", scope.dimmed());
                    }
                    if let Some(hint) = info.setup_hint {
                        println!("\n{}", hint.yellow());
                    } else {
                        println!("   {}", "Ready".green());
                    }
                }
                Err(e) => println!("   {}", e.user_message().red()),
            }
        }
    }
    println!();

    println!("{}", app.sync.status().render());
    Ok(())
}

fn reset_device(app: &mut App) -> Result<()> {
    if app.interactive {
        anyhow::bail!("Run `regalista doctor --reset` outside the shell");
    }

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Delete all {} people and the sync link from this device?",
            app.sync.people().len()
        ))
        .default(false)
        .interact()?;

    if confirmed {
        app.sync.reset();
        println!("Local data wiped. The spreadsheet was not touched.");
    }
    Ok(())
}
