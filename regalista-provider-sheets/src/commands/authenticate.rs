use std::time::Duration;

use anyhow::{Context, Result};
use regalista_core::SyncError;
use regalista_core::person::new_id;
use regalista_core::remote::AuthToken;
use regalista_core::remote::protocol::Authenticate;

use crate::app_config::AppConfig;
use crate::oauth::{self, Callback};
use crate::session::{Session, SessionData};
use crate::sheets::SheetsClient;

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: Authenticate = serde_json::from_value(params)?;
    let app = AppConfig::load()?;

    let state = new_id();
    let auth_url = oauth::consent_url(&app, &state)?;

    eprintln!("\nOpen this URL in your browser to sign in to Google:\n");
    eprintln!("{}\n", auth_url);

    // Try to open the browser automatically
    if open::that(auth_url.as_str()).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    // A closed consent tab never calls back, so it also ends here.
    let callback = tokio::time::timeout(
        Duration::from_secs(params.timeout_secs),
        oauth::wait_for_callback(&state),
    )
    .await
    .map_err(|_| SyncError::auth_timeout(params.timeout_secs))??;

    let code = match callback {
        Callback::Code(code) => code,
        Callback::Denied => return Err(SyncError::popup_cancelled().into()),
    };

    let tokens = oauth::exchange_code(&app, &code)
        .await
        .context("Failed to exchange authorization code")?;

    let session = Session::new(SessionData::from_tokens(tokens, None)?)?;
    let client = SheetsClient::from_session(session)?;
    let account = client.account_email().await;

    let mut session = client.into_session();
    session.set_account(account);
    session.save()?;

    tracing::info!(account = ?session.account(), "signed in");

    Ok(serde_json::to_value(AuthToken {
        access_token: session.access_token().to_string(),
        account: session.account().map(str::to_string),
    })?)
}
