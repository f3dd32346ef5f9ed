use anyhow::Result;
use regalista_core::remote::protocol::{Initialize, ProviderInfo};

use crate::app_config::{self, AppConfig};
use crate::oauth;

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let _: Initialize = serde_json::from_value(params)?;

    let app = AppConfig::load_optional()?;
    let setup_hint = match &app {
        Some(_) => None,
        None => Some(app_config::setup_hint(&app_config::path()?)),
    };

    let info = ProviderInfo {
        configured: app.is_some(),
        client_id: app.map(|a| a.client_id),
        redirect_uri: oauth::redirect_uri(),
        scopes: oauth::SCOPES.iter().map(|s| s.to_string()).collect(),
        setup_hint,
    };

    Ok(serde_json::to_value(info)?)
}
