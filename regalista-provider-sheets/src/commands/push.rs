use anyhow::{Context, Result};
use regalista_core::remote::protocol::Push;
use regalista_core::sheet;

use crate::sheets::SheetsClient;

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: Push = serde_json::from_value(params)?;
    let document = params.document;
    let range = sheet::full_range(&document.sheet_name);

    let rows = sheet::people_to_rows(&params.people)?;
    let client = SheetsClient::connect().await?;

    client
        .clear_values(&document.id, &sheet::data_range(&document.sheet_name))
        .await
        .context("Failed to clear sheet")?;
    client
        .update_values(&document.id, &range, &rows)
        .await
        .context("Failed to write sheet")?;

    tracing::info!(people = params.people.len(), "pushed");
    Ok(serde_json::Value::Null)
}
