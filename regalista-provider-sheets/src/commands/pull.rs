use anyhow::{Context, Result};
use regalista_core::remote::protocol::Pull;
use regalista_core::sheet;

use crate::sheets::SheetsClient;

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: Pull = serde_json::from_value(params)?;
    let document = params.document;
    let client = SheetsClient::connect().await?;

    let rows = client
        .get_values(&document.id, &sheet::full_range(&document.sheet_name))
        .await
        .context("Failed to read sheet")?;

    let people = sheet::rows_to_people(&rows);
    tracing::info!(rows = rows.len(), people = people.len(), "pulled");

    Ok(serde_json::to_value(people)?)
}
