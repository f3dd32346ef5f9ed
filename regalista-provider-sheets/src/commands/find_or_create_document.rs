use anyhow::{Context, Result};
use regalista_core::remote::RemoteDocument;
use regalista_core::remote::protocol::FindOrCreateDocument;
use regalista_core::sheet;

use crate::sheets::SheetsClient;

pub async fn handle(params: serde_json::Value) -> Result<serde_json::Value> {
    let params: FindOrCreateDocument = serde_json::from_value(params)?;
    let client = SheetsClient::connect().await?;

    // Search before create, so two devices converge on the same sheet.
    let id = match client.find_spreadsheet(&params.title).await? {
        Some(id) => {
            tracing::info!(id = %id, "found existing spreadsheet");
            id
        }
        None => {
            let id = client
                .create_spreadsheet(&params.title, &params.sheet_name)
                .await
                .context("Failed to create spreadsheet")?;
            client
                .update_values(
                    &id,
                    &sheet::full_range(&params.sheet_name),
                    &[sheet::header_row()],
                )
                .await
                .context("Failed to write header row")?;
            tracing::info!(id = %id, "created spreadsheet");
            id
        }
    };

    Ok(serde_json::to_value(RemoteDocument {
        id,
        sheet_name: params.sheet_name,
    })?)
}
