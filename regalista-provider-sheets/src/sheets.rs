//! Thin Google Sheets v4 / Drive v3 client over reqwest.

use std::time::Duration;

use anyhow::{Context, Result};
use regalista_core::{SyncError, SyncErrorKind};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::session::Session;

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_ABOUT: &str = "https://www.googleapis.com/drive/v3/about";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct SheetsClient {
    http: reqwest::Client,
    session: Session,
}

impl SheetsClient {
    pub async fn connect() -> Result<Self> {
        Self::from_session(Session::load_valid().await?)
    }

    pub fn from_session(session: Session) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SheetsClient { http, session })
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    fn request(&self, method: Method, url: url::Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.session.access_token())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, &body);
        if err.kind == SyncErrorKind::SessionExpired {
            self.session.delete();
        }
        Err(err.into())
    }

    /// Email of the signed-in account, if Drive reports it.
    pub async fn account_email(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct About {
            user: AboutUser,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AboutUser {
            email_address: Option<String>,
        }

        let url = url::Url::parse_with_params(DRIVE_ABOUT, &[("fields", "user(emailAddress)")]).ok()?;
        let response = self.send(self.request(Method::GET, url)).await.ok()?;
        let about: About = response.json().await.ok()?;
        about.user.email_address
    }

    /// Id of a non-trashed spreadsheet named `title`, most recently
    /// modified first.
    pub async fn find_spreadsheet(&self, title: &str) -> Result<Option<String>> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            title.replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let url = url::Url::parse_with_params(
            DRIVE_FILES,
            &[
                ("q", query.as_str()),
                ("spaces", "drive"),
                ("orderBy", "modifiedTime desc"),
                ("fields", "files(id,name)"),
            ],
        )?;

        #[derive(Deserialize)]
        struct FileList {
            #[serde(default)]
            files: Vec<DriveFile>,
        }
        #[derive(Deserialize)]
        struct DriveFile {
            id: String,
        }

        let list: FileList = self
            .send(self.request(Method::GET, url))
            .await?
            .json()
            .await
            .context("Failed to parse Drive file list")?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    pub async fn create_spreadsheet(&self, title: &str, sheet_name: &str) -> Result<String> {
        let url = url::Url::parse(SHEETS_BASE)?;
        let body = json!({
            "properties": { "title": title },
            "sheets": [{ "properties": { "title": sheet_name } }],
        });

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Created {
            spreadsheet_id: String,
        }

        let created: Created = self
            .send(self.request(Method::POST, url).json(&body))
            .await?
            .json()
            .await
            .context("Failed to parse created spreadsheet")?;

        Ok(created.spreadsheet_id)
    }

    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = values_url(spreadsheet_id, range)?;

        #[derive(Deserialize)]
        struct ValueRange {
            #[serde(default)]
            values: Vec<Vec<serde_json::Value>>,
        }

        let values: ValueRange = self
            .send(self.request(Method::GET, url))
            .await?
            .json()
            .await
            .context("Failed to parse sheet values")?;

        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    pub async fn clear_values(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        let url = values_url(spreadsheet_id, &format!("{range}:clear"))?;
        self.send(self.request(Method::POST, url).json(&json!({})))
            .await?;
        Ok(())
    }

    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<()> {
        let mut url = values_url(spreadsheet_id, range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        self.send(self.request(Method::PUT, url).json(&body)).await?;
        Ok(())
    }
}

fn values_url(spreadsheet_id: &str, range: &str) -> Result<url::Url> {
    let mut url = url::Url::parse(SHEETS_BASE)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Invalid Sheets base URL"))?
        .push(spreadsheet_id)
        .push("values")
        .push(range);
    Ok(url)
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn request_error(e: reqwest::Error) -> SyncError {
    SyncError::unreachable(format!("Google API request failed: {e}"))
}

/// Map a non-success API status to a sync error kind.
pub fn status_error(status: StatusCode, body: &str) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED => SyncError::session_expired("Google rejected the session"),
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => SyncError::new(
            SyncErrorKind::DocumentAccessDenied,
            format!("Spreadsheet not accessible ({status})"),
        ),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            SyncError::unreachable(format!("Google API unavailable ({status})"))
        }
        _ => SyncError::provider(format!("Google API error ({status}): {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED, "").kind,
            SyncErrorKind::SessionExpired
        );
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, "").kind,
            SyncErrorKind::DocumentAccessDenied
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, "").kind,
            SyncErrorKind::DocumentAccessDenied
        );
        assert_eq!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "").kind,
            SyncErrorKind::RemoteUnreachable
        );
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, "bad range").kind,
            SyncErrorKind::Provider
        );
    }

    #[test]
    fn test_values_url_keeps_range_in_one_segment() {
        let url = values_url("sheet-id", "'Personas'!A1:H").unwrap();
        assert!(url.as_str().starts_with(
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-id/values/"
        ));
        assert_eq!(url.path_segments().unwrap().count(), 5);
    }

    #[test]
    fn test_cells_become_strings() {
        assert_eq!(cell_to_string(json!("Ana")), "Ana");
        assert_eq!(cell_to_string(json!(1990)), "1990");
        assert_eq!(cell_to_string(json!(true)), "true");
        assert_eq!(cell_to_string(serde_json::Value::Null), "");
    }
}
