//! Google OAuth for installed apps: consent URL, local callback listener
//! and token endpoint calls.

use anyhow::{Context, Result};
use regalista_core::SyncError;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::app_config::AppConfig;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
];

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const REDIRECT_PORT: u16 = 8085;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

pub fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

pub fn consent_url(app: &AppConfig, state: &str) -> Result<url::Url> {
    let scope = SCOPES.join(" ");
    let redirect_uri = redirect_uri();
    url::Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", app.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .context("Failed to build consent URL")
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

pub async fn exchange_code(app: &AppConfig, code: &str) -> Result<TokenResponse> {
    let redirect_uri = redirect_uri();
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", app.client_id.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
    ];
    if let Some(secret) = &app.client_secret {
        form.push(("client_secret", secret.as_str()));
    }
    post_token(&form).await
}

pub async fn refresh(app: &AppConfig, refresh_token: &str) -> Result<TokenResponse> {
    let mut form = vec![
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", app.client_id.as_str()),
    ];
    if let Some(secret) = &app.client_secret {
        form.push(("client_secret", secret.as_str()));
    }
    post_token(&form).await
}

async fn post_token(form: &[(&str, &str)]) -> Result<TokenResponse> {
    let response = reqwest::Client::new()
        .post(TOKEN_URL)
        .form(form)
        .send()
        .await
        .map_err(|e| SyncError::unreachable(format!("Token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(token_error(status, &error_text).into());
    }

    response
        .json()
        .await
        .context("Failed to parse token response")
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
}

/// Classify a failed token request. Only a rejected grant means the
/// session is gone; outages stay retryable.
pub fn token_error(status: StatusCode, body: &str) -> SyncError {
    let code = serde_json::from_str::<TokenErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_default();

    if code == "invalid_grant" || status == StatusCode::UNAUTHORIZED {
        SyncError::session_expired(format!("Google rejected the refresh token ({status})"))
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        SyncError::unreachable(format!("Token endpoint returned {status}"))
    } else {
        SyncError::provider(format!("Token endpoint rejected the request ({status}): {body}"))
    }
}

/// What the browser sent back to the redirect URI.
#[derive(Debug, PartialEq, Eq)]
pub enum Callback {
    Code(String),
    Denied,
}

/// Parse the request line of the OAuth redirect, checking `state`.
pub fn parse_callback(request_line: &str, expected_state: &str) -> Result<Callback> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;
    let param = |key: &str| {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        if error == "access_denied" {
            return Ok(Callback::Denied);
        }
        anyhow::bail!("Authorization failed: {}", error);
    }

    let state = param("state").ok_or_else(|| anyhow::anyhow!("No state in callback"))?;
    if state != expected_state {
        anyhow::bail!("OAuth state mismatch");
    }

    let code = param("code").ok_or_else(|| anyhow::anyhow!("No code in callback"))?;
    Ok(Callback::Code(code))
}

/// Accept one redirect on the local listener and answer the browser.
pub async fn wait_for_callback(expected_state: &str) -> Result<Callback> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("Failed to accept OAuth callback")?;

        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .await
            .context("Failed to read OAuth callback request line")?;

        // Browsers may request other paths (e.g. /favicon.ico) first.
        if !request_line.contains("/callback") {
            let mut stream = reader.into_inner();
            let _ = stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n")
                .await;
            continue;
        }

        let callback = parse_callback(&request_line, expected_state)?;

        let body = match callback {
            Callback::Code(_) => "<h1>Authentication successful!</h1>",
            Callback::Denied => "<h1>Sign-in cancelled.</h1>",
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\n\
            Content-Type: text/html; charset=utf-8\r\n\
            Connection: close\r\n\
            \r\n\
            <html><body>{body}\
            <p>You can close this window and return to the terminal.</p>\
            </body></html>"
        );

        let mut stream = reader.into_inner();
        stream
            .write_all(response.as_bytes())
            .await
            .context("Failed to write OAuth callback response")?;
        stream.flush().await?;

        return Ok(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regalista_core::SyncErrorKind;

    #[test]
    fn test_callback_code() {
        let line = "GET /callback?state=s1&code=4%2Fabc&scope=x HTTP/1.1\r\n";
        assert_eq!(
            parse_callback(line, "s1").unwrap(),
            Callback::Code("4/abc".into())
        );
    }

    #[test]
    fn test_callback_access_denied_is_cancel() {
        let line = "GET /callback?error=access_denied&state=s1 HTTP/1.1\r\n";
        assert_eq!(parse_callback(line, "s1").unwrap(), Callback::Denied);
    }

    #[test]
    fn test_callback_state_mismatch() {
        let line = "GET /callback?state=other&code=abc HTTP/1.1\r\n";
        assert!(parse_callback(line, "s1").is_err());
    }

    #[test]
    fn test_invalid_grant_is_expired_session() {
        let body = r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#;
        let err = token_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind, SyncErrorKind::SessionExpired);
    }

    #[test]
    fn test_token_outage_is_unreachable() {
        let err = token_error(StatusCode::SERVICE_UNAVAILABLE, "<html>try later</html>");
        assert_eq!(err.kind, SyncErrorKind::RemoteUnreachable);
        let err = token_error(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.kind, SyncErrorKind::RemoteUnreachable);
    }

    #[test]
    fn test_other_token_errors_are_provider_errors() {
        let err = token_error(StatusCode::BAD_REQUEST, r#"{"error":"invalid_client"}"#);
        assert_eq!(err.kind, SyncErrorKind::Provider);
    }

    #[test]
    fn test_consent_url_requests_both_scopes() {
        let app = AppConfig {
            client_id: "id.apps.googleusercontent.com".into(),
            client_secret: None,
        };
        let url = consent_url(&app, "s1").unwrap();
        let scope = url
            .query_pairs()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(scope.contains("auth/spreadsheets"));
        assert!(scope.contains("auth/drive.file"));
    }
}
