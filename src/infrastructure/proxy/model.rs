// Wire format of the credential-forwarding proxy.
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AuthenticateRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub token_secret: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest<'a> {
    pub token: &'a str,
    pub token_secret: &'a str,
    pub url: &'a str,
    pub title: &'a str,
    pub status: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AddResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
}

/// Best effort error text from a proxy error body.
pub fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(200).collect())
    }
}
