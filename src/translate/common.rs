use std::time::Duration;
use reqwest::Client;
use tracing::debug;

use crate::error::{Result, TranslatorError};

/// Time allowed to establish a connection to a provider
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Time allowed for the whole request, including reading the body
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client shared by the providers
pub fn http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("seltrans/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TranslatorError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// POST a form-urlencoded body and parse the response as JSON.
///
/// Transport failures are classified into connection, timeout and generic
/// request failures; anything wrong with the response itself is a request
/// failure.
pub async fn post_form(
    client: &Client,
    url: &str,
    form: &[(&str, String)],
) -> Result<serde_json::Value> {
    debug!("Sending translation request to: {}", url);

    let response = client
        .post(url)
        .form(form)
        .send()
        .await
        .map_err(TranslatorError::from_transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(TranslatorError::RequestFailure(format!(
            "Provider returned HTTP {}",
            status
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(TranslatorError::from_transport)?;

    serde_json::from_slice(&body)
        .map_err(|e| TranslatorError::RequestFailure(format!("Failed to parse response: {}", e)))
}

/// Hard-wrap `text` every `width` characters, regardless of word boundaries.
pub fn wrap_columns(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
