//! HTTP Client
//!
//! Async client construction and a JSON GET helper shared by the
//! indexer sources. One client is built per checker so its connection
//! pool is reused across every unit in a run.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

use crate::error::{BrainWalletError, BrainWalletResult};

/// Connect timeout applied to every client
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default user agent
pub const DEFAULT_USER_AGENT: &str = concat!("brain-wallet/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given per-request timeout
pub fn build_client(timeout: Duration, user_agent: &str) -> BrainWalletResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(5)
        .tcp_nodelay(true)
        .user_agent(user_agent)
        .build()
        .map_err(|e| BrainWalletError::network_error(format!("Failed to create HTTP client: {}", e)))
}

/// GET `url` and decode the body as JSON.
///
/// Non-2xx statuses become `HttpStatus`; a body that does not decode
/// becomes `ParseError`.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> BrainWalletResult<T> {
    let body = get_text(client, url).await?;
    parse_json(&body)
}

/// GET `url` and return the raw body of a 2xx response
pub async fn get_text(client: &Client, url: &str) -> BrainWalletResult<String> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(BrainWalletError::http_status(status.as_u16())
            .with_details(extract_domain(url)));
    }

    Ok(response.text().await?)
}

/// Bound `fut` by `limit`; expiry becomes a `Timeout` naming `what`
pub async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> BrainWalletResult<T>
where
    F: Future<Output = BrainWalletResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(BrainWalletError::timeout(format!(
            "{} did not respond within {}ms",
            what,
            limit.as_millis()
        ))),
    }
}

/// Decode a response body, mapping failures to `ParseError`
pub fn parse_json<T: DeserializeOwned>(body: &str) -> BrainWalletResult<T> {
    serde_json::from_str(body).map_err(|e| {
        BrainWalletError::parse_error("Malformed indexer response").with_details(e.to_string())
    })
}

/// Extract the host part of a URL for logs and source names
pub fn extract_domain(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
