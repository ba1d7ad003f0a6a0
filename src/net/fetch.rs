//! Shared blocking HTTP plumbing.
//!
//! Every request runs on a short-lived worker thread that builds its own
//! client, so the UI thread never blocks on the network.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

pub const USER_AGENT: &str = "fibraplan/0.2 (planificador de rutas FTTH)";

const TIMEOUT: Duration = Duration::from_secs(15);

/// Error from any HTTP call.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Build the blocking client a worker thread uses for one request.
pub fn build_client() -> Result<reqwest::blocking::Client, FetchError> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError::new(format!("Client error: {}", e)))
}

/// POST a JSON body and decode a JSON response. Non-2xx statuses map to a
/// `Status NNN` error, matching the inline messages the UI shows.
pub fn post_json<B: Serialize, T: DeserializeOwned>(
    client: &reqwest::blocking::Client,
    url: Url,
    body: &B,
) -> Result<T, FetchError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(format!("Status {}", status.as_u16())));
    }
    response
        .json()
        .map_err(|e| FetchError::new(format!("Failed to read body: {}", e)))
}

/// POST a JSON body, discarding whatever the server answers with.
pub fn post_json_unit<B: Serialize>(
    client: &reqwest::blocking::Client,
    url: Url,
    body: &B,
) -> Result<(), FetchError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .map_err(|e| FetchError::new(format!("Request failed: {}", e)))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(format!("Status {}", status.as_u16())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_displays_message() {
        let e = FetchError::new("Status 500");
        assert_eq!(e.to_string(), "Status 500");
    }
}
