//! Client construction for OpenAI-compatible APIs.

use crate::error::{Result, YtsumError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the OpenAI-compatible API at `api_base`.
pub fn create_client(api_base: &str, api_key: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    if api_key.trim().is_empty() {
        return Err(YtsumError::Config("API key is empty".to_string()));
    }
    reqwest::Url::parse(api_base)
        .map_err(|e| YtsumError::Config(format!("Invalid API base '{}': {}", api_base, e)))?;

    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_input() {
        let timeout = Duration::from_secs(5);
        assert!(create_client("https://integrate.api.nvidia.com/v1", "", timeout).is_err());
        assert!(create_client("integrate", "nvapi-key", timeout).is_err());
        assert!(create_client("https://integrate.api.nvidia.com/v1", "nvapi-key", timeout).is_ok());
    }
}
