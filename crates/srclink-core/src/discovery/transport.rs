//! HTTP transport used for metadata discovery.
//!
//! The trait exists so discovery can be exercised without a network; the
//! production implementation wraps a `reqwest::Client`.

use async_trait::async_trait;
use url::Url;

use crate::error::TransportError;

/// Performs a single GET request and returns the response body.
///
/// Implementations must not retry. Cancellation happens by dropping the
/// returned future.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<String, TransportError>;
}

/// Transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Use an existing client, e.g. one shared with other components.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<String, TransportError> {
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
