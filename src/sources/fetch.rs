//! JSON transport shared by the adapters

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::errors::{SourceError, SourceResult};
use crate::models::SourceType;

#[derive(Debug, Clone)]
pub struct JsonFetcher {
    client: Client,
}

impl JsonFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, source_type: SourceType, url: &str) -> SourceResult<Value> {
        self.send(source_type, url, self.client.get(url)).await
    }

    pub async fn post(&self, source_type: SourceType, url: &str, body: &Value) -> SourceResult<Value> {
        self.send(source_type, url, self.client.post(url).json(body))
            .await
    }

    async fn send(
        &self,
        source_type: SourceType,
        url: &str,
        request: RequestBuilder,
    ) -> SourceResult<Value> {
        debug!("Fetching {} feed from {}", source_type, url);

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: format!("{url} responded with {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))?;
        debug!("Received {} bytes from {}", body.len(), url);

        serde_json::from_str(&body)
            .map_err(|e| SourceError::parse(source_type.as_str(), format!("{url}: {e}")))
    }
}
