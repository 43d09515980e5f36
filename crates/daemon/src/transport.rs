use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lifeline_core::LocationPayload;
use reqwest::Client;

use crate::collaborators::{CollaboratorError, NotificationTransport};

/// Posts location payloads as JSON to a fixed endpoint.
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationTransport for HttpTransport {
    async fn post(&self, payload: &LocationPayload) -> Result<(), CollaboratorError> {
        let delivery_err = |reason: String| CollaboratorError::Delivery {
            email: payload.email.clone(),
            reason,
        };

        self.client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| delivery_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| delivery_err(e.to_string()))?;
        Ok(())
    }
}
