//! HTTP delivery of a notification to TaskCall
//!
//! Features:
//! - Endpoint = API base URL + integration key
//! - Optional proxy from the configuration file
//! - JSON body serialized once, POSTed once per attempt
//! - Sequential retry driven by `RetryPolicy`

use crate::config::Config;
use crate::error::{AttemptError, NotifyError};
use crate::payload::NotificationPayload;
use crate::retry::RetryPolicy;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Proxy, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a delivered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub status: StatusCode,
    pub attempts: u32,
    pub elapsed: Duration,
}

pub struct TaskCallClient {
    http: reqwest::Client,
    api_url: String,
}

impl TaskCallClient {
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let mut builder = reqwest::Client::builder();

        if config.proxy.enabled {
            let proxy_url = config.proxy.url();
            let mut proxy = Proxy::all(&proxy_url).map_err(NotifyError::Client)?;
            if !config.proxy.username.is_empty() {
                proxy = proxy.basic_auth(&config.proxy.username, &config.proxy.password);
            }
            builder = builder.proxy(proxy);
            info!("Routing TaskCall requests through proxy {}", proxy_url);
        }

        let http = builder.build().map_err(NotifyError::Client)?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    pub fn endpoint(&self, integration_key: &str) -> String {
        format!("{}{}", self.api_url, integration_key)
    }

    /// POST `payload` until TaskCall accepts it or `policy` gives up.
    ///
    /// The payload is validated first; a rejected payload never reaches the network.
    pub async fn deliver(
        &self,
        payload: &NotificationPayload,
        policy: &RetryPolicy,
    ) -> Result<DeliveryReport, NotifyError> {
        payload.validate()?;
        let integration_key = payload
            .integration_key()
            .ok_or(NotifyError::MissingIntegrationKey)?;

        let url = self.endpoint(integration_key);
        let body = serde_json::to_vec(payload)?;

        info!("Processing request for - {}", payload.describe());
        debug!("Posting {} bytes to {}", body.len(), self.api_url);

        let started = Instant::now();
        let outcome = policy
            .run(|_| self.post_once(&url, body.clone(), policy))
            .await;

        match outcome {
            Ok(succeeded) => {
                info!("Succeeded");
                Ok(DeliveryReport {
                    status: succeeded.value,
                    attempts: succeeded.attempts,
                    elapsed: started.elapsed(),
                })
            }
            Err(exhausted) => Err(NotifyError::DeliveryFailed {
                attempts: exhausted.attempts,
                last_error: exhausted.last_error,
            }),
        }
    }

    async fn post_once(
        &self,
        url: &str,
        body: Vec<u8>,
        policy: &RetryPolicy,
    ) -> Result<StatusCode, AttemptError> {
        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT_LANGUAGE, "en")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if policy.accepts(status) {
            return Ok(status);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AttemptError::Rejected { status, body })
    }
}
