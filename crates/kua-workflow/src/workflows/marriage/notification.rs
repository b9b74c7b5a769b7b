//! Best-effort WhatsApp delivery.
//!
//! Every send is attempted exactly once. Missing configuration, transport errors and
//! provider rejections all come back as a [`DispatchResult`] so callers never have to
//! unwind on a failed notification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use super::phone::normalize_phone;
use crate::config::NotificationConfig;

pub const NOT_CONFIGURED_MESSAGE: &str = "WhatsApp API not configured";

/// Outcome of a single send attempt, returned verbatim to manual-dispatch callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn delivered(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn not_configured() -> Self {
        Self {
            success: false,
            data: None,
            message: Some(NOT_CONFIGURED_MESSAGE.to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Outbound notification hook so handlers can run against fakes.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn dispatch(&self, raw_phone: &str, message: &str) -> DispatchResult;
}

/// Failure of one configured send attempt.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("request to WhatsApp gateway failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("WhatsApp gateway responded with status {status}: {body}")]
    Provider { status: u16, body: String },
}

#[derive(Clone)]
struct GatewayEndpoint {
    url: String,
    api_key: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    target: &'a str,
    message: &'a str,
}

/// Fonnte-style gateway client: `POST {target, message}` with the raw key in
/// `Authorization`.
#[derive(Clone)]
pub struct WhatsAppDispatcher {
    http: reqwest::Client,
    endpoint: Option<GatewayEndpoint>,
}

impl std::fmt::Debug for WhatsAppDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppDispatcher")
            .field("url", &self.endpoint.as_ref().map(|endpoint| &endpoint.url))
            .finish_non_exhaustive()
    }
}

impl WhatsAppDispatcher {
    pub fn new(http: reqwest::Client, config: &NotificationConfig) -> Self {
        let endpoint = match (&config.api_url, &config.api_key) {
            (Some(url), Some(api_key)) if !url.trim().is_empty() && !api_key.trim().is_empty() => {
                Some(GatewayEndpoint {
                    url: url.clone(),
                    api_key: api_key.clone(),
                })
            }
            _ => None,
        };

        Self { http, endpoint }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(reqwest::Client::new(), config)
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn send(
        &self,
        endpoint: &GatewayEndpoint,
        target: &str,
        message: &str,
    ) -> Result<Value, DispatchError> {
        let response = self
            .http
            .post(&endpoint.url)
            .header(reqwest::header::AUTHORIZATION, &endpoint.api_key)
            .json(&OutboundMessage { target, message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DispatchError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[async_trait]
impl NotificationGateway for WhatsAppDispatcher {
    async fn dispatch(&self, raw_phone: &str, message: &str) -> DispatchResult {
        let Some(endpoint) = &self.endpoint else {
            info!("WhatsApp API not configured, skipping notification");
            return DispatchResult::not_configured();
        };

        let target = normalize_phone(raw_phone);
        match self.send(endpoint, &target, message).await {
            Ok(data) => {
                info!(%target, response = %data, "WhatsApp notification sent");
                DispatchResult::delivered(data)
            }
            Err(err) => {
                error!(%target, error = %err, "error sending WhatsApp notification");
                DispatchResult::failed(err.to_string())
            }
        }
    }
}
