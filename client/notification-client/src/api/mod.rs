//! REST client for the notification endpoints
//!
//! Used for the store's initial load and to forward user actions (mark read,
//! delete) to the server.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use resilience::{retry::with_retry_if, RetryConfig};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::credentials::CredentialSource;
use crate::error::{ClientError, Result};
use crate::models::{ApiResponse, NotificationPage, UnreadCount};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// One page of notifications, most recent first
    async fn list(&self, limit: u32, offset: u32) -> Result<NotificationPage>;

    async fn unread_count(&self) -> Result<u64>;

    async fn mark_as_read(&self, id: i64) -> Result<()>;

    async fn mark_all_as_read(&self) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct HttpNotificationApi {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    retry: RetryConfig,
}

impl HttpNotificationApi {
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let token = self
            .credentials
            .token()
            .ok_or(ClientError::MissingCredential)?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }

    async fn fetch_page(&self, limit: u32, offset: u32) -> Result<NotificationPage> {
        let request = self
            .client
            .get(self.url("/notifications"))
            .query(&[("limit", limit), ("offset", offset)]);
        self.send(request).await?.ok_or_else(|| missing_data("/notifications"))
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn list(&self, limit: u32, offset: u32) -> Result<NotificationPage> {
        tracing::debug!(limit, offset, "fetching notifications");
        with_retry_if(
            self.retry.clone(),
            || self.fetch_page(limit, offset),
            ClientError::is_transient,
        )
        .await
        .map_err(ClientError::from)
    }

    async fn unread_count(&self) -> Result<u64> {
        let request = self.client.get(self.url("/notifications/unread-count"));
        let count: UnreadCount = self
            .send(request)
            .await?
            .ok_or_else(|| missing_data("/notifications/unread-count"))?;
        Ok(count.count)
    }

    async fn mark_as_read(&self, id: i64) -> Result<()> {
        let request = self.client.put(self.url(&format!("/notifications/{id}/read")));
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn mark_all_as_read(&self) -> Result<()> {
        let request = self.client.put(self.url("/notifications/read-all"));
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/notifications/{id}")));
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }
}

/// Interpret a response body in the platform envelope.
///
/// A failure status wins over the envelope; an unparseable failure body
/// becomes the error message as-is.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<Option<T>> {
    let success_status = (200..300).contains(&status);

    let envelope: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if success_status => return Err(ClientError::Decode(e)),
        Err(_) => {
            let message = if body.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                body.trim().to_string()
            };
            return Err(ClientError::Api { status, message });
        }
    };

    if !success_status || !envelope.success {
        return Err(ClientError::Api {
            status,
            message: envelope.failure_reason(),
        });
    }

    Ok(envelope.data)
}

fn missing_data(endpoint: &str) -> ClientError {
    ClientError::Api {
        status: 200,
        message: format!("No data in response from {endpoint}"),
    }
}
