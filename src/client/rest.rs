//! `reqwest` implementation of the remote collaborators

use super::envelope::{self, GenerateRequest, UpdateRequest};
use super::error::ClientError;
use crate::config::StoredeskConfig;
use crate::items::{ItemId, RawListing};
use crate::remote::{DescriptionService, ListingSource, RemoteError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Client for the storefront backend's `/api` routes
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
    timeout: Duration,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, session_token: Option<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token,
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &StoredeskConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.session_token.clone(),
            config.request_timeout(),
        )
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the status with the raw body
    async fn send(&self, request: RequestBuilder) -> Result<(u16, String), ClientError> {
        let response = self.authorize(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// `GET /api/products`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or an unreadable response.
    pub async fn products(&self) -> Result<RawListing, ClientError> {
        let url = self.url("/api/products");
        tracing::debug!(%url, "fetching listing");
        let (status, body) = self.send(self.client.get(&url)).await?;
        envelope::parse_listing(status, &body)
    }

    /// `POST /api/generate`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected request.
    pub async fn generate_description(&self, item: ItemId) -> Result<String, ClientError> {
        let url = self.url("/api/generate");
        tracing::debug!(%url, %item, "requesting description");
        let request = self.client.post(&url).json(&GenerateRequest::single(item));
        let (status, body) = self.send(request).await?;
        envelope::parse_generate(status, &body)
    }

    /// `POST /api/update`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport failure or a rejected request.
    pub async fn update_description(&self, item: ItemId, description: &str) -> Result<(), ClientError> {
        let url = self.url("/api/update");
        tracing::debug!(%url, %item, "updating description");
        let request = self.client.post(&url).json(&UpdateRequest {
            description,
            product_id: item,
        });
        let (status, body) = self.send(request).await?;
        envelope::parse_apply(status, &body)
    }
}

#[async_trait]
impl ListingSource for RestClient {
    async fn fetch_listing(&self) -> Result<RawListing, RemoteError> {
        Ok(self.products().await?)
    }
}

#[async_trait]
impl DescriptionService for RestClient {
    async fn generate(&self, item: ItemId) -> Result<String, RemoteError> {
        Ok(self.generate_description(item).await?)
    }

    async fn apply(&self, item: ItemId, description: &str) -> Result<(), RemoteError> {
        Ok(self.update_description(item, description).await?)
    }
}
