// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! jointSPACE REST client.

use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::{Value, json};

use crate::command::RemoteKey;
use crate::config::SessionConfig;
use crate::error::ApiError;

use super::{DeviceApi, SystemAttribute};

/// HTTP client for the jointSPACE API.
///
/// Requests go to `http://{host}:{port}/{version}/<path>`. The television
/// does not authenticate requests.
///
/// # Examples
///
/// ```no_run
/// use jointspace_lib::api::{DeviceApi, JointSpaceClient};
/// use jointspace_lib::SessionConfig;
///
/// # async fn example() -> jointspace_lib::Result<()> {
/// let client = JointSpaceClient::new(&SessionConfig::new("192.168.1.40"))?;
/// let current = client.current_source().await?;
/// println!("{current}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JointSpaceClient {
    base_url: String,
    client: Client,
}

impl JointSpaceClient {
    /// Creates a client from a session configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn new(config: &SessionConfig) -> Result<Self, ApiError> {
        if config.host().trim().is_empty() {
            return Err(ApiError::InvalidAddress("host is required".to_string()));
        }
        Self::with_base_url(config.base_url(), config.request_timeout())
    }

    /// Creates a client against an explicit versioned base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self { base_url, client })
    }

    /// Returns the versioned base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Sending GET");

        let response = self.client.get(&url).send().await?;
        read_body(response).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, body = %body, "Sending POST");

        let response = self.client.post(&url).json(&body).send().await?;
        read_body(response).await
    }
}

/// Checks the status and decodes the body. An empty body decodes to `null`.
async fn read_body(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let body = response.text().await?;
    tracing::debug!(body = %body, "Received response");

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

impl DeviceApi for JointSpaceClient {
    async fn sources(&self) -> Result<Value, ApiError> {
        self.get("sources").await
    }

    async fn current_source(&self) -> Result<Value, ApiError> {
        self.get("sources/current").await
    }

    async fn system(&self) -> Result<Value, ApiError> {
        self.get("system").await
    }

    async fn system_attribute(&self, attribute: SystemAttribute) -> Result<Value, ApiError> {
        self.get(&format!("system/{}", attribute.as_str())).await
    }

    async fn set_current_source(&self, source_id: &str) -> Result<Value, ApiError> {
        self.post("sources/current", json!({ "id": source_id })).await
    }

    async fn send_key(&self, key: RemoteKey) -> Result<Value, ApiError> {
        self.post("input/key", json!({ "key": key.as_str() })).await
    }
}
