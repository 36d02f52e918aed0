// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, Source};

/// Create a configured asynchronous HTTP client with default headers.
pub fn create_async_client(config: &HttpConfig, headers: HeaderMap) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Build an `Authorization` header value that is hidden from debug output.
pub fn auth_header(platform: Source, value: String) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(&value)
        .map_err(|_| AppError::auth(platform.as_str(), "token contains invalid characters"))?;
    header.set_sensitive(true);
    Ok(header)
}

/// JSON API client bound to one platform's base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    platform: Source,
}

impl ApiClient {
    pub fn new(client: reqwest::Client, base_url: &str, platform: Source) -> Result<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            platform,
        })
    }

    /// Absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&joined)?)
    }

    /// GET a JSON document.
    ///
    /// 401/403 map to `Auth`, other failures to `Transport`, and an
    /// unexpected body shape to `MalformedResponse`. `context` names the
    /// request in those errors.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::transport(context, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::auth(
                self.platform.as_str(),
                format!("{context} rejected with HTTP {status}"),
            ));
        }
        if !status.is_success() {
            return Err(AppError::transport(context, format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::transport(context, e))?;
        serde_json::from_slice(&body).map_err(|e| AppError::malformed(context, e))
    }
}
