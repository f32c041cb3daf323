// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! HTTP client for the query and mutate endpoints

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::StoreError;

/// API host suffix; the project id is the leftmost label
const DEFAULT_API_HOST: &str = "api.sanity.io";

/// Connection settings for [`SanityClient`]
#[derive(Debug)]
pub struct SanityConfig {
    /// Project identifier, used to derive the API host
    pub project_id: String,
    /// Dataset name (e.g., "production")
    pub dataset: String,
    /// Dated API version, with or without a leading "v" (e.g., "2024-01-01")
    pub api_version: String,
    /// Write token, sent as a bearer token on every request
    pub token: SecretString,
    /// Base URL override; when unset the URL is derived from `project_id`
    pub api_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl SanityConfig {
    /// Base URL of the API without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", self.project_id, DEFAULT_API_HOST),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Response body of a committed mutation transaction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateResponse {
    pub transaction_id: String,
    #[serde(default)]
    pub results: Vec<MutateResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutateResult {
    pub id: String,
    #[serde(default)]
    pub operation: Option<String>,
}

/// Content store client
///
/// Constructed once at process start and shared by reference; it holds a
/// pooled `reqwest::Client` with the bearer token preset.
pub struct SanityClient {
    http: Client,
    base_url: String,
    dataset: String,
    api_version: String,
}

impl SanityClient {
    /// Create a new client
    pub fn new(config: &SanityConfig) -> Result<Self, StoreError> {
        if config.dataset.is_empty() {
            return Err(StoreError::Config("dataset must not be empty".to_string()));
        }
        if config.api_url.is_none() && config.project_id.is_empty() {
            return Err(StoreError::Config(
                "project id is required when no API URL is given".to_string(),
            ));
        }

        let base_url = config.base_url();
        Url::parse(&base_url)?;

        install_crypto_provider();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.expose_secret()))
            .map_err(|_| {
                StoreError::Config("token contains characters not valid in a header".to_string())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url,
            dataset: config.dataset.clone(),
            api_version: config.api_version.trim_start_matches('v').to_string(),
        })
    }

    fn endpoint(&self, kind: &str) -> Result<Url, StoreError> {
        let url = format!(
            "{}/v{}/data/{}/{}",
            self.base_url, self.api_version, kind, self.dataset
        );
        Ok(Url::parse(&url)?)
    }

    /// Run a GROQ query and decode its `result`.
    ///
    /// Each `(name, value)` in `params` is bound as the string parameter
    /// `$name`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, &str)],
    ) -> Result<T, StoreError> {
        let mut url = self.endpoint("query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", groq);
            for (name, value) in params {
                pairs.append_pair(&format!("${}", name), &serde_json::to_string(value)?);
            }
        }

        tracing::debug!(path = %url.path(), params = params.len(), "Running store query");

        let response = self.http.get(url).send().await?;
        let body: QueryResponse<T> = decode(response).await?;
        Ok(body.result)
    }

    /// Commit a single-document transaction that sets the fields of `set`
    /// on document `id`.
    pub async fn patch_set<S: Serialize + ?Sized>(
        &self,
        id: &str,
        set: &S,
    ) -> Result<MutateResponse, StoreError> {
        let url = self.endpoint("mutate")?;
        let set = serde_json::to_value(set)?;
        let body = json!({
            "mutations": [
                { "patch": { "id": id, "set": set } }
            ]
        });

        let response = self.http.post(url).json(&body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        tracing::warn!(status = %status, "Store request returned non-success status");
        return Err(StoreError::status(status.as_u16(), &text));
    }

    Ok(serde_json::from_str(&text)?)
}

/// reqwest is built without a bundled TLS provider; install ring as the
/// process default. Errors only mean a provider is already installed.
fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
