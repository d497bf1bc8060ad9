//! HTTP client for the search service.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use searchica_core::{ApiStatus, SearchRequest, SearchResponse};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::retry::RetryPolicy;

const SEARCH_PATH: &str = "/api/search";
const STATUS_PATH: &str = "/api/status";

/// Longest error body echoed back in a [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// The operations a client needs from the search service.
#[async_trait]
pub trait SearchApi: Send + Sync + fmt::Debug {
    /// Run a semantic search. The response is returned as decoded; checking
    /// the plot/result correspondence is up to the caller.
    async fn search(&self, query: &str) -> ClientResult<SearchResponse>;

    /// Fetch the service status.
    async fn status(&self) -> ClientResult<ApiStatus>;
}

/// reqwest-backed [`SearchApi`].
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SearchClient {
    /// Create a client for the service at `base_url`.
    ///
    /// `timeout` of `None` waits indefinitely for each request.
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] if `base_url` is empty or not a URL,
    /// and [`ClientError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>, retry: RetryPolicy) -> ClientResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ClientError::Config(
                "api_base_url is empty; set it in the config file, SEARCHICA_API_BASE_URL or --api-url"
                    .to_string(),
            ));
        }
        Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid api_base_url {:?}: {}", base_url, e)))?;

        let mut builder = Client::builder().user_agent(concat!(
            "searchica/",
            env!("CARGO_PKG_VERSION"),
            " (https://github.com/jacoblgit/searchica)"
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.to_string(),
            retry,
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let timeout = (config.request_timeout_secs > 0)
            .then(|| Duration::from_secs(config.request_timeout_secs));
        Self::new(&config.api_base_url, timeout, config.retry.clone().into())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.http.post(url).json(body).send().await?;
        decode(url, response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        let response = self.http.get(url).send().await?;
        decode(url, response).await
    }
}

#[async_trait]
impl SearchApi for SearchClient {
    async fn search(&self, query: &str) -> ClientResult<SearchResponse> {
        let url = self.endpoint(SEARCH_PATH);
        let body = SearchRequest::new(query);
        log::debug!("POST {} {:?}", url, query);

        let response: SearchResponse = self
            .retry
            .run("search", || self.post_json(&url, &body))
            .await?;

        log::debug!("{} results for {:?}", response.results.len(), query);
        Ok(response)
    }

    async fn status(&self) -> ClientResult<ApiStatus> {
        let url = self.endpoint(STATUS_PATH);
        log::debug!("GET {}", url);
        self.retry.run("status", || self.get_json(&url)).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> ClientResult<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let mut message = text.trim().to_string();
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or("unknown status").to_string();
        }
        if message.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| message.is_char_boundary(*i))
                .unwrap_or(0);
            message.truncate(cut);
            message.push_str("...");
        }
        return Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
