//! Bounded-timeout HTTP retrieval.
//!
//! Every outbound call in a run goes through the [`Fetch`] trait: feed
//! downloads, the forum JSON search, per-post metrics lookups and preview
//! image lookups. A call either returns the body or a [`FetchError`]; it
//! never panics and never retries. Callers treat a failure as "no data from
//! this source for the current run", the next scheduled run being the retry.

use reqwest::{Client, header};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Why a fetch produced no usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// How [`Fetch::fetch_meta`] asks for a resource without downloading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaRequest {
    Head,
    /// GET with `Range: bytes=0-0`, for servers that reject HEAD.
    RangedGet,
}

/// Response headers relevant to checking a linked resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Lowercased `Content-Type`, when present.
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

impl ResponseMeta {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// Source of raw documents for the pipelines.
pub trait Fetch {
    /// GET `url` and return the decoded body, bounded by `timeout`.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;

    /// GET `url` and decode the body as a JSON document.
    async fn fetch_json(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, FetchError> {
        let body = self.fetch_text(url, timeout).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Request `url` without reading its body and return the headers of a
    /// successful response.
    async fn fetch_meta(
        &self,
        url: &str,
        request: MetaRequest,
        timeout: Duration,
    ) -> Result<ResponseMeta, FetchError>;
}

/// Production [`Fetch`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that sends `user_agent` with every request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the TLS backend cannot be initialised.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success HTTP status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_meta(
        &self,
        url: &str,
        request: MetaRequest,
        timeout: Duration,
    ) -> Result<ResponseMeta, FetchError> {
        let builder = match request {
            MetaRequest::Head => self.client.head(url),
            MetaRequest::RangedGet => self.client.get(url).header(header::RANGE, "bytes=0-0"),
        };
        let response = builder.timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "Non-success HTTP status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let headers = response.headers();
        Ok(ResponseMeta {
            content_type: headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_ascii_lowercase()),
            content_length: headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
        })
    }
}

#[cfg(test)]
pub mod stub {
    //! In-memory fetcher for pipeline tests.

    use super::{Fetch, FetchError, MetaRequest, ResponseMeta};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            url: url.to_string(),
            status: 404,
        }
    }

    /// Serves canned bodies and headers by exact URL; anything else is a 404.
    #[derive(Debug, Default)]
    pub struct StubFetcher {
        bodies: HashMap<String, String>,
        metas: HashMap<(String, MetaRequest), ResponseMeta>,
        delays: HashMap<String, Duration>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }

        pub fn with_meta(
            mut self,
            url: &str,
            request: MetaRequest,
            content_type: Option<&str>,
        ) -> Self {
            let meta = ResponseMeta {
                content_type: content_type.map(str::to_string),
                content_length: None,
            };
            self.metas.insert((url.to_string(), request), meta);
            self
        }

        /// Hold every response for `url` back by `delay`.
        pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
            self.delays.insert(url.to_string(), delay);
            self
        }

        /// URLs in the order their requests started.
        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }

        async fn begin(&self, url: &str) {
            self.requested.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }
        }
    }

    impl Fetch for StubFetcher {
        async fn fetch_text(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
            self.begin(url).await;
            self.bodies.get(url).cloned().ok_or_else(|| not_found(url))
        }

        async fn fetch_meta(
            &self,
            url: &str,
            request: MetaRequest,
            _timeout: Duration,
        ) -> Result<ResponseMeta, FetchError> {
            self.begin(url).await;
            self.metas
                .get(&(url.to_string(), request))
                .cloned()
                .ok_or_else(|| not_found(url))
        }
    }
}
