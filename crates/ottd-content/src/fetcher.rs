//! Downloads NewGRF archives from the BaNaNaS CDN
//!
//! Archives are served gzip-compressed at
//! `{origin}/newgrf/{id}/{hash}/{name}.tar.gz`. The body is decompressed on
//! the fly and streamed straight into the [`ContentStore`].

use std::time::Duration;

use async_compression::tokio::bufread::GzipDecoder;
use futures::TryStreamExt;
use ottd_config::ContentSettings;
use reqwest::StatusCode;
use tokio_util::io::StreamReader;
use url::Url;

use crate::item::RequiredContentItem;
use crate::store::ContentStore;
use crate::{Error, Result};

/// Where content is downloaded from and how the client identifies itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSource {
    base_url: Url,
    user_agent: String,
    timeout: Option<Duration>,
}

impl ContentSource {
    /// Create a source for the CDN at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaseUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, user_agent: impl Into<String>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|source| Error::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: parsed,
            user_agent: user_agent.into(),
            timeout: None,
        })
    }

    pub fn from_settings(settings: &ContentSettings) -> Result<Self> {
        let mut source = Self::new(&settings.cdn_url, settings.user_agent.clone())?;
        source.timeout = settings.request_timeout();
        Ok(source)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Absolute download URL for `item`.
    pub fn url_for(&self, item: &RequiredContentItem) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            item.remote_path()
        )
    }
}

/// Performs single-item downloads. Cheap to share between tasks.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: reqwest::Client,
    source: ContentSource,
}

impl Fetcher {
    pub fn new(source: ContentSource) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(source.user_agent.clone());
        if let Some(timeout) = source.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(Error::Client)?;
        Ok(Self { http, source })
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Download `item` into `store`, returning the decompressed size.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] if the request cannot be sent
    /// - [`Error::Status`] for any status other than 200; the body is not read
    /// - [`Error::Transfer`] if the body is not valid gzip or the write fails
    pub async fn fetch(&self, item: &RequiredContentItem, store: &ContentStore) -> Result<u64> {
        let url = self.source.url_for(item);
        tracing::debug!(%url, "Requesting NewGRF archive");

        let resp = self.http.get(&url).send().await.map_err(|source| Error::Http {
            url: url.clone(),
            source,
        })?;

        if resp.status() != StatusCode::OK {
            return Err(Error::Status {
                url,
                status: resp.status().to_string(),
            });
        }

        let body = resp.bytes_stream().map_err(std::io::Error::other);
        let archive = std::pin::pin!(GzipDecoder::new(StreamReader::new(body)));

        store.write_stream(item.cache_key(), archive).await
    }
}
