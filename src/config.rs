//! client configuration
//!
//! build a [`ClientConfig`] with the endpoint url and optional transport
//! overrides, then pass it to [`crate::Client::new`].

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// configuration for the graphql client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_url: String,

    /// parsed graphql endpoint, `None` if the input did not parse
    pub(crate) url: Option<Url>,

    /// per-request http timeout
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,

    /// prebuilt http client (takes precedence over http_client_builder)
    pub(crate) http_client: Option<reqwest::Client>,

    /// callback to customize the http client builder before building
    pub(crate) http_client_builder:
        Option<Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>>,
}

impl ClientConfig {
    /// create a configuration for the graphql endpoint at `url`
    ///
    /// # example
    ///
    /// ```
    /// use gqlclient::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.github.com/graphql");
    /// ```
    pub fn new(url: impl AsRef<str>) -> Self {
        let raw = url.as_ref();
        Self {
            raw_url: raw.to_string(),
            url: Url::parse(raw.trim()).ok(),
            timeout: Duration::from_secs(30),
            user_agent: format!("gqlclient/{} (Rust)", env!("CARGO_PKG_VERSION")),
            extra_headers: HeaderMap::new(),
            http_client: None,
            http_client_builder: None,
        }
    }

    /// cap each http attempt at `timeout`
    ///
    /// this bounds a single POST, not the rate-limit retry budget, which is
    /// set per call through `query_with_retry`. defaults to 30 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// replace the `gqlclient/<version> (Rust)` user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// send `name: value` on every graphql POST, replacing an earlier value
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// merge `headers` into the ones sent with every graphql POST
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// headers added on top of content type and user agent
    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    /// post through `http_client` instead of building one
    ///
    /// the client is cloned into every [`Client`](crate::Client) built from
    /// this config. its own defaults apply, so `with_timeout`,
    /// `with_user_agent` and extra headers have no effect, and a
    /// `with_http_client_builder` callback is never run.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// adjust the reqwest builder before the transport is built
    ///
    /// `f` runs last, after timeout, user agent and extra headers are set,
    /// so it can override any of them (proxies and tls roots are the usual
    /// reason). a prebuilt `with_http_client` wins over it.
    pub fn with_http_client_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.http_client_builder = Some(Arc::new(f));
        self
    }

    /// validate the configuration and return the endpoint
    pub(crate) fn validate(&self) -> Result<&Url> {
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| Error::Config(format!("invalid endpoint url: {}", self.raw_url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                url.scheme()
            )));
        }

        Ok(url)
    }

    /// build the transport described by this configuration
    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        if let Some(http) = &self.http_client {
            return Ok(http.clone());
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(self.extra_headers.clone())
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout);
        if let Some(customize) = &self.http_client_builder {
            builder = customize(builder);
        }
        Ok(builder.build()?)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.raw_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("extra_headers", &self.extra_headers.len())
            .field("http_client", &self.http_client.is_some())
            .field("http_client_builder", &self.http_client_builder.is_some())
            .finish()
    }
}
