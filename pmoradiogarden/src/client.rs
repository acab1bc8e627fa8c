//! HTTP client for the Radio Garden API
//!
//! This module provides a client for the three directory endpoints the
//! resolver needs: channel metadata, stream resolution and place content.
//!
//! # Example
//!
//! ```no_run
//! use pmoradiogarden::RadioGardenClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RadioGardenClient::new().await?;
//!
//!     let channel = client.fetch_channel_metadata("mbAtEPnJ").await?;
//!     println!("{} ({})", channel.data.title, channel.data.place.title);
//!
//!     let stream_url = client.resolve_stream_url("mbAtEPnJ").await?;
//!     println!("Stream: {}", stream_url);
//!
//!     Ok(())
//! }
//! ```

use crate::config_ext::RadioGardenConfigExt;
use crate::error::{Error, Result};
use crate::models::{ChannelResponse, PlaceChannelsResponse};
use pmoconfig::Config;
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::{redirect, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default Radio Garden base URL
pub const DEFAULT_BASE_URL: &str = "https://radio.garden";

/// Default timeout for HTTP requests (15 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default User-Agent
///
/// The directory rejects requests that do not look like they come from a
/// browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

/// Radio Garden HTTP client
///
/// Each operation is a single request, never retried. The client is
/// stateless: clones share the connection pools and calls may run
/// concurrently.
#[derive(Debug, Clone)]
pub struct RadioGardenClient {
    client: Client,
    /// Same settings as `client`, redirects disabled
    no_redirect_client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl RadioGardenClient {
    /// Create a new client with default settings
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from the `sources.radiogarden` configuration section
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::builder()
            .base_url(config.get_radiogarden_base_url()?)
            .user_agent(config.get_radiogarden_user_agent()?)
            .timeout(Duration::from_secs(config.get_radiogarden_timeout_secs()?))
            .build()
            .await
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// URL of the channel metadata endpoint
    pub fn channel_url(&self, channel_id: &str) -> String {
        format!("{}/api/ara/content/channel/{}", self.base_url, channel_id)
    }

    /// URL of the listen endpoint, which redirects to the actual stream
    pub fn listen_url(&self, channel_id: &str) -> String {
        format!(
            "{}/api/ara/content/listen/{}/channel.mp3",
            self.base_url, channel_id
        )
    }

    /// URL of the place channels endpoint
    pub fn place_channels_url(&self, place_id: &str) -> String {
        format!("{}/api/ara/content/page/{}/channels", self.base_url, place_id)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Get the metadata of a channel (title, place, country, website)
    pub async fn fetch_channel_metadata(&self, channel_id: &str) -> Result<ChannelResponse> {
        let url = self.channel_url(channel_id);
        self.get_json(&url).await
    }

    /// Get the channel listing of a place page
    pub async fn fetch_place_channels(&self, place_id: &str) -> Result<PlaceChannelsResponse> {
        let url = self.place_channels_url(place_id);
        self.get_json(&url).await
    }

    /// Resolve the playable stream URL of a channel
    ///
    /// The listen endpoint answers with a redirect to the real stream, so
    /// this request does not follow redirects:
    /// - a 3xx response yields its `Location` header, verbatim when absolute
    ///   and resolved against the listen URL when relative,
    /// - a 2xx response means the endpoint serves the audio itself and the
    ///   listen URL is returned,
    /// - anything else is an [`Error::ApiError`].
    pub async fn resolve_stream_url(&self, channel_id: &str) -> Result<String> {
        let url = self.listen_url(channel_id);
        debug!("Resolving stream: {}", url);

        let response = self
            .no_redirect_client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .ok_or_else(|| Error::api_error("No redirect location"))?
                .to_str()
                .map_err(|_| Error::api_error("Invalid redirect location"))?;

            let stream_url = absolute_location(&url, location)?;
            debug!("Channel {} redirects to {}", channel_id, stream_url);
            return Ok(stream_url);
        }

        if status.is_success() {
            // Some channels return the stream directly
            debug!("Channel {} streams without redirect", channel_id);
            return Ok(url);
        }

        Err(Error::ApiError(format!(
            "Stream resolution failed: {}",
            status
        )))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ApiError(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Make a redirect target absolute, using the request URL as base
fn absolute_location(request_url: &str, location: &str) -> Result<String> {
    match Url::parse(location) {
        Ok(_) => Ok(location.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(Url::parse(request_url)?.join(location)?.to_string())
        }
        Err(e) => Err(e.into()),
    }
}

/// Builder for configuring a RadioGardenClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client for the JSON endpoints
    ///
    /// Stream resolution always uses a dedicated client built from this
    /// builder's settings, because it must not follow redirects.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    fn http_builder(&self) -> Result<reqwest::ClientBuilder> {
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout);

        if let Some(proxy_url) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| Error::other(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder)
    }

    /// Build the client
    pub async fn build(self) -> Result<RadioGardenClient> {
        let no_redirect_client = self
            .http_builder()?
            .redirect(redirect::Policy::none())
            .build()?;

        let client = match self.client {
            Some(ref client) => client.clone(),
            None => self.http_builder()?.build()?,
        };

        Ok(RadioGardenClient {
            client,
            no_redirect_client,
            base_url: self.base_url,
            user_agent: self.user_agent,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::default();
        assert_eq!(builder.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            builder.timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert!(builder.user_agent.contains("Mobile Safari"));
    }

    #[test]
    fn test_absolute_location_is_kept() {
        let location = absolute_location(
            "https://radio.garden/api/ara/content/listen/abc/channel.mp3",
            "https://stream.example/live",
        )
        .unwrap();
        assert_eq!(location, "https://stream.example/live");
    }

    #[test]
    fn test_relative_location_is_resolved() {
        let base = "https://radio.garden/api/ara/content/listen/abc/channel.mp3";
        assert_eq!(
            absolute_location(base, "/streams/abc.mp3").unwrap(),
            "https://radio.garden/streams/abc.mp3"
        );
        assert_eq!(
            absolute_location(base, "//cdn.example/abc").unwrap(),
            "https://cdn.example/abc"
        );
    }

    #[test]
    fn test_invalid_location_is_url_error() {
        let err = absolute_location("https://radio.garden/x", "http://[bad").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_builder_trims_base_url() {
        let builder = ClientBuilder::new().base_url("http://127.0.0.1:8080/");
        assert_eq!(builder.base_url, "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_endpoint_urls() {
        let client = RadioGardenClient::new().await.unwrap();
        assert_eq!(
            client.channel_url("mbAtEPnJ"),
            "https://radio.garden/api/ara/content/channel/mbAtEPnJ"
        );
        assert_eq!(
            client.listen_url("mbAtEPnJ"),
            "https://radio.garden/api/ara/content/listen/mbAtEPnJ/channel.mp3"
        );
        assert_eq!(
            client.place_channels_url("XyZ123"),
            "https://radio.garden/api/ara/content/page/XyZ123/channels"
        );
    }

    // ========================================================================
    // Integration Tests (real API calls)
    //
    // Run with: cargo test -p pmoradiogarden -- --ignored
    // ========================================================================

    #[tokio::test]
    #[ignore = "Integration test - calls real Radio Garden API"]
    async fn test_live_channel_resolution() {
        let client = RadioGardenClient::new()
            .await
            .expect("Failed to create client");

        let metadata = client.fetch_channel_metadata("mbAtEPnJ").await;
        assert!(
            metadata.is_ok(),
            "Failed to get channel metadata: {:?}",
            metadata.err()
        );

        let stream = client.resolve_stream_url("mbAtEPnJ").await;
        assert!(stream.is_ok(), "Failed to resolve stream: {:?}", stream.err());
        println!("Stream: {}", stream.unwrap());
    }
}
