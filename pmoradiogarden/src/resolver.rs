//! Station resolution
//!
//! Turns a pasted URL into a [`ResolveResult`]:
//!
//! - a stream hosted outside the directory is returned as is, without any
//!   network call,
//! - a channel link is resolved to a [`ResolvedStation`] (metadata and stream
//!   URL are fetched concurrently),
//! - a place link is resolved to its single channel, or to the list of its
//!   channels when there are several. The caller then picks one and calls
//!   [`StationResolver::resolve_from_place_item`].
//!
//! # Example
//!
//! ```no_run
//! use pmoradiogarden::{RadioGardenClient, ResolveResult, StationResolver};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = StationResolver::new(RadioGardenClient::new().await?);
//!
//! match resolver.resolve("https://radio.garden/visit/kanpur/x2Fh0lXL").await? {
//!     ResolveResult::SingleStation(station) => println!("{}", station.name),
//!     ResolveResult::MultipleStations { items, .. } => {
//!         let station = resolver.resolve_from_place_item(&items[0]).await?;
//!         println!("{}", station.name);
//!     }
//!     ResolveResult::DirectStream(url) => println!("{}", url),
//! }
//! # Ok(())
//! # }
//! ```

use crate::classifier::{self, Intent};
use crate::client::RadioGardenClient;
use crate::error::{Error, Result};
use crate::models::{PlaceChannelItem, ResolveResult, ResolvedStation};
use tracing::{debug, info};

/// Resolves pasted URLs and place items into stations
///
/// Holds no state besides the HTTP client; every call is independent and
/// may run alongside others.
#[derive(Debug, Clone)]
pub struct StationResolver {
    client: RadioGardenClient,
}

impl StationResolver {
    pub fn new(client: RadioGardenClient) -> Self {
        Self { client }
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &RadioGardenClient {
        &self.client
    }

    /// Resolve a pasted URL
    ///
    /// # Errors
    ///
    /// - [`Error::Unrecognized`] if the input is neither a stream URL nor a
    ///   Radio Garden channel or place link (no network call is made),
    /// - [`Error::EmptyPlace`] if a place lists no channel,
    /// - [`Error::Extraction`] if the only channel of a place has no usable link,
    /// - [`Error::ApiError`], [`Error::Decode`] or [`Error::Http`] when a
    ///   directory request fails.
    pub async fn resolve(&self, raw_url: &str) -> Result<ResolveResult> {
        match classifier::classify(raw_url) {
            Intent::DirectStream => {
                debug!("Direct stream URL: {}", raw_url);
                Ok(ResolveResult::DirectStream(raw_url.to_string()))
            }
            Intent::Channel(channel_id) => {
                let station = self.resolve_channel(&channel_id).await?;
                Ok(ResolveResult::SingleStation(station))
            }
            Intent::Place(place_id) => self.resolve_place(place_id).await,
            Intent::Unrecognized => Err(Error::unrecognized()),
        }
    }

    /// Resolve a channel picked from a place listing
    pub async fn resolve_from_place_item(&self, item: &PlaceChannelItem) -> Result<ResolvedStation> {
        let channel_id = channel_id_of(item)?;
        self.resolve_channel(&channel_id).await
    }

    /// Resolve a channel id into a station
    ///
    /// Metadata and stream URL are two independent requests issued
    /// concurrently; if either fails the whole resolution fails.
    pub async fn resolve_channel(&self, channel_id: &str) -> Result<ResolvedStation> {
        debug!("Resolving channel {}", channel_id);

        let (metadata, stream_url) = tokio::try_join!(
            self.client.fetch_channel_metadata(channel_id),
            self.client.resolve_stream_url(channel_id),
        )?;

        let station = ResolvedStation::from_metadata(channel_id, metadata.data, stream_url);
        info!(
            "Resolved channel {}: {} -> {}",
            channel_id, station.name, station.stream_url
        );
        Ok(station)
    }

    async fn resolve_place(&self, place_id: String) -> Result<ResolveResult> {
        debug!("Resolving place {}", place_id);

        let mut items = self
            .client
            .fetch_place_channels(&place_id)
            .await?
            .channel_items();

        match items.len() {
            0 => Err(Error::empty_place()),
            1 => {
                let item = items.remove(0);
                let channel_id = channel_id_of(&item)?;
                let station = self.resolve_channel(&channel_id).await?;
                Ok(ResolveResult::SingleStation(station))
            }
            count => {
                info!("Place {} lists {} channels", place_id, count);
                Ok(ResolveResult::MultipleStations { items, place_id })
            }
        }
    }
}

/// Channel id of a place item, read from its page URL or href
fn channel_id_of(item: &PlaceChannelItem) -> Result<String> {
    classifier::extract_channel_id(&item.page.url)
        .or_else(|| classifier::extract_channel_id(&item.href))
        .ok_or_else(|| Error::Extraction(item.link().to_string()))
}
