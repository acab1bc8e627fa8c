//! Radio Garden station resolver for PMOGarden
//!
//! This crate turns whatever a user pastes (a Radio Garden channel link, a
//! Radio Garden place link, or a raw stream URL) into a playable station,
//! and keeps the user's saved stations in a local SQLite database.
//!
//! # Features
//!
//! - **URL classification**: Recognise channel links (`/listen/...`), place
//!   links (`/visit/...`) and direct streams without any network call
//! - **Stream resolution**: Follow the directory's listen redirect to the
//!   real stream URL, fetched concurrently with the channel metadata
//! - **Place expansion**: A place with a single channel resolves to it; a
//!   place with several returns the list so the user can pick one
//! - **Station library**: Saved stations, live snapshots, default station
//!   and first-launch seeding
//! - **Configuration Extension**: Base URL, User-Agent, timeout, database
//!   location and settings stored in pmoconfig
//!
//! # Example
//!
//! ```no_run
//! use pmoradiogarden::{RadioGardenClient, ResolveResult, StationResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = StationResolver::new(RadioGardenClient::new().await?);
//!
//!     match resolver.resolve("https://radio.garden/listen/radio-aashiqanaa/mbAtEPnJ").await? {
//!         ResolveResult::SingleStation(station) => {
//!             println!("{} ({}) -> {}", station.name, station.location(), station.stream_url);
//!         }
//!         ResolveResult::MultipleStations { items, .. } => {
//!             for item in &items {
//!                 println!("- {}", item.display_title());
//!             }
//!         }
//!         ResolveResult::DirectStream(url) => println!("Stream: {}", url),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Network behaviour
//!
//! Each directory call is a single GET with a browser User-Agent, never
//! retried. Direct streams and unrecognised input never touch the network.

pub mod classifier;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod library;
pub mod models;
pub mod resolver;
pub mod settings;
pub mod store;

// Re-exports
pub use classifier::{classify, Intent};
pub use client::{ClientBuilder, RadioGardenClient};
pub use config_ext::RadioGardenConfigExt;
pub use error::{Error, Result};
pub use library::{AddOutcome, StationLibrary};
pub use models::{
    ChannelData, ChannelPage, ChannelResponse, PlaceChannelItem, PlaceChannelsResponse,
    ResolveResult, ResolvedStation,
};
pub use resolver::StationResolver;
pub use settings::SettingsStore;
pub use store::{SqliteStationStore, StationRecord, StationStore};
