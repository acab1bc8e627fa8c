//! Bibliothèque des stations de l'utilisateur
//!
//! `StationLibrary` relie le résolveur au stockage : une URL collée devient
//! une station enregistrée, ou une liste de chaînes à proposer à
//! l'utilisateur quand un lieu en contient plusieurs.
//!
//! # Example
//!
//! ```no_run
//! use pmoconfig::Config;
//! use pmoradiogarden::{
//!     AddOutcome, RadioGardenClient, RadioGardenConfigExt, SqliteStationStore, StationLibrary,
//!     StationResolver,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::load_config("")?);
//! let db_path = config.get_radiogarden_database_path()?;
//! let store = Arc::new(SqliteStationStore::open(Path::new(&db_path))?);
//! let resolver = StationResolver::new(RadioGardenClient::from_config(&config).await?);
//! let library = StationLibrary::new(resolver, store, config);
//!
//! library.seed_defaults().await?;
//! match library.add_from_url("https://radio.garden/visit/pali/abcd1234").await? {
//!     AddOutcome::Added(record) => println!("Saved {}", record.name),
//!     AddOutcome::ChooseChannel { items, .. } => {
//!         let record = library.add_from_place_item(&items[0]).await?;
//!         println!("Saved {}", record.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::models::{PlaceChannelItem, ResolveResult};
use crate::resolver::StationResolver;
use crate::settings::SettingsStore;
use crate::store::{StationRecord, StationStore};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Channel id of the station selected by default on first launch
pub const SEED_DEFAULT_CHANNEL_ID: &str = "mbAtEPnJ";

/// Stations saved on first launch
pub fn seed_stations() -> Vec<StationRecord> {
    vec![
        StationRecord::new(
            SEED_DEFAULT_CHANNEL_ID,
            "Radio Aashiqanaa",
            "Kanpur",
            "India",
            "https://mars.streamerr.co/8154/stream",
        ),
        StationRecord::new(
            "J5OrSNeF",
            "Marwar Radio",
            "Pali",
            "India",
            "https://stream.zeno.fm/vq6p5vxb4v8uv",
        )
        .with_website("https://zeno.fm/radio/marwar-radio/"),
    ]
}

/// Result of adding a station from a pasted URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The station was saved
    Added(StationRecord),
    /// The URL points to a place with several channels; nothing was saved
    ChooseChannel {
        items: Vec<PlaceChannelItem>,
        place_id: String,
    },
}

/// Saved stations, the resolver that fills them and the user settings
pub struct StationLibrary<S, P> {
    resolver: StationResolver,
    store: Arc<S>,
    settings: Arc<P>,
}

impl<S, P> StationLibrary<S, P>
where
    S: StationStore,
    P: SettingsStore,
{
    pub fn new(resolver: StationResolver, store: Arc<S>, settings: Arc<P>) -> Self {
        Self {
            resolver,
            store,
            settings,
        }
    }

    pub fn resolver(&self) -> &StationResolver {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// All saved stations, oldest first
    pub async fn stations(&self) -> Result<Vec<StationRecord>> {
        self.store.list_all().await
    }

    /// Live view of the saved stations
    pub fn subscribe(&self) -> watch::Receiver<Vec<StationRecord>> {
        self.store.subscribe()
    }

    /// Resolve a pasted URL and save the result
    ///
    /// Direct stream URLs are saved as is, named after their host.
    pub async fn add_from_url(&self, url: &str) -> Result<AddOutcome> {
        let record = match self.resolver.resolve(url).await? {
            ResolveResult::SingleStation(station) => StationRecord::from_resolved(&station),
            ResolveResult::DirectStream(stream_url) => StationRecord::direct_stream(&stream_url),
            ResolveResult::MultipleStations { items, place_id } => {
                debug!("Place {} needs a choice among {} channels", place_id, items.len());
                return Ok(AddOutcome::ChooseChannel { items, place_id });
            }
        };

        self.save(record).await.map(AddOutcome::Added)
    }

    /// Resolve and save the channel picked from a place listing
    pub async fn add_from_place_item(&self, item: &PlaceChannelItem) -> Result<StationRecord> {
        let station = self.resolver.resolve_from_place_item(item).await?;
        self.save(StationRecord::from_resolved(&station)).await
    }

    /// Delete a saved station
    pub async fn remove(&self, record: &StationRecord) -> Result<()> {
        self.store.delete_by_id(record.id).await?;
        info!("Removed station {} ({})", record.name, record.channel_id);
        Ok(())
    }

    /// Put back a station removed with [`remove`](Self::remove)
    pub async fn restore(&self, record: &StationRecord) -> Result<i64> {
        let id = self.store.upsert(record).await?;
        info!("Restored station {} ({})", record.name, record.channel_id);
        Ok(id)
    }

    /// Find a saved station by channel id
    pub async fn find(&self, channel_id: &str) -> Result<Option<StationRecord>> {
        self.store.get_by_channel_id(channel_id).await
    }

    pub fn set_default(&self, channel_id: &str) -> Result<()> {
        self.settings.set_default_station_id(channel_id)
    }

    /// The default station, if one is set and still saved
    pub async fn default_station(&self) -> Result<Option<StationRecord>> {
        match self.settings.default_station_id()? {
            Some(channel_id) => self.store.get_by_channel_id(&channel_id).await,
            None => Ok(None),
        }
    }

    /// Save the seed stations on first launch
    ///
    /// Stations already present are left untouched. Afterwards the first
    /// seed becomes the default station and the first-launch flag is
    /// cleared, so later calls do nothing. Returns the number of stations
    /// inserted.
    pub async fn seed_defaults(&self) -> Result<usize> {
        if !self.settings.is_first_launch()? {
            return Ok(0);
        }

        let mut inserted = 0;
        for station in seed_stations() {
            if self
                .store
                .get_by_channel_id(&station.channel_id)
                .await?
                .is_none()
            {
                self.store.upsert(&station).await?;
                inserted += 1;
            }
        }

        self.settings.set_default_station_id(SEED_DEFAULT_CHANNEL_ID)?;
        self.settings.mark_first_launch_done()?;

        info!("First launch: seeded {} station(s)", inserted);
        Ok(inserted)
    }

    async fn save(&self, mut record: StationRecord) -> Result<StationRecord> {
        record.id = self.store.upsert(&record).await?;
        info!("Saved station {} ({})", record.name, record.channel_id);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RadioGardenClient;
    use crate::store::SqliteStationStore;
    use pmoconfig::Config;
    use tempfile::TempDir;

    async fn offline_library() -> (TempDir, StationLibrary<SqliteStationStore, Config>) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(&dir.path().to_string_lossy()).unwrap();
        // Unroutable: these tests must not reach the network
        let client = RadioGardenClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .await
            .unwrap();

        let library = StationLibrary::new(
            StationResolver::new(client),
            Arc::new(SqliteStationStore::open_in_memory().unwrap()),
            Arc::new(config),
        );
        (dir, library)
    }

    #[tokio::test]
    async fn test_seed_defaults_runs_once() {
        let (_dir, library) = offline_library().await;

        assert_eq!(library.seed_defaults().await.unwrap(), 2);
        assert_eq!(library.seed_defaults().await.unwrap(), 0);
        assert_eq!(library.stations().await.unwrap().len(), 2);

        let default = library.default_station().await.unwrap().unwrap();
        assert_eq!(default.channel_id, SEED_DEFAULT_CHANNEL_ID);
        assert_eq!(default.name, "Radio Aashiqanaa");
    }

    #[tokio::test]
    async fn test_seed_keeps_existing_station() {
        let (_dir, library) = offline_library().await;
        let mut custom = seed_stations().remove(1);
        custom.name = "My Marwar".to_string();
        library.restore(&custom).await.unwrap();

        assert_eq!(library.seed_defaults().await.unwrap(), 1);
        let marwar = library.find("J5OrSNeF").await.unwrap().unwrap();
        assert_eq!(marwar.name, "My Marwar");
    }

    #[tokio::test]
    async fn test_add_direct_stream() {
        let (_dir, library) = offline_library().await;

        let outcome = library
            .add_from_url("https://stream.zeno.fm/vq6p5vxb4v8uv")
            .await
            .unwrap();
        let AddOutcome::Added(record) = outcome else {
            panic!("expected a saved station, got {:?}", outcome);
        };

        assert!(record.id > 0);
        assert!(record.is_direct_stream());
        assert_eq!(record.name, "stream.zeno.fm");
        assert_eq!(record.stream_url, "https://stream.zeno.fm/vq6p5vxb4v8uv");

        // Adding the same stream again updates the same entry
        library
            .add_from_url("https://stream.zeno.fm/vq6p5vxb4v8uv")
            .await
            .unwrap();
        assert_eq!(library.stations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_then_restore() {
        let (_dir, library) = offline_library().await;
        library.seed_defaults().await.unwrap();
        let mut rx = library.subscribe();

        let station = library.find("J5OrSNeF").await.unwrap().unwrap();
        library.remove(&station).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        library.restore(&station).await.unwrap();
        let restored = library.find("J5OrSNeF").await.unwrap().unwrap();
        assert_eq!(restored, station);
    }

    #[tokio::test]
    async fn test_default_station_missing_from_store() {
        let (_dir, library) = offline_library().await;
        library.set_default("gone").unwrap();
        assert!(library.default_station().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_url_saves_nothing() {
        let (_dir, library) = offline_library().await;
        assert!(library.add_from_url("not a url").await.is_err());
        assert!(library.stations().await.unwrap().is_empty());
    }
}
