//! Persistance SQLite des stations enregistrées
//!
//! [`StationRecord`] est la forme stockée d'une station. Le trait
//! [`StationStore`] décrit ce dont la bibliothèque a besoin ;
//! [`SqliteStationStore`] l'implémente sur une base SQLite unique.
//!
//! L'unicité porte sur `channel_id` : insérer une station déjà connue
//! remplace l'ancienne ligne.

use crate::error::{Error, Result};
use crate::models::ResolvedStation;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info};

/// Prefix of the channel ids given to stations added from a raw stream URL
pub const DIRECT_STREAM_PREFIX: &str = "stream_";

/// A saved station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Row id assigned by the store (0 before the first insertion)
    pub id: i64,
    /// Directory channel id, or `stream_<hash>` for direct streams
    pub channel_id: String,
    pub name: String,
    pub place: String,
    pub country: String,
    pub stream_url: String,
    #[serde(default)]
    pub website: String,
    /// Creation time, Unix milliseconds
    pub added_at: i64,
}

impl StationRecord {
    /// Build an unsaved record from its fields
    pub fn new(
        channel_id: impl Into<String>,
        name: impl Into<String>,
        place: impl Into<String>,
        country: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            channel_id: channel_id.into(),
            name: name.into(),
            place: place.into(),
            country: country.into(),
            stream_url: stream_url.into(),
            website: String::new(),
            added_at: Utc::now().timestamp_millis(),
        }
    }

    /// Set the website
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    /// Build an unsaved record from a resolved station
    pub fn from_resolved(station: &ResolvedStation) -> Self {
        Self::new(
            station.channel_id.as_str(),
            station.name.as_str(),
            station.place.as_str(),
            station.country.as_str(),
            station.stream_url.as_str(),
        )
        .with_website(station.website.as_str())
    }

    /// Build an unsaved record for a stream hosted outside the directory
    ///
    /// The channel id is derived from the URL, so adding the same stream
    /// twice updates a single record. The station is named after the host.
    pub fn direct_stream(stream_url: &str) -> Self {
        let name = url::Url::parse(stream_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| stream_url.to_string());

        Self::new(direct_stream_id(stream_url), name, "", "", stream_url)
    }

    /// Whether this record was added from a raw stream URL
    pub fn is_direct_stream(&self) -> bool {
        self.channel_id.starts_with(DIRECT_STREAM_PREFIX)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            channel_id: row.get(1)?,
            name: row.get(2)?,
            place: row.get(3)?,
            country: row.get(4)?,
            stream_url: row.get(5)?,
            website: row.get(6)?,
            added_at: row.get(7)?,
        })
    }
}

impl From<&StationRecord> for ResolvedStation {
    fn from(record: &StationRecord) -> Self {
        Self {
            channel_id: record.channel_id.clone(),
            name: record.name.clone(),
            place: record.place.clone(),
            country: record.country.clone(),
            stream_url: record.stream_url.clone(),
            website: record.website.clone(),
        }
    }
}

/// Channel id of a direct stream: prefix + first 16 hex digits of SHA-1(url)
pub fn direct_stream_id(stream_url: &str) -> String {
    let digest = Sha1::digest(stream_url.as_bytes());
    let hash = hex::encode(digest);
    format!("{}{}", DIRECT_STREAM_PREFIX, &hash[..16])
}

/// Storage of saved stations
#[async_trait]
pub trait StationStore: Send + Sync {
    /// All stations, oldest first
    async fn list_all(&self) -> Result<Vec<StationRecord>>;

    /// Live view of [`list_all`](Self::list_all), refreshed after every change
    fn subscribe(&self) -> watch::Receiver<Vec<StationRecord>>;

    async fn get_by_channel_id(&self, channel_id: &str) -> Result<Option<StationRecord>>;

    /// Insert or replace the station with the same `channel_id`
    ///
    /// Returns the row id of the stored station.
    async fn upsert(&self, record: &StationRecord) -> Result<i64>;

    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, channel_id, name, place, country, stream_url, website, added_at FROM stations";

/// SQLite-backed [`StationStore`]
pub struct SqliteStationStore {
    conn: Mutex<Connection>,
    snapshot: watch::Sender<Vec<StationRecord>>,
}

impl SqliteStationStore {
    /// Open (or create) the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::store(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)?;
        info!("Opened station database: {}", db_path.display());
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS stations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                channel_id TEXT NOT NULL,
                name TEXT NOT NULL,
                place TEXT NOT NULL,
                country TEXT NOT NULL,
                stream_url TEXT NOT NULL,
                website TEXT NOT NULL DEFAULT '',
                added_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_stations_channel_id ON stations(channel_id)",
            [],
        )?;

        let initial = Self::query_all(&conn)?;
        let (snapshot, _) = watch::channel(initial);

        Ok(Self {
            conn: Mutex::new(conn),
            snapshot,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::store("Station database lock poisoned"))
    }

    fn query_all(conn: &Connection) -> Result<Vec<StationRecord>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY added_at ASC, id ASC", SELECT_COLUMNS))?;
        let records = stmt
            .query_map([], StationRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Publish the current table content to subscribers
    fn publish(&self, conn: &Connection) -> Result<()> {
        let records = Self::query_all(conn)?;
        self.snapshot.send_replace(records);
        Ok(())
    }

    fn upsert_sync(&self, record: &StationRecord) -> Result<i64> {
        let conn = self.lock()?;

        // REPLACE supprime la ligne en conflit sur channel_id puis insère
        if record.id > 0 {
            conn.execute(
                "INSERT OR REPLACE INTO stations
                    (id, channel_id, name, place, country, stream_url, website, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.channel_id,
                    record.name,
                    record.place,
                    record.country,
                    record.stream_url,
                    record.website,
                    record.added_at,
                ],
            )?;
        } else {
            conn.execute(
                "INSERT OR REPLACE INTO stations
                    (channel_id, name, place, country, stream_url, website, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.channel_id,
                    record.name,
                    record.place,
                    record.country,
                    record.stream_url,
                    record.website,
                    record.added_at,
                ],
            )?;
        }

        let id = conn.last_insert_rowid();
        debug!("Stored station {} ({}) as row {}", record.name, record.channel_id, id);

        self.publish(&conn)?;
        Ok(id)
    }

    fn delete_sync(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM stations WHERE id = ?1", params![id])?;
        debug!("Deleted station row {} ({} row(s))", id, removed);

        self.publish(&conn)
    }

    fn get_sync(&self, channel_id: &str) -> Result<Option<StationRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("{} WHERE channel_id = ?1 LIMIT 1", SELECT_COLUMNS),
                params![channel_id],
                StationRecord::from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn list_sync(&self) -> Result<Vec<StationRecord>> {
        let conn = self.lock()?;
        Self::query_all(&conn)
    }
}

#[async_trait]
impl StationStore for SqliteStationStore {
    async fn list_all(&self) -> Result<Vec<StationRecord>> {
        self.list_sync()
    }

    fn subscribe(&self) -> watch::Receiver<Vec<StationRecord>> {
        self.snapshot.subscribe()
    }

    async fn get_by_channel_id(&self, channel_id: &str) -> Result<Option<StationRecord>> {
        self.get_sync(channel_id)
    }

    async fn upsert(&self, record: &StationRecord) -> Result<i64> {
        self.upsert_sync(record)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_sync(id)
    }
}
