//! Extension pour intégrer Radio Garden dans pmoconfig
//!
//! Ce module fournit le trait `RadioGardenConfigExt` qui ajoute à
//! `pmoconfig::Config` les réglages de la source Radio Garden :
//!
//! - URL de l'annuaire, User-Agent et timeout du client HTTP
//! - Emplacement de la base des stations enregistrées
//! - Station par défaut et indicateur de premier lancement
//!
//! Toutes les clés vivent sous `sources.radiogarden`.
//!
//! # Exemple
//!
//! ```no_run
//! use pmoconfig::Config;
//! use pmoradiogarden::RadioGardenConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load_config("")?;
//!
//! if config.get_radiogarden_first_launch()? {
//!     println!("Welcome!");
//! }
//! if let Some(id) = config.get_radiogarden_default_station()? {
//!     println!("Default station: {}", id);
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::Value;

/// Default database file, relative to the configuration directory
pub const DEFAULT_DATABASE_FILE: &str = "radiogarden.db";

const SECTION: [&str; 2] = ["sources", "radiogarden"];

fn key(name: &str) -> [&str; 3] {
    [SECTION[0], SECTION[1], name]
}

/// Trait d'extension pour gérer la configuration Radio Garden dans pmoconfig
///
/// # Auto-persist des valeurs par défaut
///
/// Les getters persistent automatiquement les valeurs par défaut dans la
/// configuration si elles n'existent pas encore.
pub trait RadioGardenConfigExt {
    // ========================================================================
    // HTTP client
    // ========================================================================

    /// Base URL of the directory (default: `https://radio.garden`)
    fn get_radiogarden_base_url(&self) -> Result<String>;

    fn set_radiogarden_base_url(&self, url: &str) -> Result<()>;

    /// User-Agent sent with every request
    fn get_radiogarden_user_agent(&self) -> Result<String>;

    fn set_radiogarden_user_agent(&self, user_agent: &str) -> Result<()>;

    /// Request timeout in seconds (default: 15)
    fn get_radiogarden_timeout_secs(&self) -> Result<u64>;

    fn set_radiogarden_timeout_secs(&self, secs: u64) -> Result<()>;

    // ========================================================================
    // Station store
    // ========================================================================

    /// Absolute path of the station database
    ///
    /// Relative paths are resolved against the configuration directory.
    fn get_radiogarden_database_path(&self) -> Result<String>;

    // ========================================================================
    // Settings
    // ========================================================================

    /// Channel id of the default station, if one was chosen
    fn get_radiogarden_default_station(&self) -> Result<Option<String>>;

    fn set_radiogarden_default_station(&self, channel_id: &str) -> Result<()>;

    /// `true` until [`set_radiogarden_first_launch_done`](Self::set_radiogarden_first_launch_done) is called
    fn get_radiogarden_first_launch(&self) -> Result<bool>;

    fn set_radiogarden_first_launch_done(&self) -> Result<()>;
}

impl RadioGardenConfigExt for Config {
    fn get_radiogarden_base_url(&self) -> Result<String> {
        match self.get_value(&key("base_url")) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_radiogarden_base_url(DEFAULT_BASE_URL)?;
                Ok(DEFAULT_BASE_URL.to_string())
            }
        }
    }

    fn set_radiogarden_base_url(&self, url: &str) -> Result<()> {
        self.set_value(&key("base_url"), Value::String(url.to_string()))
    }

    fn get_radiogarden_user_agent(&self) -> Result<String> {
        match self.get_value(&key("user_agent")) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => {
                self.set_radiogarden_user_agent(DEFAULT_USER_AGENT)?;
                Ok(DEFAULT_USER_AGENT.to_string())
            }
        }
    }

    fn set_radiogarden_user_agent(&self, user_agent: &str) -> Result<()> {
        self.set_value(&key("user_agent"), Value::String(user_agent.to_string()))
    }

    fn get_radiogarden_timeout_secs(&self) -> Result<u64> {
        let configured = match self.get_value(&key("timeout_secs")) {
            Ok(Value::Number(n)) => n.as_u64().filter(|secs| *secs > 0),
            _ => None,
        };

        match configured {
            Some(secs) => Ok(secs),
            None => {
                // Not set or invalid, use default and persist
                self.set_radiogarden_timeout_secs(DEFAULT_REQUEST_TIMEOUT_SECS)?;
                Ok(DEFAULT_REQUEST_TIMEOUT_SECS)
            }
        }
    }

    fn set_radiogarden_timeout_secs(&self, secs: u64) -> Result<()> {
        self.set_value(
            &key("timeout_secs"),
            Value::Number(serde_yaml::Number::from(secs)),
        )
    }

    fn get_radiogarden_database_path(&self) -> Result<String> {
        self.get_managed_file(&key("database"), DEFAULT_DATABASE_FILE)
    }

    fn get_radiogarden_default_station(&self) -> Result<Option<String>> {
        match self.get_value(&key("default_station_id")) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    fn set_radiogarden_default_station(&self, channel_id: &str) -> Result<()> {
        self.set_value(
            &key("default_station_id"),
            Value::String(channel_id.to_string()),
        )
    }

    fn get_radiogarden_first_launch(&self) -> Result<bool> {
        // Absent ou autre chose que `false` : premier lancement
        match self.get_value(&key("first_launch")) {
            Ok(Value::Bool(false)) => Ok(false),
            _ => Ok(true),
        }
    }

    fn set_radiogarden_first_launch_done(&self) -> Result<()> {
        self.set_value(&key("first_launch"), Value::Bool(false))
    }
}
