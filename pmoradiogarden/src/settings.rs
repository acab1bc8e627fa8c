//! User settings: default station and first-launch flag

use crate::config_ext::RadioGardenConfigExt;
use crate::error::Result;
use pmoconfig::Config;

/// Key-value settings used by the station library
pub trait SettingsStore: Send + Sync {
    fn default_station_id(&self) -> Result<Option<String>>;

    fn set_default_station_id(&self, channel_id: &str) -> Result<()>;

    /// `true` until [`mark_first_launch_done`](Self::mark_first_launch_done) has been called once
    fn is_first_launch(&self) -> Result<bool>;

    fn mark_first_launch_done(&self) -> Result<()>;
}

impl SettingsStore for Config {
    fn default_station_id(&self) -> Result<Option<String>> {
        Ok(self.get_radiogarden_default_station()?)
    }

    fn set_default_station_id(&self, channel_id: &str) -> Result<()> {
        Ok(self.set_radiogarden_default_station(channel_id)?)
    }

    fn is_first_launch(&self) -> Result<bool> {
        Ok(self.get_radiogarden_first_launch()?)
    }

    fn mark_first_launch_done(&self) -> Result<()> {
        Ok(self.set_radiogarden_first_launch_done()?)
    }
}
