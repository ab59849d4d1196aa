//! Configuration of calendar sources
//!
//! A host application either builds [`SourceConfig`] and [`ConnectionOptions`] itself, or loads them from a JSON settings file via [`Settings`].

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default minimum interval between two downloads, in minutes
pub const DEFAULT_DOWNLOAD_INTERVAL: u64 = 15;
/// Default request timeout (when timeouts are enabled), in seconds
pub const DEFAULT_CONNECTION_TIMEOUT: f64 = 300.0;

/// The immutable identity of a calendar source
#[derive(Clone, Debug, PartialEq)]
pub struct SourceConfig {
    /// Only used in log messages
    pub name: String,
    /// May contain `{year}` and `{month}` placeholders
    pub url: String,
    /// Minimum elapsed time between two real downloads
    pub min_update_time: Duration,
}

/// HTTP options of a calendar source. Empty strings mean "not set".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionOptions {
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub accept_header: String,
    /// In seconds
    pub timeout: Option<f64>,
}

/// A calendar, as described in a settings file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub name: String,
    pub url: String,
    /// In minutes
    #[serde(default = "default_download_interval")]
    pub download_interval: u64,

    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub accept_header: String,

    #[serde(default)]
    pub set_connection_timeout: bool,
    /// In seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: f64,
}

fn default_download_interval() -> u64 {
    DEFAULT_DOWNLOAD_INTERVAL
}

fn default_connection_timeout() -> f64 {
    DEFAULT_CONNECTION_TIMEOUT
}

impl CalendarEntry {
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            name: self.name.clone(),
            url: self.url.clone(),
            min_update_time: Duration::from_secs(self.download_interval.saturating_mul(60)),
        }
    }

    /// Credentials are only kept when `requires_auth` is set, and the timeout only when `set_connection_timeout` is
    pub fn connection_options(&self) -> ConnectionOptions {
        let (username, password) = if self.requires_auth {
            (self.username.clone(), self.password.clone())
        } else {
            (String::new(), String::new())
        };

        ConnectionOptions {
            username,
            password,
            user_agent: self.user_agent.clone(),
            accept_header: self.accept_header.clone(),
            timeout: if self.set_connection_timeout { Some(self.connection_timeout) } else { None },
        }
    }
}

/// The content of a settings file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub calendars: Vec<CalendarEntry>,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let settings = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(std::io::BufReader::new(file))?,
        };
        Ok(settings)
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_entry_uses_defaults() {
        let settings = Settings::from_json(r#"{ "calendars": [ { "name": "holidays", "url": "http://127.0.0.1/holidays.ics" } ] }"#).unwrap();
        let entry = &settings.calendars[0];

        let source = entry.source_config();
        assert_eq!(source.name, "holidays");
        assert_eq!(source.url, "http://127.0.0.1/holidays.ics");
        assert_eq!(source.min_update_time, Duration::from_secs(15 * 60));

        assert_eq!(entry.connection_options(), ConnectionOptions::default());
    }

    #[test]
    fn credentials_require_auth() {
        let json = r#"{ "calendars": [
            { "name": "a", "url": "http://x/a.ics", "username": "user", "password": "pass" },
            { "name": "b", "url": "http://x/b.ics", "username": "user", "password": "pass", "requires_auth": true,
              "user_agent": "Mozilla/5.0", "accept_header": "text/calendar", "download_interval": 5 }
        ] }"#;
        let settings = Settings::from_json(json).unwrap();

        let a = settings.calendars[0].connection_options();
        assert_eq!(a.username, "");
        assert_eq!(a.password, "");

        let b = settings.calendars[1].connection_options();
        assert_eq!(b.username, "user");
        assert_eq!(b.password, "pass");
        assert_eq!(b.user_agent, "Mozilla/5.0");
        assert_eq!(b.accept_header, "text/calendar");
        assert_eq!(settings.calendars[1].source_config().min_update_time, Duration::from_secs(300));
    }

    #[test]
    fn timeout_requires_flag() {
        let json = r#"{ "calendars": [
            { "name": "a", "url": "http://x/a.ics", "connection_timeout": 1.5 },
            { "name": "b", "url": "http://x/b.ics", "set_connection_timeout": true, "connection_timeout": 1.5 },
            { "name": "c", "url": "http://x/c.ics", "set_connection_timeout": true }
        ] }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.calendars[0].connection_options().timeout, None);
        assert_eq!(settings.calendars[1].connection_options().timeout, Some(1.5));
        assert_eq!(settings.calendars[2].connection_options().timeout, Some(DEFAULT_CONNECTION_TIMEOUT));
    }

    #[test]
    fn missing_file() {
        assert!(Settings::from_file(Path::new("this/file/does/not/exist.json")).is_err());
    }
}
