//! # Configuration
//!
//! Environment-driven settings for the bot process. `.env` files are loaded by
//! the binary via `dotenvy` before `Config::from_env` runs.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default interval between scheduler cycles
pub const DEFAULT_TICK_SECONDS: u64 = 15;

/// Default lifetime of a staged reminder token (10 minutes)
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 10 * 60;

/// Default fixed offset used for human-entered dates (UTC+7)
pub const DEFAULT_TZ_OFFSET_MINUTES: i32 = 420;

/// Default label rendered after local times
pub const DEFAULT_TZ_LABEL: &str = "WIB";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Guild for instant command registration during development
    pub discord_guild_id: Option<String>,
    pub log_level: String,
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
    pub reminder_tick: Duration,
    pub reminder_token_ttl: Duration,
    pub tz_offset_minutes: i32,
    pub tz_label: String,
    /// Search page used for `[Watch]` links on watchlist items; unset hides them
    pub watch_search_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let discord_guild_id = lookup("DISCORD_GUILD_ID").filter(|id| !id.trim().is_empty());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let tick_seconds: u64 =
            parse_or_default(&lookup, "REMINDER_TICK_SECONDS", DEFAULT_TICK_SECONDS)?;
        if tick_seconds == 0 {
            return Err(anyhow!("REMINDER_TICK_SECONDS must be greater than zero"));
        }
        let ttl_seconds: u64 =
            parse_or_default(&lookup, "REMINDER_TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?;
        let tz_offset_minutes: i32 =
            parse_or_default(&lookup, "TZ_OFFSET_MINUTES", DEFAULT_TZ_OFFSET_MINUTES)?;
        if tz_offset_minutes.abs() >= 24 * 60 {
            return Err(anyhow!(
                "TZ_OFFSET_MINUTES must be within ±1439, got {}",
                tz_offset_minutes
            ));
        }
        let tz_label = lookup("TZ_LABEL").unwrap_or_else(|| DEFAULT_TZ_LABEL.to_string());
        let watch_search_url = lookup("WATCH_SEARCH_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            discord_token,
            discord_guild_id,
            log_level,
            data_dir,
            reminder_tick: Duration::from_secs(tick_seconds),
            reminder_token_ttl: Duration::from_secs(ttl_seconds),
            tz_offset_minutes,
            tz_label,
            watch_search_url,
        })
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.data_dir.join("reminders.json")
    }

    pub fn watchlist_path(&self) -> PathBuf {
        self.data_dir.join("watchlist_movies.json")
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir.join("contacts.json")
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert!(config.discord_guild_id.is_none());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.reminder_tick, Duration::from_secs(15));
        assert_eq!(config.reminder_token_ttl, Duration::from_secs(600));
        assert_eq!(config.tz_offset_minutes, 420);
        assert_eq!(config.tz_label, "WIB");
        assert!(config.watch_search_url.is_none());
        assert_eq!(config.reminders_path(), PathBuf::from("./data/reminders.json"));
        assert_eq!(
            config.watchlist_path(),
            PathBuf::from("./data/watchlist_movies.json")
        );
        assert_eq!(config.contacts_path(), PathBuf::from("./data/contacts.json"));
    }

    #[test]
    fn test_missing_token_is_error() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DISCORD_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_GUILD_ID", "123456789012345678"),
            ("DATA_DIR", "/var/lib/pengingat"),
            ("REMINDER_TICK_SECONDS", "5"),
            ("REMINDER_TOKEN_TTL_SECONDS", "120"),
            ("TZ_OFFSET_MINUTES", "-300"),
            ("TZ_LABEL", "EST"),
            ("WATCH_SEARCH_URL", " https://example.com/search "),
        ]))
        .unwrap();

        assert_eq!(config.discord_guild_id.as_deref(), Some("123456789012345678"));
        assert_eq!(
            config.reminders_path(),
            PathBuf::from("/var/lib/pengingat/reminders.json")
        );
        assert_eq!(config.reminder_tick, Duration::from_secs(5));
        assert_eq!(config.reminder_token_ttl, Duration::from_secs(120));
        assert_eq!(config.tz_offset_minutes, -300);
        assert_eq!(config.tz_label, "EST");
        assert_eq!(
            config.watch_search_url.as_deref(),
            Some("https://example.com/search")
        );
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("REMINDER_TICK_SECONDS", "soon"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("REMINDER_TICK_SECONDS", "0"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("TZ_OFFSET_MINUTES", "1440"),
        ]))
        .is_err());
    }
}
