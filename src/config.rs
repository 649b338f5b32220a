use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{HeroError, Result};

pub const CONFIG_FOLDER: &str = "hero-cards";
pub const CONFIG_FILE: &str = "config.toml";

pub const API_KEY_ENV: &str = "HERO_CARDS_API_KEY";
pub const STORE_URL_ENV: &str = "HERO_CARDS_STORE_URL";

pub const DEFAULT_TABLE: &str = "leaderboard";
pub const DEFAULT_PAGE_SIZE: usize = 8;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_AVATAR_TIMEOUT_MS: u64 = 650;
pub const DEFAULT_FALLBACK: &str = "/pfp.png";
pub const DEFAULT_ORIGIN: &str = "https://union-hero-cards.vercel.app";

const DEFAULT_SOURCES: [&str; 3] = [
    "https://unavatar.io/x/",
    "https://unavatar.io/",
    "https://unavatar.vercel.app/x/",
];

const DEFAULT_TEAM: [&str; 5] = [
    "0xkaiserkarel",
    "corcoder",
    "e_beriker",
    "luknyb",
    "eastwood_eth",
];

/// Runtime configuration of the resolution pipeline.
///
/// Persisted as TOML. Every section and field is optional; anything left out
/// takes its default value.
///
/// Storage location:
/// - Linux: $XDG_CONFIG_HOME/hero-cards/config.toml or
///   $HOME/.config/hero-cards/config.toml
/// - macOS: $HOME/Library/Application Support/hero-cards/config.toml
/// - Windows: %APPDATA%\hero-cards\config.toml
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub avatar: AvatarConfig,
    pub card: CardConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base of the REST endpoint, e.g. `https://<project>.supabase.co/rest/v1`
    pub url: Option<Url>,
    pub table: String,
    /// Access credential attached to every store request
    pub api_key: Option<String>,
    /// Result cap of a single lookup query
    pub page_size: usize,
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            table: DEFAULT_TABLE.to_owned(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where the facade takes the avatar of a matched profile from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarMode {
    /// Only the avatar stored with the profile; none means not found.
    #[default]
    Profile,
    /// The stored avatar, else the handle-derived sources.
    ProfileThenSources,
    /// Always the handle-derived sources.
    Sources,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub timeout_ms: u64,
    /// Base URLs, tried in order; the handle is appended as a path segment.
    pub sources: Vec<Url>,
    pub fallback: String,
    pub mode: AvatarMode,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_AVATAR_TIMEOUT_MS,
            sources: DEFAULT_SOURCES
                .iter()
                .filter_map(|s| Url::parse(s).ok())
                .collect(),
            fallback: DEFAULT_FALLBACK.to_owned(),
            mode: AvatarMode::default(),
        }
    }
}

impl AvatarConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Handles that get the team card
    pub team: Vec<String>,
    /// Origin used to build personal card links
    pub origin: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            team: DEFAULT_TEAM.iter().map(|s| s.to_string()).collect(),
            origin: DEFAULT_ORIGIN.to_owned(),
        }
    }
}

impl Config {
    /// Returns the configuration directory path under the user's
    /// platform-appropriate config directory.
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = env::var("APPDATA") {
                return Ok(PathBuf::from(appdata).join(CONFIG_FOLDER));
            }
            return Err(HeroError::Config(
                "Unable to determine config directory (missing APPDATA)"
                    .to_owned(),
            ));
        }

        #[cfg(target_os = "macos")]
        {
            if let Ok(home) = env::var("HOME") {
                return Ok(PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(CONFIG_FOLDER));
            }
            return Err(HeroError::Config(
                "Unable to determine config directory (missing HOME)"
                    .to_owned(),
            ));
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = if let Ok(xdg_config_home) =
                env::var("XDG_CONFIG_HOME")
            {
                PathBuf::from(xdg_config_home)
            } else if let Ok(home) = env::var("HOME") {
                PathBuf::from(home).join(".config")
            } else {
                return Err(HeroError::Config(
                    "Unable to determine config directory (missing XDG_CONFIG_HOME/HOME)"
                        .to_owned(),
                ));
            };
            Ok(config_dir.join(CONFIG_FOLDER))
        }
    }

    /// Returns the full config file path.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Loads the configuration from `path`, or from the default location
    /// when no path is given, then applies environment overrides.
    ///
    /// A missing default file yields the default configuration, while an
    /// explicitly requested file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::config_file()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    log::debug!(
                        "no config at {}, using defaults",
                        path.display()
                    );
                    Self::default()
                }
            }
        };

        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        log::debug!("loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Credential and store location may come from the environment; they
    /// take precedence over the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.store.api_key = Some(key);
        }
        if let Some(url) = lookup(STORE_URL_ENV).filter(|u| !u.is_empty()) {
            self.store.url = Some(Url::parse(&url)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.page_size == 0 {
            return Err(HeroError::Config(
                "store.page_size must be positive".to_owned(),
            ));
        }
        if self.store.table.is_empty() {
            return Err(HeroError::Config(
                "store.table must not be empty".to_owned(),
            ));
        }
        if self.avatar.fallback.is_empty() {
            return Err(HeroError::Config(
                "avatar.fallback must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}
