//! User configuration and credential storage.
//!
//! Settings live in `<config_dir>/config.yaml`. API keys never touch that file: they are
//! kept in the OS keyring, with a `<PROVIDER>_API_KEY` environment variable as fallback.

use crate::{Error, ErrorContext, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const CONFIG_DIR_ENV: &str = "VOICEFORGE_CONFIG_DIR";
const KEYRING_SERVICE: &str = "voiceforge";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub default_voice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_provider: String,
    pub output_directory: PathBuf,
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "fish_audio".to_string(),
            ProviderSettings {
                default_voice: crate::tts::DEFAULT_VOICE.to_string(),
                base_url: None,
            },
        );
        Self {
            default_provider: "fish_audio".to_string(),
            output_directory: PathBuf::from("./voiceforge_output"),
            providers,
        }
    }
}

impl Config {
    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.get(name)
    }

    pub fn default_voice(&self, provider: &str) -> Option<&str> {
        self.providers.get(provider).map(|p| p.default_voice.as_str())
    }

    pub fn base_url(&self, provider: &str) -> Option<&str> {
        self.providers
            .get(provider)
            .and_then(|p| p.base_url.as_deref())
    }
}

/// `--config-dir`, then `VOICEFORGE_CONFIG_DIR`, then the platform config directory.
pub fn resolve_config_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|d| d.join("voiceforge"))
        .ok_or_else(|| {
            Error::configuration_with_context(
                "cannot determine a configuration directory",
                ErrorContext::new()
                    .with_details(format!("pass --config-dir or set {}", CONFIG_DIR_ENV)),
            )
        })
}

/// Loads, edits and persists a [`Config`].
pub struct ConfigManager {
    dir: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Load from `dir`. A missing file yields defaults; an unreadable one is reported
    /// and replaced by defaults in memory (the file itself is left alone until `save`).
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(CONFIG_FILE_NAME);
        let config = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_yaml::from_str::<Config>(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt config file; using defaults");
                    Config::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file; using defaults");
                Config::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config file; using defaults");
                Config::default()
            }
        };
        Self { dir, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let text = serde_yaml::to_string(&self.config)?;
        std::fs::write(self.path(), text)?;
        debug!(path = %self.path().display(), "config saved");
        Ok(())
    }

    pub fn set_default_provider(&mut self, provider: impl Into<String>) {
        self.config.default_provider = provider.into();
    }

    pub fn set_output_directory(&mut self, dir: impl Into<PathBuf>) {
        self.config.output_directory = dir.into();
    }

    pub fn set_default_voice(&mut self, provider: &str, voice: impl Into<String>) -> Result<()> {
        let voice = voice.into();
        if voice.trim().is_empty() {
            return Err(Error::validation_with_context(
                "voice is empty",
                ErrorContext::new()
                    .with_field_path(format!("providers.{}.default_voice", provider))
                    .with_source("config_manager"),
            ));
        }
        self.config
            .providers
            .entry(provider.to_string())
            .and_modify(|p| p.default_voice = voice.clone())
            .or_insert(ProviderSettings {
                default_voice: voice,
                base_url: None,
            });
        Ok(())
    }

    pub fn reset(&mut self) {
        self.config = Config::default();
    }

    pub fn list_providers(&self) -> Vec<&str> {
        self.config.providers.keys().map(String::as_str).collect()
    }
}

/// Source of API keys, one per provider.
pub trait CredentialStore: Send + Sync {
    fn get_credential(&self, provider: &str) -> Option<String>;
    fn set_credential(&self, provider: &str, credential: &str) -> Result<()>;
    fn remove_credential(&self, provider: &str) -> Result<()>;
}

/// OS keyring with an environment variable fallback for reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringCredentials;

impl KeyringCredentials {
    fn entry(provider: &str) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE, provider).map_err(|e| keyring_error(provider, e))
    }

    pub fn env_var_name(provider: &str) -> String {
        format!("{}_API_KEY", provider.to_uppercase())
    }
}

fn keyring_error(provider: &str, e: keyring::Error) -> Error {
    Error::configuration_with_context(
        format!("keyring error: {}", e),
        ErrorContext::new()
            .with_field_path(provider)
            .with_source("keyring"),
    )
}

impl CredentialStore for KeyringCredentials {
    fn get_credential(&self, provider: &str) -> Option<String> {
        if let Ok(entry) = Self::entry(provider) {
            match entry.get_password() {
                Ok(key) if !key.is_empty() => return Some(key),
                Ok(_) | Err(keyring::Error::NoEntry) => {}
                Err(e) => debug!(provider, error = %e, "keyring lookup failed"),
            }
        }
        env::var(Self::env_var_name(provider))
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    fn set_credential(&self, provider: &str, credential: &str) -> Result<()> {
        Self::entry(provider)?
            .set_password(credential)
            .map_err(|e| keyring_error(provider, e))
    }

    fn remove_credential(&self, provider: &str) -> Result<()> {
        match Self::entry(provider)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(provider, e)),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCredentials {
    keys: RwLock<HashMap<String, String>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentials {
    fn get_credential(&self, provider: &str) -> Option<String> {
        self.keys.read().ok()?.get(provider).cloned()
    }

    fn set_credential(&self, provider: &str, credential: &str) -> Result<()> {
        if let Ok(mut keys) = self.keys.write() {
            keys.insert(provider.to_string(), credential.to_string());
        }
        Ok(())
    }

    fn remove_credential(&self, provider: &str) -> Result<()> {
        if let Ok(mut keys) = self.keys.write() {
            keys.remove(provider);
        }
        Ok(())
    }
}
