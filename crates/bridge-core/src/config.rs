//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_SEARCH__MAX_RESULTS`). Every setting
//! has a default, so an empty environment yields a usable [`Settings`].

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::query::MAX_FUZZINESS;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Load from config files under `dir` for the named environment.
    pub fn load_from(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    /// Directory holding the index collection, resolved against the config dir.
    pub fn index_dir(&self) -> anyhow::Result<PathBuf> {
        let settings = self.settings()?;
        Ok(resolve_with_base(&self.base_dir, &settings.index.root).join(&settings.index.collection))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub index: IndexSettings,
    pub search: SearchSettings,
    pub discovery: DiscoverySettings,
    pub lazy_ingest: LazyIngestSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexSettings {
    pub root: String,
    pub collection: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { root: "dev_data/indexes".to_string(), collection: "wikipedia".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub max_results: usize,
    pub candidate_limit: usize,
    pub fuzziness: u8,
    pub title_fuzziness: u8,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { max_results: 50, candidate_limit: 10, fuzziness: 1, title_fuzziness: 1, timeout_secs: 10 }
    }
}

impl SearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoverySettings {
    pub depth_budget: u32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self { depth_budget: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LazyIngestSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for LazyIngestSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://en.wikipedia.org/api/rest_v1/page/summary/".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        let s = &self.search;
        if s.max_results == 0 {
            return Err(Error::InvalidConfig("search.max_results must be at least 1".to_string()));
        }
        if s.candidate_limit == 0 {
            return Err(Error::InvalidConfig("search.candidate_limit must be at least 1".to_string()));
        }
        if s.fuzziness > MAX_FUZZINESS || s.title_fuzziness > MAX_FUZZINESS {
            return Err(Error::InvalidConfig(format!("search fuzziness must be at most {MAX_FUZZINESS}")));
        }
        if s.timeout_secs == 0 {
            return Err(Error::InvalidConfig("search.timeout_secs must be positive".to_string()));
        }
        if self.index.collection.trim().is_empty() {
            return Err(Error::InvalidConfig("index.collection must not be blank".to_string()));
        }
        if self.lazy_ingest.enabled && self.lazy_ingest.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("lazy_ingest.endpoint is required when enabled".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
