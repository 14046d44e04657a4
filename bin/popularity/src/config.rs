//! TOML configuration: ranking settings plus the content to register at startup.

use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use popularity_content::{Content, ContentId, ContentRegistry};
use popularity_ranking::RankingConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) ranking: RankingConfig,
    /// Records registered before any action is read.
    pub(crate) content: Vec<SeedContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SeedContent {
    pub(crate) id: ContentId,
    #[serde(default)]
    pub(crate) popularity: u64,
}

impl AppConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .wrap_err_with(|| format!("failed to parse config file {}", path.display()))
    }

    /// Register every seed record. Duplicate ids in the file are an error.
    pub(crate) fn seed(&self, registry: &ContentRegistry) -> Result<usize> {
        for seed in &self.content {
            registry
                .register(Content::with_popularity(seed.id, seed.popularity))
                .wrap_err("invalid [[content]] entry")?;
        }
        debug!(count = self.content.len(), "seeded content registry");
        Ok(self.content.len())
    }
}
