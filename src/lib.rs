//! Movie Catalog
//!
//! Read-only queries over a Neo4j movie graph:
//! - Paginated movie listings ordered by an allow-listed property
//! - Movies by genre, actor and director
//! - Movie details and similar-movie ranking
//! - Genre listing with representative posters
//! - Per-user `favorite` annotation

pub mod catalog;
pub mod error;
pub mod neo4j;


pub use catalog::{MovieListParams, MovieRepository, Pagination, SortField, SortOrder};
pub use error::CatalogError;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub neo4j: Neo4jYamlConfig,
    pub catalog: CatalogYamlConfig,
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "letmein".into(),
        }
    }
}

/// Catalog behaviour section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogYamlConfig {
    /// User whose favorites annotate results when a call names none
    pub default_user_id: Option<String>,
    /// Largest page size a single call may request
    pub max_limit: usize,
}

impl Default for CatalogYamlConfig {
    fn default() -> Self {
        Self {
            default_user_id: None,
            max_limit: catalog::query::DEFAULT_MAX_LIMIT,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub default_user_id: Option<String>,
    pub max_limit: usize,
}

impl Config {
    /// Load configuration from environment variables and `config.yaml` if present.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let max_limit = match std::env::var("CATALOG_MAX_LIMIT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("CATALOG_MAX_LIMIT must be a number: {}", e))?,
            Err(_) => yaml.catalog.max_limit,
        };
        if i64::try_from(max_limit).is_err() {
            anyhow::bail!("max_limit must be at most {}, got {}", i64::MAX, max_limit);
        }

        let non_blank = |u: &String| !u.trim().is_empty();
        let default_user_id = std::env::var("USER_ID")
            .ok()
            .filter(non_blank)
            .or(yaml.catalog.default_user_id.filter(non_blank));

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            default_user_id,
            max_limit,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Connect to Neo4j and build a repository configured from `config`
pub async fn connect(config: &Config) -> Result<MovieRepository> {
    let client = neo4j::Neo4jClient::new(
        &config.neo4j_uri,
        &config.neo4j_user,
        &config.neo4j_password,
    )
    .await?;

    Ok(MovieRepository::new(Arc::new(client))
        .with_default_user(config.default_user_id.clone())
        .with_max_limit(config.max_limit))
}

// ============================================================================
// Tests
// ============================================================================
