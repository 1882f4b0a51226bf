use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;

const DEFAULT_PG_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PG_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PG_ACQUIRE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "pg" => Ok(StorageBackend::Postgres),
            other => bail!("unknown storage backend: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    DEFAULT_PG_MAX_CONNECTIONS
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_PG_CONNECT_TIMEOUT_MS
}

fn default_acquire_timeout_ms() -> u64 {
    DEFAULT_PG_ACQUIRE_TIMEOUT_MS
}

// Engine configuration sourced from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
}

#[derive(Debug, Deserialize)]
struct AccessConfigOverride {
    storage: Option<StorageBackend>,
    postgres: Option<PostgresConfig>,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

impl AccessConfig {
    pub fn from_env() -> Result<Self> {
        let storage = match std::env::var("LIN_ACCESS_STORAGE") {
            Ok(value) => value
                .parse::<StorageBackend>()
                .with_context(|| "parse LIN_ACCESS_STORAGE")?,
            Err(_) => StorageBackend::Memory,
        };
        let postgres = std::env::var("LIN_ACCESS_POSTGRES_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .ok()
            .map(|url| PostgresConfig {
                url,
                max_connections: std::env::var("LIN_ACCESS_PG_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|value| value.parse::<u32>().ok())
                    .filter(|value| *value > 0)
                    .unwrap_or(DEFAULT_PG_MAX_CONNECTIONS),
                connect_timeout_ms: env_u64(
                    "LIN_ACCESS_PG_CONNECT_TIMEOUT_MS",
                    DEFAULT_PG_CONNECT_TIMEOUT_MS,
                ),
                acquire_timeout_ms: env_u64(
                    "LIN_ACCESS_PG_ACQUIRE_TIMEOUT_MS",
                    DEFAULT_PG_ACQUIRE_TIMEOUT_MS,
                ),
            });
        Ok(Self { storage, postgres })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("LIN_ACCESS_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read LIN_ACCESS_CONFIG: {path}"))?;
            let override_cfg: AccessConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse access config yaml")?;
            if let Some(value) = override_cfg.storage {
                config.storage = value;
            }
            if let Some(value) = override_cfg.postgres {
                config.postgres = Some(value);
            }
        }
        Ok(config)
    }
}
