use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::models::CoachLayout;
use crate::models::layout::{STANDARD_FULL_ROWS, STANDARD_LAST_ROW_CAPACITY, STANDARD_ROW_CAPACITY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

// Главная структура конфигурации
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub coach: CoachConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_seconds: u64,
}

// Настройки Redis (кеш снимка мест); без REDIS_URL кеш выключен
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub seats_ttl_seconds: u64,
}

// Схема вагона
#[derive(Debug, Clone, Deserialize)]
pub struct CoachConfig {
    pub full_rows: u32,
    pub row_capacity: u32,
    pub last_row_capacity: u32,
}

impl CoachConfig {
    pub fn layout(&self) -> CoachLayout {
        CoachLayout::new(self.full_rows, self.row_capacity, self.last_row_capacity)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собирает конфиг из произвольного источника `key -> value`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let storage = match vars.or("STORAGE_BACKEND", "postgres").as_str() {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid { key: "STORAGE_BACKEND", value: other.to_string() })
            }
        };

        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                pool_size: vars.parse("DB_POOL_SIZE", 10)?,
                acquire_timeout_seconds: vars.parse("DB_ACQUIRE_TIMEOUT_SECONDS", 5)?,
            }),
            StorageBackend::Memory => None,
        };

        let redis = match vars.get("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                seats_ttl_seconds: vars.parse("SEATS_CACHE_TTL_SECONDS", 60)?,
            }),
            None => None,
        };

        let log_format = match vars.or("LOG_FORMAT", "pretty").as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => return Err(ConfigError::Invalid { key: "LOG_FORMAT", value: other.to_string() }),
        };

        let coach = CoachConfig {
            full_rows: vars.parse("COACH_FULL_ROWS", STANDARD_FULL_ROWS)?,
            row_capacity: vars.parse("COACH_ROW_CAPACITY", STANDARD_ROW_CAPACITY)?,
            last_row_capacity: vars.parse("COACH_LAST_ROW_CAPACITY", STANDARD_LAST_ROW_CAPACITY)?,
        };
        if coach.full_rows == 0 && coach.last_row_capacity == 0 {
            return Err(ConfigError::Invalid { key: "COACH_FULL_ROWS", value: "0".to_string() });
        }

        Ok(Config {
            app: AppConfig {
                host: vars.or("HOST", "0.0.0.0"),
                port: vars.parse("PORT", 3005)?,
                rust_log: vars.or("RUST_LOG", "coach_reservation=debug,tower_http=debug"),
                log_format,
            },
            storage,
            database,
            redis,
            coach,
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value: raw }),
            None => Ok(default),
        }
    }
}
