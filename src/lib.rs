pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{CacheService, SeatCache};
use crate::config::{Config, StorageBackend};
use crate::error::StorageError;
use crate::services::SeatAllocator;
use crate::storage::{MemorySeatStore, PgSeatStore, SeatStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub allocator: Arc<SeatAllocator>,
}

impl AppState {
    /// Поднимает хранилище по конфигу, подключает кеш и засевает вагон.
    pub async fn new(config: &Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn SeatStore> = match (config.storage, &config.database) {
            (StorageBackend::Postgres, Some(db_config)) => {
                let db = database::Database::connect(db_config).await?;
                info!("Database connected");
                Arc::new(PgSeatStore::new(db))
            }
            (StorageBackend::Postgres, None) => anyhow::bail!("DATABASE_URL must be set"),
            (StorageBackend::Memory, _) => {
                info!("Using in-memory seat storage");
                Arc::new(MemorySeatStore::new())
            }
        };

        let mut allocator = SeatAllocator::new(store, config.coach.layout());

        // Redis недоступен - работаем без кеша
        if let Some(redis_config) = &config.redis {
            match CacheService::connect(redis_config).await {
                Ok(cache) => {
                    let cache: Arc<dyn SeatCache> = Arc::new(cache);
                    allocator = allocator.with_cache(cache);
                }
                Err(e) => warn!("Redis unavailable, seats cache disabled: {:?}", e),
            }
        }

        Ok(Self::from_allocator(allocator).await?)
    }

    /// Засевает вагон (если пуст) и оборачивает распределитель в state.
    pub async fn from_allocator(allocator: SeatAllocator) -> Result<Arc<Self>, StorageError> {
        allocator.seed_if_empty().await?;
        Ok(Arc::new(Self { allocator: Arc::new(allocator) }))
    }
}
