use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::RedisConfig;
use crate::models::Seat;

const SEATS_KEY: &str = "coach:seats";

/// Кеш снимка мест для GET /seats.
///
/// Ошибки кеша не пробрасываются: промах или сбой = `None`, вызывающий
/// идёт в хранилище. Заполнение и инвалидация делаются распределителем
/// под его мьютексом, поэтому устаревший снимок не может лечь в кеш после записи.
#[async_trait]
pub trait SeatCache: Send + Sync {
    async fn get_seats(&self) -> Option<Vec<Seat>>;

    async fn save_seats(&self, seats: &[Seat]);

    async fn invalidate_seats(&self);
}

/// Redis-реализация.
#[derive(Clone)]
pub struct CacheService {
    conn: MultiplexedConnection,
    ttl_seconds: u64,
}

impl CacheService {
    pub async fn connect(config: &RedisConfig) -> redis::RedisResult<Self> {
        let client = Client::open(config.url.as_str())?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!("Redis connected, seats cache TTL {}s", config.seats_ttl_seconds);
        Ok(Self { conn, ttl_seconds: config.seats_ttl_seconds })
    }

    async fn get_seats_from_cache(&self) -> Result<Option<Vec<Seat>>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(SEATS_KEY).await?;
        let Some(data) = data else {
            return Ok(None);
        };
        let seats: Vec<Seat> = serde_json::from_str(&data).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error"))
        })?;
        Ok(Some(seats))
    }

    async fn save_seats_to_cache(&self, seats: &[Seat]) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(seats).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.conn.clone();
        conn.set_ex(SEATS_KEY, data, self.ttl_seconds).await
    }
}

#[async_trait]
impl SeatCache for CacheService {
    async fn get_seats(&self) -> Option<Vec<Seat>> {
        match self.get_seats_from_cache().await {
            Ok(Some(seats)) => {
                debug!("seats cache hit");
                Some(seats)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("seats cache read failed: {:?}", e);
                None
            }
        }
    }

    async fn save_seats(&self, seats: &[Seat]) {
        if let Err(e) = self.save_seats_to_cache(seats).await {
            warn!("seats cache write failed: {:?}", e);
        }
    }

    async fn invalidate_seats(&self) {
        let mut conn = self.conn.clone();
        let result: Result<(), _> = conn.del(SEATS_KEY).await;
        match result {
            Ok(()) => debug!("Invalidated seats cache"),
            Err(e) => warn!("seats cache invalidation failed: {:?}", e),
        }
    }
}

/// In-process кеш без TTL.
#[derive(Debug, Default)]
pub struct MemorySeatCache {
    seats: RwLock<Option<Vec<Seat>>>,
}

impl MemorySeatCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatCache for MemorySeatCache {
    async fn get_seats(&self) -> Option<Vec<Seat>> {
        self.seats.read().await.clone()
    }

    async fn save_seats(&self, seats: &[Seat]) {
        *self.seats.write().await = Some(seats.to_vec());
    }

    async fn invalidate_seats(&self) {
        *self.seats.write().await = None;
    }
}
