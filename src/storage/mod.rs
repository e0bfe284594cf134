//! Хранилище мест вагона.
//!
//! Ядро работает только через [`SeatStore`]; Postgres и in-memory
//! реализации взаимозаменяемы. Все чтения упорядочены по (ряд, место).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{NewSeat, Seat, SeatId, SeatStatus};

pub use memory::MemorySeatStore;
pub use postgres::PgSeatStore;

#[async_trait]
pub trait SeatStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Seat>, StorageError>;

    async fn find_by_status(&self, status: SeatStatus) -> Result<Vec<Seat>, StorageError>;

    /// Вставляет все места одной операцией. Возвращает количество созданных.
    async fn create_many(&self, seats: &[NewSeat]) -> Result<u64, StorageError>;

    async fn update_status(&self, id: SeatId, status: SeatStatus) -> Result<(), StorageError>;

    async fn update_all_status(&self, status: SeatStatus) -> Result<u64, StorageError>;

    /// Атомарно переводит все `ids` из `empty` в `reserved`.
    /// Если хотя бы одно место уже не `empty`, не меняется ничего
    /// и возвращается [`StorageError::Conflict`].
    async fn reserve_seats(&self, ids: &[SeatId]) -> Result<(), StorageError>;
}
