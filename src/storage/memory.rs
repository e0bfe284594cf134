use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SeatStore;
use crate::error::StorageError;
use crate::models::{NewSeat, Seat, SeatId, SeatStatus};

/// In-memory хранилище: для тестов и запуска без Postgres.
#[derive(Debug, Default)]
pub struct MemorySeatStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    seats: Vec<Seat>,
    next_id: SeatId,
}

impl MemorySeatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    async fn find_all(&self) -> Result<Vec<Seat>, StorageError> {
        Ok(self.inner.read().await.seats.clone())
    }

    async fn find_by_status(&self, status: SeatStatus) -> Result<Vec<Seat>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.seats.iter().filter(|s| s.status == status).cloned().collect())
    }

    async fn create_many(&self, seats: &[NewSeat]) -> Result<u64, StorageError> {
        let mut inner = self.inner.write().await;
        for spec in seats {
            inner.next_id += 1;
            let id = inner.next_id;
            inner.seats.push(Seat {
                id,
                row_number: spec.row_number,
                seat_number: spec.seat_number,
                status: spec.status,
            });
        }
        inner.seats.sort_by_key(Seat::position);
        Ok(seats.len() as u64)
    }

    async fn update_status(&self, id: SeatId, status: SeatStatus) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if let Some(seat) = inner.seats.iter_mut().find(|s| s.id == id) {
            seat.status = status;
        }
        Ok(())
    }

    async fn update_all_status(&self, status: SeatStatus) -> Result<u64, StorageError> {
        let mut inner = self.inner.write().await;
        for seat in inner.seats.iter_mut() {
            seat.status = status;
        }
        Ok(inner.seats.len() as u64)
    }

    async fn reserve_seats(&self, ids: &[SeatId]) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;

        // сначала проверяем все, потом пишем - иначе частичная запись
        let updatable = ids
            .iter()
            .filter(|id| inner.seats.iter().any(|s| s.id == **id && s.is_empty()))
            .count();
        if updatable != ids.len() {
            return Err(StorageError::Conflict { expected: ids.len(), updated: 0 });
        }

        for seat in inner.seats.iter_mut().filter(|s| ids.contains(&s.id)) {
            seat.status = SeatStatus::Reserved;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(row: i32, seat: i32) -> NewSeat {
        NewSeat { row_number: row, seat_number: seat, status: SeatStatus::Empty }
    }

    #[tokio::test]
    async fn reads_are_ordered_by_row_then_seat() {
        let store = MemorySeatStore::new();
        store.create_many(&[spec(2, 1), spec(1, 2), spec(1, 1)]).await.unwrap();

        let positions: Vec<_> = store.find_all().await.unwrap().iter().map(Seat::position).collect();
        assert_eq!(positions, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn reserve_seats_is_all_or_nothing() {
        let store = MemorySeatStore::new();
        store.create_many(&[spec(1, 1), spec(1, 2), spec(1, 3)]).await.unwrap();
        let seats = store.find_all().await.unwrap();
        store.update_status(seats[1].id, SeatStatus::Booked).await.unwrap();

        let ids: Vec<_> = seats.iter().map(|s| s.id).collect();
        let err = store.reserve_seats(&ids).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { expected: 3, .. }));

        let empty = store.find_by_status(SeatStatus::Empty).await.unwrap();
        assert_eq!(empty.len(), 2);
        assert!(store.find_by_status(SeatStatus::Reserved).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_all_status_touches_every_seat() {
        let store = MemorySeatStore::new();
        store.create_many(&[spec(1, 1), spec(1, 2)]).await.unwrap();
        let ids: Vec<_> = store.find_all().await.unwrap().iter().map(|s| s.id).collect();
        store.reserve_seats(&ids).await.unwrap();

        assert_eq!(store.update_all_status(SeatStatus::Empty).await.unwrap(), 2);
        assert_eq!(store.find_by_status(SeatStatus::Empty).await.unwrap().len(), 2);
    }
}
