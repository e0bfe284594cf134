use async_trait::async_trait;
use tracing::{debug, error};

use super::SeatStore;
use crate::database::Database;
use crate::error::StorageError;
use crate::models::{NewSeat, Seat, SeatId, SeatRow, SeatStatus};

const SELECT_SEATS: &str = "SELECT id, row_number, seat_number, status FROM seats";

#[derive(Clone)]
pub struct PgSeatStore {
    db: Database,
}

impl PgSeatStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn into_seats(rows: Vec<SeatRow>) -> Result<Vec<Seat>, StorageError> {
    rows.into_iter().map(Seat::try_from).collect()
}

#[async_trait]
impl SeatStore for PgSeatStore {
    async fn find_all(&self) -> Result<Vec<Seat>, StorageError> {
        let rows = sqlx::query_as::<_, SeatRow>(&format!("{SELECT_SEATS} ORDER BY row_number, seat_number"))
            .fetch_all(&self.db.pool)
            .await?;
        into_seats(rows)
    }

    async fn find_by_status(&self, status: SeatStatus) -> Result<Vec<Seat>, StorageError> {
        let rows = sqlx::query_as::<_, SeatRow>(&format!(
            "{SELECT_SEATS} WHERE status = $1 ORDER BY row_number, seat_number"
        ))
        .bind(status.as_str())
        .fetch_all(&self.db.pool)
        .await?;
        into_seats(rows)
    }

    async fn create_many(&self, seats: &[NewSeat]) -> Result<u64, StorageError> {
        let mut tx = self.db.pool.begin().await?;
        let mut created = 0;

        for seat in seats {
            let result = sqlx::query(
                "INSERT INTO seats (row_number, seat_number, status) VALUES ($1, $2, $3)"
            )
            .bind(seat.row_number)
            .bind(seat.seat_number)
            .bind(seat.status.as_str())
            .execute(&mut *tx)
            .await;

            match result {
                Ok(r) => created += r.rows_affected(),
                Err(e) => {
                    error!("create_many: insert ({}, {}) failed: {:?}", seat.row_number, seat.seat_number, e);
                    let _ = tx.rollback().await;
                    return Err(e.into());
                }
            }
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn update_status(&self, id: SeatId, status: SeatStatus) -> Result<(), StorageError> {
        sqlx::query("UPDATE seats SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn update_all_status(&self, status: SeatStatus) -> Result<u64, StorageError> {
        let result = sqlx::query("UPDATE seats SET status = $1, updated_at = NOW()")
            .bind(status.as_str())
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn reserve_seats(&self, ids: &[SeatId]) -> Result<(), StorageError> {
        let mut tx = self.db.pool.begin().await?;

        // compare-and-swap: обновляются только места, которые всё ещё empty
        let result = sqlx::query(
            r#"
            UPDATE seats
            SET status = 'reserved', updated_at = NOW()
            WHERE id = ANY($1) AND status = 'empty'
            "#
        )
        .bind(ids)
        .execute(&mut *tx)
        .await;

        let updated = match result {
            Ok(r) => r.rows_affected() as usize,
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(e.into());
            }
        };

        if updated != ids.len() {
            debug!("reserve_seats: expected {} rows, updated {}, rolling back", ids.len(), updated);
            tx.rollback().await?;
            return Err(StorageError::Conflict { expected: ids.len(), updated });
        }

        tx.commit().await?;
        Ok(())
    }
}
