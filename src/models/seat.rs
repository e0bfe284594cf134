use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::StorageError;

/// Surrogate key, назначается хранилищем.
pub type SeatId = i64;

// Статус места. `booked` - отдельное терминальное состояние, только его видно в матрице
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Empty,
    Reserved,
    Booked,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Empty => "empty",
            SeatStatus::Reserved => "reserved",
            SeatStatus::Booked => "booked",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown seat status '{0}'")]
pub struct UnknownSeatStatus(pub String);

impl FromStr for SeatStatus {
    type Err = UnknownSeatStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(SeatStatus::Empty),
            "reserved" => Ok(SeatStatus::Reserved),
            "booked" => Ok(SeatStatus::Booked),
            other => Err(UnknownSeatStatus(other.to_string())),
        }
    }
}

/// Одно физическое место. `seat_number` нумеруется внутри ряда,
/// так что идентичность места - пара (row_number, seat_number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: SeatId,
    pub row_number: i32,
    pub seat_number: i32,
    pub status: SeatStatus,
}

impl Seat {
    pub fn is_empty(&self) -> bool {
        self.status == SeatStatus::Empty
    }

    pub fn position(&self) -> (i32, i32) {
        (self.row_number, self.seat_number)
    }
}

// Спецификация для createMany
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSeat {
    pub row_number: i32,
    pub seat_number: i32,
    pub status: SeatStatus,
}

// Строка из БД: статус хранится как TEXT
#[derive(Debug, Clone, FromRow)]
pub struct SeatRow {
    pub id: i64,
    pub row_number: i32,
    pub seat_number: i32,
    pub status: String,
}

impl TryFrom<SeatRow> for Seat {
    type Error = StorageError;

    fn try_from(row: SeatRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<SeatStatus>().map_err(|e| StorageError::CorruptRow {
            id: row.id,
            reason: e.to_string(),
        })?;

        Ok(Seat {
            id: row.id,
            row_number: row.row_number,
            seat_number: row.seat_number,
            status,
        })
    }
}
