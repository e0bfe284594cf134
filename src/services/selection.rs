//! Выбор мест под бронь.
//!
//! Чистые функции над снимком мест, без обращения к хранилищу:
//! 1.  **Один ряд**: первый ряд (по возрастанию номера), где свободно не меньше
//!     `count` мест; берутся первые `count` свободных мест ряда.
//! 2.  **Ближайшие свободные**: если такого ряда нет, берутся первые `count`
//!     подряд идущих записей в общем списке свободных мест (ряд, место).
//!     Места могут оказаться в разных рядах и не быть соседними физически.
//!
//! При одинаковом снимке и `count` результат детерминирован.

use crate::error::AllocationError;
use crate::models::{CoachLayout, Seat};

/// Проверка размера запроса до поиска мест.
pub fn validate_count(count: u32, layout: &CoachLayout) -> Result<(), AllocationError> {
    if count == 0 {
        return Err(AllocationError::InvalidCount);
    }
    let max = layout.max_row_capacity();
    if count > max {
        return Err(AllocationError::RequestTooLarge { requested: count, max });
    }
    Ok(())
}

/// Выбирает `count` мест из `seats`. Ничего не мутирует.
pub fn select_seats(
    seats: &[Seat],
    layout: &CoachLayout,
    count: u32,
) -> Result<Vec<Seat>, AllocationError> {
    validate_count(count, layout)?;

    let mut empty: Vec<&Seat> = seats.iter().filter(|s| s.is_empty()).collect();
    empty.sort_by_key(|s| s.position());

    let wanted = count as usize;

    if let Some(row) = first_row_with_capacity(&empty, wanted) {
        return Ok(row.iter().take(wanted).map(|s| (*s).clone()).collect());
    }

    // окно длины count по отфильтрованному списку - первое же подходит
    match empty.windows(wanted).next() {
        Some(run) => Ok(run.iter().map(|s| (*s).clone()).collect()),
        None => Err(AllocationError::InsufficientSeats {
            requested: count,
            available: empty.len(),
        }),
    }
}

// `empty` отсортирован, поэтому ряд - непрерывный срез
fn first_row_with_capacity<'a, 'b>(empty: &'b [&'a Seat], wanted: usize) -> Option<&'b [&'a Seat]> {
    empty
        .chunk_by(|a, b| a.row_number == b.row_number)
        .find(|row| row.len() >= wanted)
}
