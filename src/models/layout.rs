use serde::Serialize;

pub const STANDARD_FULL_ROWS: u32 = 11;
pub const STANDARD_ROW_CAPACITY: u32 = 7;
pub const STANDARD_LAST_ROW_CAPACITY: u32 = 3;

/// Фиксированная схема вагона: вместимость каждого ряда по порядку.
/// Ряды и места нумеруются с 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachLayout {
    rows: Vec<u32>,
}

impl CoachLayout {
    /// `full_rows` рядов по `row_capacity` мест плюс короткий последний ряд.
    /// Если `last_row_capacity == 0`, короткого ряда нет.
    pub fn new(full_rows: u32, row_capacity: u32, last_row_capacity: u32) -> Self {
        let mut rows = vec![row_capacity; full_rows as usize];
        if last_row_capacity > 0 {
            rows.push(last_row_capacity);
        }
        Self { rows }
    }

    // 11 рядов по 7 + последний ряд на 3 = 80 мест
    pub fn standard() -> Self {
        Self::new(STANDARD_FULL_ROWS, STANDARD_ROW_CAPACITY, STANDARD_LAST_ROW_CAPACITY)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Вместимость ряда `row` (с 1), `None` если такого ряда нет.
    pub fn row_capacity(&self, row: i32) -> Option<u32> {
        if row < 1 {
            return None;
        }
        self.rows.get(row as usize - 1).copied()
    }

    pub fn capacities(&self) -> &[u32] {
        &self.rows
    }

    pub fn max_row_capacity(&self) -> u32 {
        self.rows.iter().copied().max().unwrap_or(0)
    }

    pub fn total_seats(&self) -> usize {
        self.rows.iter().map(|&c| c as usize).sum()
    }

    pub fn contains(&self, row: i32, seat_number: i32) -> bool {
        seat_number >= 1
            && self
                .row_capacity(row)
                .is_some_and(|cap| seat_number as u32 <= cap)
    }

    /// Все позиции (ряд, место) по возрастанию.
    pub fn positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(idx, &cap)| {
            let row = idx as i32 + 1;
            (1..=cap as i32).map(move |seat| (row, seat))
        })
    }
}

impl Default for CoachLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatCell {
    pub booked: bool,
}

pub type SeatMatrix = Vec<Vec<SeatCell>>;
