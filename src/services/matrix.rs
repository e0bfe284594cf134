use crate::models::{CoachLayout, Seat, SeatCell, SeatMatrix, SeatStatus};

/// Матрица мест по схеме вагона. `booked: true` только для статуса `booked`;
/// `reserved` в матрице не отображается. Места вне схемы игнорируются.
pub fn render_matrix(seats: &[Seat], layout: &CoachLayout) -> SeatMatrix {
    let mut matrix: SeatMatrix = layout
        .capacities()
        .iter()
        .map(|&cap| vec![SeatCell { booked: false }; cap as usize])
        .collect();

    for seat in seats.iter().filter(|s| s.status == SeatStatus::Booked) {
        if !layout.contains(seat.row_number, seat.seat_number) {
            continue;
        }
        let row = seat.row_number as usize - 1;
        let col = seat.seat_number as usize - 1;
        matrix[row][col].booked = true;
    }

    matrix
}
