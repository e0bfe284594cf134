pub mod layout;
pub mod seat;

pub use layout::{CoachLayout, SeatCell, SeatMatrix};
pub use seat::{NewSeat, Seat, SeatId, SeatRow, SeatStatus};
