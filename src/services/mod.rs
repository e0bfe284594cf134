pub mod allocator;
pub mod matrix;
pub mod selection;

pub use allocator::SeatAllocator;
pub use matrix::render_matrix;
pub use selection::{select_seats, validate_count};
