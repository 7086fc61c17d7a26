pub mod booking;
pub mod reservations;
pub mod seat_locks;
