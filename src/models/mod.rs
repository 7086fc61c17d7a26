pub mod booking;
pub mod movie;
pub mod seat;
pub mod showtime;

pub use booking::{Booking, BookingDetails, NewBooking};
pub use movie::Movie;
pub use seat::SeatLayout;
pub use showtime::Showtime;
