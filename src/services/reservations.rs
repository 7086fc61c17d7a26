//! Seat reservation index and the booking validator built on it.

use std::collections::HashSet;

use sqlx::Sqlite;

use crate::error::AppError;
use crate::models::seat::{split_seats, SeatLayout};
use crate::models::Booking;

pub const SEATS_TAKEN_MESSAGE: &str = "One or more seats are already booked.";

/// Seats already claimed by existing bookings for one showtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationIndex {
    seats: HashSet<String>,
}

impl ReservationIndex {
    /// Unions the comma-joined seat lists of a showtime's bookings.
    pub fn from_seat_lists<I, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seats = HashSet::new();
        for list in lists {
            seats.extend(split_seats(list.as_ref()).map(str::to_string));
        }
        ReservationIndex { seats }
    }

    pub async fn load<'e, E>(executor: E, showtime_id: i64) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let lists = Booking::seat_lists_for_showtime(executor, showtime_id).await?;
        Ok(Self::from_seat_lists(lists))
    }

    pub fn contains(&self, seat_id: &str) -> bool {
        self.seats.contains(seat_id)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Reserved seats in grid order.
    pub fn to_sorted_vec(&self, layout: &SeatLayout) -> Vec<String> {
        let mut seats: Vec<String> = self.seats.iter().cloned().collect();
        layout.sort_seats(&mut seats);
        seats
    }
}

/// Checks a seat selection against the layout and the current reservations.
///
/// Rejects empty selections, ids outside the grid, repeated ids and any seat
/// already in `reserved`. Accepting has no side effect.
pub fn validate_selection(
    requested: &[String],
    layout: &SeatLayout,
    reserved: &ReservationIndex,
) -> Result<(), AppError> {
    if requested.is_empty() {
        return Err(AppError::validation("At least one seat must be selected"));
    }

    let mut seen = HashSet::with_capacity(requested.len());
    for seat in requested {
        if !layout.contains(seat) {
            return Err(AppError::validation(format!("Unknown seat: {seat}")));
        }
        if !seen.insert(seat.as_str()) {
            return Err(AppError::validation(format!("Seat selected twice: {seat}")));
        }
    }

    if requested.iter().any(|seat| reserved.contains(seat)) {
        return Err(AppError::Conflict(SEATS_TAKEN_MESSAGE.to_string()));
    }

    Ok(())
}
