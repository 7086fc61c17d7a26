use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::seat::split_seats;
use crate::models::{Booking, BookingDetails, NewBooking, SeatLayout, Showtime};
use crate::services::reservations::{validate_selection, ReservationIndex};
use crate::services::seat_locks::ShowtimeLocks;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";

/// Seats arrive either as a JSON array or as one comma-joined string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeatSelection {
    List(Vec<String>),
    Joined(String),
}

impl SeatSelection {
    pub fn into_seats(self) -> Vec<String> {
        match self {
            SeatSelection::List(seats) => seats
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            SeatSelection::Joined(raw) => split_seats(&raw).map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(required, range(min = 1))]
    pub movie_id: Option<i64>,
    #[validate(required, range(min = 1))]
    pub showtime_id: Option<i64>,
    #[validate(required, length(min = 1))]
    pub customer_name: Option<String>,
    #[validate(required, length(min = 1))]
    pub customer_email: Option<String>,
    pub seats: Option<SeatSelection>,
}

/// A request that passed field validation.
#[derive(Debug, Clone)]
struct BookingOrder {
    movie_id: i64,
    showtime_id: i64,
    customer_name: String,
    customer_email: String,
    seats: Vec<String>,
}

impl CreateBookingRequest {
    fn into_order(self) -> AppResult<BookingOrder> {
        self.validate()
            .map_err(|_| AppError::validation(MISSING_FIELDS_MESSAGE))?;

        let missing = || AppError::validation(MISSING_FIELDS_MESSAGE);
        let seats = self.seats.map(SeatSelection::into_seats).unwrap_or_default();
        if seats.is_empty() {
            return Err(missing());
        }

        Ok(BookingOrder {
            movie_id: self.movie_id.ok_or_else(missing)?,
            showtime_id: self.showtime_id.ok_or_else(missing)?,
            customer_name: non_blank(self.customer_name).ok_or_else(missing)?,
            customer_email: non_blank(self.customer_email).ok_or_else(missing)?,
            seats,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Availability view of one showtime.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMap {
    pub showtime: Showtime,
    pub layout: SeatLayout,
    pub reserved_seats: Vec<String>,
}

#[derive(Clone)]
pub struct BookingService {
    db: Database,
    layout: SeatLayout,
    locks: ShowtimeLocks,
}

impl BookingService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            layout: SeatLayout::standard(),
            locks: ShowtimeLocks::new(),
        }
    }

    pub async fn seat_map(&self, showtime_id: i64) -> AppResult<SeatMap> {
        let showtime = Showtime::find(showtime_id, &self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Showtime not found"))?;

        let reserved = ReservationIndex::load(&self.db.pool, showtime.id).await?;

        Ok(SeatMap {
            showtime,
            layout: self.layout.clone(),
            reserved_seats: reserved.to_sorted_vec(&self.layout),
        })
    }

    /// Validates the request and persists the booking.
    ///
    /// The reservation check and the insert run in one write transaction
    /// while holding the showtime's lock, so two requests for the same seat
    /// cannot both succeed.
    pub async fn create(&self, request: CreateBookingRequest) -> AppResult<Booking> {
        let order = request.into_order()?;

        let showtime = Showtime::find(order.showtime_id, &self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Showtime not found"))?;
        if showtime.movie_id != order.movie_id {
            return Err(AppError::validation(
                "Showtime does not belong to the selected movie",
            ));
        }

        let _guard = self.locks.lock(showtime.id).await;
        let mut tx = self.db.begin_write().await?;

        let reserved = ReservationIndex::load(&mut *tx, showtime.id).await?;
        debug!("showtime {} has {} reserved seats", showtime.id, reserved.len());
        if let Err(e) = validate_selection(&order.seats, &self.layout, &reserved) {
            if matches!(e, AppError::Conflict(_)) {
                warn!(
                    "seat conflict on showtime {} for seats {:?}",
                    showtime.id, order.seats
                );
            }
            return Err(e);
        }

        let booking = Booking::insert(
            &mut *tx,
            &NewBooking {
                movie_id: order.movie_id,
                showtime_id: showtime.id,
                customer_name: order.customer_name,
                customer_email: order.customer_email,
                seats: order.seats,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            "booking {} created for showtime {} ({} seats)",
            booking.id,
            booking.showtime_id,
            booking.seats.len()
        );
        Ok(booking)
    }

    /// Blank or missing email lists every booking.
    pub async fn list(&self, email: Option<&str>) -> AppResult<Vec<BookingDetails>> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        Ok(Booking::list(email, &self.db).await?)
    }

    pub async fn cancel(&self, booking_id: i64) -> AppResult<()> {
        if !Booking::delete(booking_id, &self.db).await? {
            return Err(AppError::not_found("Booking not found"));
        }
        info!("booking {} cancelled", booking_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_sample_data;

    async fn showtimes(db: &Database) -> Vec<Showtime> {
        sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, showtime_datetime FROM showtimes ORDER BY id",
        )
        .fetch_all(&db.pool)
        .await
        .unwrap()
    }

    async fn service() -> (BookingService, Showtime) {
        let db = Database::in_memory().await.unwrap();
        seed_sample_data(&db, &[]).await.unwrap();
        let showtime = showtimes(&db).await.remove(0);
        (BookingService::new(db), showtime)
    }

    // File-backed pool with several connections, so writers really overlap.
    async fn file_service(dir: &tempfile::TempDir) -> (BookingService, Vec<Showtime>) {
        let url = format!("sqlite://{}", dir.path().join("cinema.db").display());
        let db = Database::new(&url, 8).await.unwrap();
        db.run_migrations().await.unwrap();
        seed_sample_data(&db, &[]).await.unwrap();
        let showtimes = showtimes(&db).await;
        (BookingService::new(db), showtimes)
    }

    fn request(showtime: &Showtime, email: &str, seats: &[&str]) -> CreateBookingRequest {
        CreateBookingRequest {
            movie_id: Some(showtime.movie_id),
            showtime_id: Some(showtime.id),
            customer_name: Some("Ada".to_string()),
            customer_email: Some(email.to_string()),
            seats: Some(SeatSelection::List(
                seats.iter().map(|s| s.to_string()).collect(),
            )),
        }
    }

    async fn reserved(service: &BookingService, showtime: &Showtime) -> Vec<String> {
        service.seat_map(showtime.id).await.unwrap().reserved_seats
    }

    #[tokio::test]
    async fn conflicting_then_free_selection() {
        let (service, showtime) = service().await;
        service
            .create(request(&showtime, "a@b.com", &["A1", "A2"]))
            .await
            .unwrap();

        let err = service
            .create(request(&showtime, "c@d.com", &["A2", "A3"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let booking = service
            .create(request(&showtime, "c@d.com", &["A3", "A4"]))
            .await
            .unwrap();
        assert_eq!(booking.seats, vec!["A3", "A4"]);
        assert_eq!(reserved(&service, &showtime).await, vec!["A1", "A2", "A3", "A4"]);
    }

    #[tokio::test]
    async fn cancel_frees_seats() {
        let (service, showtime) = service().await;
        let booking = service
            .create(request(&showtime, "a@b.com", &["A1", "A2"]))
            .await
            .unwrap();

        service.cancel(booking.id).await.unwrap();
        assert!(reserved(&service, &showtime).await.is_empty());

        let err = service.cancel(booking.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let (service, showtime) = service().await;

        let mut no_name = request(&showtime, "a@b.com", &["A1"]);
        no_name.customer_name = Some(String::new());
        let mut no_seats = request(&showtime, "a@b.com", &[]);
        no_seats.seats = Some(SeatSelection::Joined(" , ".to_string()));
        let mut zero_movie = request(&showtime, "a@b.com", &["A1"]);
        zero_movie.movie_id = Some(0);

        for req in [no_name, no_seats, zero_movie] {
            let err = service.create(req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == MISSING_FIELDS_MESSAGE));
        }
    }

    #[tokio::test]
    async fn whitespace_only_contact_fields_are_rejected() {
        let (service, showtime) = service().await;

        let mut blank_name = request(&showtime, "a@b.com", &["A1"]);
        blank_name.customer_name = Some("   ".to_string());
        let blank_email = request(&showtime, " \t ", &["A1"]);

        for req in [blank_name, blank_email] {
            let err = service.create(req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == MISSING_FIELDS_MESSAGE));
        }
        assert!(reserved(&service, &showtime).await.is_empty());
    }

    #[tokio::test]
    async fn contact_fields_are_stored_trimmed() {
        let (service, showtime) = service().await;
        let mut req = request(&showtime, "  x@y.com ", &["A1"]);
        req.customer_name = Some(" Ada Lovelace  ".to_string());

        let booking = service.create(req).await.unwrap();
        assert_eq!(booking.customer_name, "Ada Lovelace");
        assert_eq!(booking.customer_email, "x@y.com");

        let listed = service.list(Some("x@y.com")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].booking.customer_email, "x@y.com");
    }

    #[tokio::test]
    async fn showtime_must_match_movie() {
        let (service, showtime) = service().await;
        let mut req = request(&showtime, "a@b.com", &["A1"]);
        req.movie_id = Some(showtime.movie_id + 1);

        let err = service.create(req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut req = request(&showtime, "a@b.com", &["A1"]);
        req.showtime_id = Some(9_999);
        let err = service.create(req).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn joined_seat_string_is_accepted() {
        let (service, showtime) = service().await;
        let mut req = request(&showtime, "a@b.com", &[]);
        req.seats = Some(SeatSelection::Joined("C7, C8".to_string()));

        let booking = service.create(req).await.unwrap();
        assert_eq!(booking.seats, vec!["C7", "C8"]);
    }

    #[tokio::test]
    async fn blank_email_lists_everything() {
        let (service, showtime) = service().await;
        service
            .create(request(&showtime, "a@b.com", &["A1"]))
            .await
            .unwrap();
        service
            .create(request(&showtime, "x@y.com", &["A2"]))
            .await
            .unwrap();

        assert_eq!(service.list(Some("  ")).await.unwrap().len(), 2);
        assert_eq!(service.list(Some("x@y.com")).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_writers_on_different_showtimes_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let (service, showtimes) = file_service(&dir).await;
        let showtimes: Vec<Showtime> = showtimes.into_iter().take(8).collect();

        for round in 1..=10 {
            let mut handles = Vec::new();
            for showtime in &showtimes {
                let service = service.clone();
                let seat = format!("A{round}");
                let req = request(showtime, "a@b.com", &[seat.as_str()]);
                handles.push(tokio::spawn(async move { service.create(req).await }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }
        }

        for showtime in &showtimes {
            assert_eq!(reserved(&service, showtime).await.len(), 10);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_writers_on_one_seat_book_it_once() {
        let dir = tempfile::tempdir().unwrap();
        let (service, showtimes) = file_service(&dir).await;
        let showtime = showtimes[0].clone();

        let mut handles = Vec::new();
        for i in 1..=8 {
            let service = service.clone();
            let other = format!("G{i}");
            let req = request(&showtime, "a@b.com", &["F5", other.as_str()]);
            handles.push(tokio::spawn(async move { service.create(req).await }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(matches!(e, AppError::Conflict(_)), "{e:?}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(reserved(&service, &showtime).await.len(), 2);
    }
}
