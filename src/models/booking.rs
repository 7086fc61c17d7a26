use serde::Serialize;
use sqlx::{FromRow, Sqlite};

use crate::database::Database;
use crate::models::seat::{join_seats, split_seats};

/// A booking about to be written. `seats` keeps the order the customer chose.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub movie_id: i64,
    pub showtime_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub seats: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: i64,
    pub movie_id: i64,
    pub showtime_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub seats: Vec<String>,
    pub created_at: String,
}

/// Booking joined with the movie title and the screening time, as listed
/// to customers.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub movie_title: String,
    pub showtime_datetime: String,
}

#[derive(FromRow)]
struct BookingRow {
    id: i64,
    movie_id: i64,
    showtime_id: i64,
    customer_name: String,
    customer_email: String,
    seats: String,
    created_at: String,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            movie_id: row.movie_id,
            showtime_id: row.showtime_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            seats: split_seats(&row.seats).map(str::to_string).collect(),
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct BookingDetailsRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    movie_title: String,
    showtime_datetime: String,
}

impl Booking {
    /// Inserts the booking and returns it with the assigned id.
    pub async fn insert<'e, E>(executor: E, new: &NewBooking) -> Result<Booking, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO bookings
                (movie_id, showtime_id, customer_name, customer_email, seats, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(new.movie_id)
        .bind(new.showtime_id)
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(join_seats(&new.seats))
        .bind(&new.created_at)
        .execute(executor)
        .await?;

        Ok(Booking {
            id: result.last_insert_rowid(),
            movie_id: new.movie_id,
            showtime_id: new.showtime_id,
            customer_name: new.customer_name.clone(),
            customer_email: new.customer_email.clone(),
            seats: new.seats.clone(),
            created_at: new.created_at.clone(),
        })
    }

    /// Raw `seats` column of every booking for the showtime.
    pub async fn seat_lists_for_showtime<'e, E>(
        executor: E,
        showtime_id: i64,
    ) -> Result<Vec<String>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, String>("SELECT seats FROM bookings WHERE showtime_id = $1")
            .bind(showtime_id)
            .fetch_all(executor)
            .await
    }

    /// Bookings newest first, optionally restricted to one customer email.
    pub async fn list(
        email: Option<&str>,
        db: &Database,
    ) -> Result<Vec<BookingDetails>, sqlx::Error> {
        let mut q = String::from(
            r#"
            SELECT b.id, b.movie_id, b.showtime_id, b.customer_name, b.customer_email,
                   b.seats, b.created_at,
                   m.title AS movie_title, s.showtime_datetime
            FROM bookings b
            JOIN movies m ON b.movie_id = m.id
            JOIN showtimes s ON b.showtime_id = s.id
            "#,
        );
        if email.is_some() {
            q.push_str(" WHERE b.customer_email = $1");
        }
        q.push_str(" ORDER BY b.id DESC");

        let mut dbq = sqlx::query_as::<_, BookingDetailsRow>(&q);
        if let Some(email) = email {
            dbq = dbq.bind(email);
        }

        let rows = dbq.fetch_all(&db.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| BookingDetails {
                booking: row.booking.into(),
                movie_title: row.movie_title,
                showtime_datetime: row.showtime_datetime,
            })
            .collect())
    }

    /// Returns `false` when no booking had this id.
    pub async fn delete(id: i64, db: &Database) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&db.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
