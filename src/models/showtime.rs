use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Showtime {
    pub id: i64,
    pub movie_id: i64,
    pub showtime_datetime: String,
}

impl Showtime {
    pub async fn find(id: i64, db: &Database) -> Result<Option<Showtime>, sqlx::Error> {
        sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, showtime_datetime FROM showtimes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&db.pool)
        .await
    }

    pub async fn for_movie(movie_id: i64, db: &Database) -> Result<Vec<Showtime>, sqlx::Error> {
        sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, showtime_datetime
             FROM showtimes
             WHERE movie_id = $1
             ORDER BY showtime_datetime, id",
        )
        .bind(movie_id)
        .fetch_all(&db.pool)
        .await
    }
}
