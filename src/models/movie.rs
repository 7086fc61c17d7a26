use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
}

impl Movie {
    pub async fn all(db: &Database) -> Result<Vec<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration_minutes, genre, poster_url
             FROM movies
             ORDER BY id",
        )
        .fetch_all(&db.pool)
        .await
    }

    pub async fn find(id: i64, db: &Database) -> Result<Option<Movie>, sqlx::Error> {
        sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration_minutes, genre, poster_url
             FROM movies
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&db.pool)
        .await
    }
}
