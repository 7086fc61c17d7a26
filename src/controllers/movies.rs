use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, Showtime};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}/showtimes", get(movie_showtimes))
}

// GET /api/movies
async fn list_movies(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    let movies = Movie::all(&state.db).await?;
    Ok(Json(movies))
}

// GET /api/movies/{id}/showtimes
async fn movie_showtimes(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(movie_id) = path?;

    let movie = Movie::find(movie_id, &state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Movie not found"))?;
    let showtimes = Showtime::for_movie(movie.id, &state.db).await?;

    Ok(Json(json!({ "movie": movie, "showtimes": showtimes })))
}
