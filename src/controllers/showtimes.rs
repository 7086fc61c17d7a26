use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/showtimes/{id}/seats", get(showtime_seats))
}

// GET /api/showtimes/{id}/seats
async fn showtime_seats(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(showtime_id) = path?;
    let seat_map = state.bookings.seat_map(showtime_id).await?;
    Ok(Json(seat_map))
}
