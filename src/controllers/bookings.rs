use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppResult;
use crate::services::booking::CreateBookingRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", delete(cancel_booking))
}

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = body?;
    let booking = state.bookings.create(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking confirmed",
            "booking_id": booking.id,
            "booking": booking,
        })),
    ))
}

// GET /api/bookings?email=
#[derive(Debug, Deserialize)]
struct BookingsQuery {
    email: Option<String>,
}

async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingsQuery>,
) -> AppResult<impl IntoResponse> {
    let bookings = state.bookings.list(params.email.as_deref()).await?;
    Ok(Json(bookings))
}

// DELETE /api/bookings/{id}
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(booking_id) = path?;
    state.bookings.cancel(booking_id).await?;
    Ok(Json(json!({ "message": "Booking cancelled successfully" })))
}
