//! Booking endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::AppState;
use crate::error::Error;
use crate::models::BookingInput;

/// `POST /api/bookings` with `{ eventId, email }`
///
/// 200 `{ success: true }` on success; otherwise `{ success: false, error }`
/// with 400 (invalid input), 404 (unknown event), 409 (already booked) or 500.
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            return state.failure(&Error::invalid_input(rejection.body_text()), "");
        },
    };

    match state.service.create_booking(&input.event_id, &input.email).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => state.failure(&e, "Failed to create booking"),
    }
}
