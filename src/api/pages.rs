//! Server-rendered pages

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::api::AppState;
use crate::error::Error;
use crate::models::Event;
use crate::views::{self, EventPage, Notice};

/// Booking form submitted from the details page
#[derive(Debug, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub email: String,
}

/// `GET /`
pub async fn home(State(state): State<AppState>) -> Response {
    let events = match state.service.list_events().await {
        Ok(events) => events,
        Err(e) => {
            crate::log_error!(e, "Error fetching events for home page");
            Vec::new()
        },
    };

    Html(views::render_home(&events)).into_response()
}

/// `GET /events/{slug}`
pub async fn event_details(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.service.find_event_by_slug(&slug).await {
        Ok(event) => render_details(&state, &event, None, StatusCode::OK).await,
        Err(e) => lookup_failure(&state, &slug, &e),
    }
}

/// `POST /events/{slug}/book`
pub async fn book_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<BookingForm>,
) -> Response {
    let event = match state.service.find_event_by_slug(&slug).await {
        Ok(event) => event,
        Err(e) => return lookup_failure(&state, &slug, &e),
    };

    let (notice, status) = match state
        .service
        .create_booking(&event.id.to_string(), &form.email)
        .await
    {
        Ok(_) => (Notice::Booked, StatusCode::OK),
        Err(e) => {
            e.log();
            let message = e.public_message(
                "Booking failed. Please try again.",
                state.expose_error_details,
            );
            (Notice::Failed(message), e.status_code())
        },
    };

    render_details(&state, &event, Some(notice), status).await
}

async fn render_details(
    state: &AppState,
    event: &Event,
    notice: Option<Notice>,
    status: StatusCode,
) -> Response {
    let bookings = match state.service.count_bookings(event.id).await {
        Ok(count) => count,
        Err(e) => {
            crate::log_error!(e, "Error counting bookings", slug = event.slug);
            0
        },
    };
    let similar = state.service.find_similar_events(&event.slug).await;

    let page = EventPage {
        event,
        bookings,
        similar: &similar,
        notice,
    };

    (status, Html(views::render_event(&page))).into_response()
}

fn lookup_failure(state: &AppState, slug: &str, err: &Error) -> Response {
    match err {
        Error::NotFound(_) | Error::InvalidInput(_) => {
            (StatusCode::NOT_FOUND, Html(views::render_not_found(slug))).into_response()
        },
        _ => {
            err.log();
            let message = err.public_message(
                "We could not load this event. Please try again later.",
                state.expose_error_details,
            );
            (err.status_code(), Html(views::render_error(&message))).into_response()
        },
    }
}
