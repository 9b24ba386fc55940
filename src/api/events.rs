//! Event endpoints
//!
//! `POST /api/events` accepts either a JSON body carrying an image URL or a
//! `multipart/form-data` body carrying an image file (or an `image` URL
//! field). Uploaded files go through the [`ImageStore`](crate::upload::ImageStore).

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;

use crate::api::{success, AppState};
use crate::error::{Error, Result};
use crate::models::EventInput;
use crate::upload::ImageUpload;

const CREATE_FAILED: &str = "Event Creation Failed";
const IMAGE_REQUIRED: &str = "Image file is required";

/// `GET /api/events`
pub async fn list_events(State(state): State<AppState>) -> Response {
    match state.service.list_events().await {
        Ok(events) => success(events),
        Err(e) => {
            crate::log_error!(e, "Error fetching events");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to fetch events" })),
            )
                .into_response()
        },
    }
}

/// `GET /api/events/{slug}`
pub async fn get_event(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match state.service.find_event_by_slug(&slug).await {
        Ok(event) => success(event),
        Err(e) if e.is_internal() => {
            crate::log_error!(e, "Error fetching event by slug", slug = slug);
            let mut body = json!({
                "error": "An unexpected error occurred while fetching the event.",
            });
            if state.expose_error_details {
                body["details"] = json!(e.to_string());
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        },
        Err(e) => (e.status_code(), Json(json!({ "error": e.to_string() }))).into_response(),
    }
}

/// `GET /api/events/{slug}/similar`
pub async fn similar_events(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    success(state.service.find_similar_events(&slug).await)
}

/// `POST /api/events`
pub async fn create_event(State(state): State<AppState>, request: Request) -> Response {
    let submission = match read_event_input(&state, request).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": IMAGE_REQUIRED })))
                .into_response();
        },
        Err(e) => return creation_failure(&state, &e),
    };

    match state.service.create_event(submission.input).await {
        Ok(event) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Event created successfully", "event": event })),
        )
            .into_response(),
        Err(e) => {
            if let Some(url) = submission.stored_image {
                discard_image(&state, &url).await;
            }
            creation_failure(&state, &e)
        },
    }
}

/// `PUT /api/events/{slug}` with a complete JSON event
pub async fn update_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    request: Request,
) -> Response {
    let input = match Json::<EventInput>::from_request(request, &state).await {
        Ok(Json(input)) => input,
        Err(rejection) => {
            return state.failure(&Error::invalid_input(rejection.body_text()), "");
        },
    };

    match state.service.update_event(&slug, input).await {
        Ok(event) => success(event),
        Err(e) => state.failure(&e, "Failed to update event"),
    }
}

fn creation_failure(state: &AppState, err: &Error) -> Response {
    err.log();
    let body = json!({
        "message": CREATE_FAILED,
        "error": err.public_message("An unexpected error occurred.", state.expose_error_details),
    });
    (err.status_code(), Json(body)).into_response()
}

/// Remove an uploaded image whose event was never created
async fn discard_image(state: &AppState, url: &str) {
    if let Err(e) = state.images.remove(url).await {
        tracing::warn!(error = %e, image = %url, "Failed to remove orphaned image");
    }
}

/// A decoded creation request
struct Submission {
    input: EventInput,
    /// URL of an image this request uploaded, removed again if creation fails
    stored_image: Option<String>,
}

/// Decode the request body into an event input with a resolved image URL.
///
/// `Ok(None)` means the request carried no image at all.
async fn read_event_input(state: &AppState, request: Request) -> Result<Option<Submission>> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let Json(input) = Json::<EventInput>::from_request(request, state)
            .await
            .map_err(|rejection| Error::invalid_input(rejection.body_text()))?;
        if input.image.trim().is_empty() {
            return Ok(None);
        }
        return Ok(Some(Submission {
            input,
            stored_image: None,
        }));
    }

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|rejection| Error::invalid_input(rejection.body_text()))?;
        return read_multipart(state, multipart).await;
    }

    Err(Error::invalid_input(
        "Expected an application/json or multipart/form-data body",
    ))
}

async fn read_multipart(state: &AppState, mut multipart: Multipart) -> Result<Option<Submission>> {
    let mut fields = HashMap::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_input(format!("multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().trim().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::invalid_input(format!("failed to read field {}: {}", name, e)))?;

        // A part with a file name is a file upload, everything else is text
        if name == "image" && file_name.is_some() {
            upload = Some(ImageUpload {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = String::from_utf8(data.to_vec())
                .map_err(|_| Error::invalid_input(format!("field {} is not valid UTF-8", name)))?;
            fields.insert(name, value);
        }
    }

    let (image, stored_image) = match upload {
        Some(upload) if !upload.data.is_empty() => {
            upload.check()?;
            let url = state.images.store(upload).await?;
            (url.clone(), Some(url))
        },
        _ => match fields.remove("image") {
            Some(url) if !url.trim().is_empty() => (url, None),
            _ => return Ok(None),
        },
    };

    match EventInput::from_form_fields(fields, image) {
        Ok(input) => Ok(Some(Submission {
            input,
            stored_image,
        })),
        Err(e) => {
            if let Some(url) = stored_image {
                discard_image(state, &url).await;
            }
            Err(e.into())
        },
    }
}
