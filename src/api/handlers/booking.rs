//! Booking CRUD handlers: list, create, get, update, delete.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extract::{JsonBody, RecordId};
use crate::app_state::AppState;
use crate::domain::BookingId;
use crate::error::{AppError, ErrorResponse};
use crate::serializer::BookingData;

/// `GET /bookings`: List all bookings.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "List bookings",
    responses(
        (status = 200, description = "All bookings in id order", body = Vec<BookingData>),
    )
)]
pub async fn list_bookings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_service.list().await?;
    Ok(Json(bookings))
}

/// `POST /bookings`: Create a booking.
///
/// # Errors
///
/// Returns [`AppError::Validation`] or [`AppError::InvalidReference`].
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "Create a booking",
    description = "Creates a booking against an existing listing. `status` defaults to `pending`. Dates and total price are stored as given.",
    request_body = BookingData,
    responses(
        (status = 201, description = "Booking created", body = BookingData),
        (status = 400, description = "Validation failed or unknown listing", body = ErrorResponse),
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// `GET /bookings/:id`: Get one booking.
///
/// # Errors
///
/// Returns [`AppError::BookingNotFound`] if the booking does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Get a booking",
    params(
        ("id" = i64, Path, description = "Booking id"),
    ),
    responses(
        (status = 200, description = "Booking", body = BookingData),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    RecordId(id): RecordId<BookingId>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.retrieve(id).await?;
    Ok(Json(booking))
}

/// `PUT /bookings/:id`: Replace every writable field of a booking.
///
/// # Errors
///
/// Returns [`AppError::BookingNotFound`], [`AppError::Validation`] or
/// [`AppError::InvalidReference`].
#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Replace a booking",
    params(
        ("id" = i64, Path, description = "Booking id"),
    ),
    request_body = BookingData,
    responses(
        (status = 200, description = "Booking updated", body = BookingData),
        (status = 400, description = "Validation failed or unknown listing", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn replace_booking(
    State(state): State<AppState>,
    RecordId(id): RecordId<BookingId>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_service
        .update(id, &body, false)
        .await?;
    Ok(Json(booking))
}

/// `PATCH /bookings/:id`: Update some fields of a booking.
///
/// # Errors
///
/// Returns [`AppError::BookingNotFound`], [`AppError::Validation`] or
/// [`AppError::InvalidReference`].
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Partially update a booking",
    description = "Absent fields keep their current values. Any status may be set from any other.",
    params(
        ("id" = i64, Path, description = "Booking id"),
    ),
    request_body = BookingData,
    responses(
        (status = 200, description = "Booking updated", body = BookingData),
        (status = 400, description = "Validation failed or unknown listing", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn patch_booking(
    State(state): State<AppState>,
    RecordId(id): RecordId<BookingId>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_service
        .update(id, &body, true)
        .await?;
    Ok(Json(booking))
}

/// `DELETE /bookings/:id`: Delete a booking.
///
/// # Errors
///
/// Returns [`AppError::BookingNotFound`] if the booking does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Delete a booking",
    params(
        ("id" = i64, Path, description = "Booking id"),
    ),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    RecordId(id): RecordId<BookingId>,
) -> Result<impl IntoResponse, AppError> {
    state.booking_service.destroy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route(
            "/bookings/{id}",
            get(get_booking)
                .put(replace_booking)
                .patch(patch_booking)
                .delete(delete_booking),
        )
}
