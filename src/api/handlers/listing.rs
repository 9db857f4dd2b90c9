//! Listing CRUD handlers: list, create, get, update, delete, and the
//! bookings of one listing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extract::{JsonBody, RecordId};
use crate::app_state::AppState;
use crate::domain::ListingId;
use crate::error::{AppError, ErrorResponse};
use crate::serializer::{BookingData, ListingData};

/// `GET /listings`: List all listings, newest first.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "Listings",
    summary = "List listings",
    description = "Returns every listing ordered by creation time, newest first.",
    responses(
        (status = 200, description = "All listings", body = Vec<ListingData>),
    )
)]
pub async fn list_listings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let listings = state.listing_service.list().await?;
    Ok(Json(listings))
}

/// `POST /listings`: Create a listing.
///
/// # Errors
///
/// Returns [`AppError::Validation`] on invalid input.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    tag = "Listings",
    summary = "Create a listing",
    description = "Creates a listing from `title`, `description`, `location` and `price_per_night`. Id and timestamps are assigned by the server.",
    request_body = ListingData,
    responses(
        (status = 201, description = "Listing created", body = ListingData),
        (status = 400, description = "Validation failed", body = ErrorResponse),
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let listing = state.listing_service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// `GET /listings/:id`: Get one listing.
///
/// # Errors
///
/// Returns [`AppError::ListingNotFound`] if the listing does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    summary = "Get a listing",
    params(
        ("id" = i64, Path, description = "Listing id"),
    ),
    responses(
        (status = 200, description = "Listing", body = ListingData),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    RecordId(id): RecordId<ListingId>,
) -> Result<impl IntoResponse, AppError> {
    let listing = state.listing_service.retrieve(id).await?;
    Ok(Json(listing))
}

/// `PUT /listings/:id`: Replace every writable field of a listing.
///
/// # Errors
///
/// Returns [`AppError::ListingNotFound`] or [`AppError::Validation`].
#[utoipa::path(
    put,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    summary = "Replace a listing",
    description = "All writable fields are required.",
    params(
        ("id" = i64, Path, description = "Listing id"),
    ),
    request_body = ListingData,
    responses(
        (status = 200, description = "Listing updated", body = ListingData),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn replace_listing(
    State(state): State<AppState>,
    RecordId(id): RecordId<ListingId>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let listing = state
        .listing_service
        .update(id, &body, false)
        .await?;
    Ok(Json(listing))
}

/// `PATCH /listings/:id`: Update some fields of a listing.
///
/// # Errors
///
/// Returns [`AppError::ListingNotFound`] or [`AppError::Validation`].
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    summary = "Partially update a listing",
    description = "Absent fields keep their current values.",
    params(
        ("id" = i64, Path, description = "Listing id"),
    ),
    request_body = ListingData,
    responses(
        (status = 200, description = "Listing updated", body = ListingData),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn patch_listing(
    State(state): State<AppState>,
    RecordId(id): RecordId<ListingId>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let listing = state
        .listing_service
        .update(id, &body, true)
        .await?;
    Ok(Json(listing))
}

/// `DELETE /listings/:id`: Delete a listing and its bookings.
///
/// # Errors
///
/// Returns [`AppError::ListingNotFound`] if the listing does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    summary = "Delete a listing",
    description = "Removes the listing and, in the same transaction, every booking that references it.",
    params(
        ("id" = i64, Path, description = "Listing id"),
    ),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    RecordId(id): RecordId<ListingId>,
) -> Result<impl IntoResponse, AppError> {
    state.listing_service.destroy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /listings/:id/bookings`: Bookings owned by one listing.
///
/// # Errors
///
/// Returns [`AppError::ListingNotFound`] if the listing does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}/bookings",
    tag = "Listings",
    summary = "List a listing's bookings",
    params(
        ("id" = i64, Path, description = "Listing id"),
    ),
    responses(
        (status = 200, description = "Bookings of the listing", body = Vec<BookingData>),
        (status = 404, description = "Listing not found", body = ErrorResponse),
    )
)]
pub async fn listing_bookings(
    State(state): State<AppState>,
    RecordId(id): RecordId<ListingId>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.listing_service.bookings(id).await?;
    Ok(Json(bookings))
}

/// Listing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(list_listings).post(create_listing))
        .route(
            "/listings/{id}",
            get(get_listing)
                .put(replace_listing)
                .patch(patch_listing)
                .delete(delete_listing),
        )
        .route("/listings/{id}/bookings", get(listing_bookings))
}
