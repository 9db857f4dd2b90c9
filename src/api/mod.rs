//! REST API layer: route handlers, router composition, OpenAPI document.
//!
//! Resource endpoints are mounted under `/api/v1`.

pub mod extract;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::domain::BookingStatus;
use crate::error::{ErrorBody, ErrorResponse};
use crate::serializer::{BookingData, ListingData};

/// OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "travel-listings", description = "Listings and bookings CRUD API"),
    paths(
        handlers::listing::list_listings,
        handlers::listing::create_listing,
        handlers::listing::get_listing,
        handlers::listing::replace_listing,
        handlers::listing::patch_listing,
        handlers::listing::delete_listing,
        handlers::listing::listing_bookings,
        handlers::booking::list_bookings,
        handlers::booking::create_booking,
        handlers::booking::get_booking,
        handlers::booking::replace_booking,
        handlers::booking::patch_booking,
        handlers::booking::delete_booking,
        handlers::system::health_handler,
    ),
    components(schemas(
        ListingData,
        BookingData,
        BookingStatus,
        ErrorResponse,
        ErrorBody,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Listings", description = "Bookable travel properties"),
        (name = "Bookings", description = "Reservations against a listing"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_crud_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/listings",
            "/api/v1/listings/{id}",
            "/api/v1/listings/{id}/bookings",
            "/api/v1/bookings",
            "/api/v1/bookings/{id}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
