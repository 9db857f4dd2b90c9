//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::Store;
use crate::service::{BookingService, ListingService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Listing CRUD.
    pub listing_service: Arc<ListingService>,
    /// Booking CRUD.
    pub booking_service: Arc<BookingService>,
}

impl AppState {
    /// Builds both services over one shared store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            listing_service: Arc::new(ListingService::new(Arc::clone(&store))),
            booking_service: Arc::new(BookingService::new(store)),
        }
    }
}
