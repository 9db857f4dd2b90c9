//! Service layer: CRUD orchestration.
//!
//! [`ListingService`] and [`BookingService`] run input through the
//! serializers, make one store call per operation, and log every mutation.

pub mod booking_service;
pub mod listing_service;

pub use booking_service::BookingService;
pub use listing_service::ListingService;
