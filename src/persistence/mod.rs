//! Persistence layer: the [`Store`] trait and its two backends.
//!
//! Every mutating method is one atomic unit of work. [`MemoryStore`] holds a
//! single write lock for the whole operation; [`PostgresStore`] runs each
//! mutation inside one `sqlx` transaction. Deleting a listing removes its
//! bookings within that same unit of work.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{Booking, BookingFields, BookingId, Listing, ListingFields, ListingId};
use crate::error::AppError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Derives a listing's new writable fields from its current state.
///
/// Runs inside the update's unit of work, so it sees the latest committed
/// listing and nothing else can write it in between.
pub type ListingEdit = Box<dyn FnOnce(&Listing) -> Result<ListingFields, AppError> + Send>;

/// Derives a booking's new writable fields from its current state.
pub type BookingEdit = Box<dyn FnOnce(&Booking) -> Result<BookingFields, AppError> + Send>;

/// Backing store for listings and bookings.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Returns every listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn list_listings(&self) -> Result<Vec<Listing>, AppError>;

    /// Returns one listing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ListingNotFound`] if no listing has this id.
    async fn get_listing(&self, id: ListingId) -> Result<Listing, AppError>;

    /// Inserts a listing; `created_at` and `updated_at` are both set to now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn insert_listing(&self, fields: ListingFields) -> Result<Listing, AppError>;

    /// Replaces a listing's writable fields with what `edit` derives from the
    /// current listing, and refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ListingNotFound`] if no listing has this id, or
    /// whatever `edit` returns; nothing is written in either case.
    async fn update_listing(&self, id: ListingId, edit: ListingEdit)
    -> Result<Listing, AppError>;

    /// Deletes a listing and all of its bookings; returns how many bookings
    /// were removed with it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ListingNotFound`] if no listing has this id.
    async fn delete_listing(&self, id: ListingId) -> Result<u64, AppError>;

    /// Returns bookings in id order, optionally only those of one listing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn list_bookings(&self, listing: Option<ListingId>) -> Result<Vec<Booking>, AppError>;

    /// Returns one booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`] if no booking has this id.
    async fn get_booking(&self, id: BookingId) -> Result<Booking, AppError>;

    /// Inserts a booking; `created_at` is set to now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidReference`] if the listing does not exist.
    async fn insert_booking(&self, fields: BookingFields) -> Result<Booking, AppError>;

    /// Replaces a booking's writable fields with what `edit` derives from the
    /// current booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`] if no booking has this id,
    /// whatever `edit` returns, or [`AppError::InvalidReference`] if the new
    /// listing does not exist.
    async fn update_booking(&self, id: BookingId, edit: BookingEdit)
    -> Result<Booking, AppError>;

    /// Deletes one booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`] if no booking has this id.
    async fn delete_booking(&self, id: BookingId) -> Result<(), AppError>;
}
