//! Booking service: validates input, calls the store, renders output.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Booking, BookingId};
use crate::error::AppError;
use crate::persistence::{BookingEdit, Store};
use crate::serializer::{BookingData, booking_serializer};

/// CRUD operations on bookings.
///
/// The referenced listing's existence is checked by the store inside the
/// same transaction as the write.
#[derive(Debug, Clone)]
pub struct BookingService {
    store: Arc<dyn Store>,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Returns every booking in id order.
    ///
    /// # Errors
    ///
    /// Returns a [`AppError::Persistence`] on store failure.
    pub async fn list(&self) -> Result<Vec<BookingData>, AppError> {
        let bookings = self.store.list_bookings(None).await?;
        Ok(bookings
            .iter()
            .map(booking_serializer::to_representation)
            .collect())
    }

    /// Returns one booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`] if the id is unknown.
    pub async fn retrieve(&self, id: BookingId) -> Result<BookingData, AppError> {
        let booking = self.store.get_booking(id).await?;
        Ok(booking_serializer::to_representation(&booking))
    }

    /// Validates `data` and inserts a new booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for invalid input, or
    /// [`AppError::InvalidReference`] if the listing does not exist.
    pub async fn create(&self, data: &Value) -> Result<BookingData, AppError> {
        let fields = booking_serializer::validate(data, None, false)?;
        let booking = self.store.insert_booking(fields).await?;
        tracing::info!(
            booking_id = %booking.id,
            listing_id = %booking.listing,
            status = %booking.status,
            "booking created"
        );
        Ok(booking_serializer::to_representation(&booking))
    }

    /// Validates `data` against the current booking and stores the result,
    /// as one unit of work in the store. With `partial`, absent fields keep
    /// their current values.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`], [`AppError::Validation`] or
    /// [`AppError::InvalidReference`].
    pub async fn update(
        &self,
        id: BookingId,
        data: &Value,
        partial: bool,
    ) -> Result<BookingData, AppError> {
        let data = data.clone();
        let edit: BookingEdit = Box::new(move |current: &Booking| {
            booking_serializer::validate(&data, Some(current), partial).map_err(AppError::from)
        });
        let booking = self.store.update_booking(id, edit).await?;
        tracing::info!(booking_id = %id, status = %booking.status, partial, "booking updated");
        Ok(booking_serializer::to_representation(&booking))
    }

    /// Deletes one booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`] if the id is unknown.
    pub async fn destroy(&self, id: BookingId) -> Result<(), AppError> {
        self.store.delete_booking(id).await?;
        tracing::info!(booking_id = %id, "booking deleted");
        Ok(())
    }
}
