//! Listing service: validates input, calls the store, renders output.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Listing, ListingId};
use crate::error::AppError;
use crate::persistence::{ListingEdit, Store};
use crate::serializer::{BookingData, ListingData, booking_serializer, listing_serializer};

/// CRUD operations on listings.
///
/// Stateless coordinator over a shared [`Store`]. Every mutation is a
/// single store call followed by a log line; updates validate inside it.
#[derive(Debug, Clone)]
pub struct ListingService {
    store: Arc<dyn Store>,
}

impl ListingService {
    /// Creates a new `ListingService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Returns every listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`AppError::Persistence`] on store failure.
    pub async fn list(&self) -> Result<Vec<ListingData>, AppError> {
        let listings = self.store.list_listings().await?;
        Ok(listings
            .iter()
            .map(listing_serializer::to_representation)
            .collect())
    }

    /// Returns one listing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ListingNotFound`] if the id is unknown.
    pub async fn retrieve(&self, id: ListingId) -> Result<ListingData, AppError> {
        let listing = self.store.get_listing(id).await?;
        Ok(listing_serializer::to_representation(&listing))
    }

    /// Validates `data` and inserts a new listing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] listing every offending field.
    pub async fn create(&self, data: &Value) -> Result<ListingData, AppError> {
        let fields = listing_serializer::validate(data, None, false)?;
        let listing = self.store.insert_listing(fields).await?;
        tracing::info!(listing_id = %listing.id, title = %listing, "listing created");
        Ok(listing_serializer::to_representation(&listing))
    }

    /// Validates `data` against the current listing and stores the result,
    /// as one unit of work in the store. With `partial`, absent fields keep
    /// their current values.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ListingNotFound`] if the id is unknown, or
    /// [`AppError::Validation`] if the input is invalid.
    pub async fn update(
        &self,
        id: ListingId,
        data: &Value,
        partial: bool,
    ) -> Result<ListingData, AppError> {
        let data = data.clone();
        let edit: ListingEdit = Box::new(move |current: &Listing| {
            listing_serializer::validate(&data, Some(current), partial).map_err(AppError::from)
        });
        let listing = self.store.update_listing(id, edit).await?;
        tracing::info!(listing_id = %id, partial, "listing updated");
        Ok(listing_serializer::to_representation(&listing))
    }

    /// Deletes a listing together with all of its bookings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ListingNotFound`] if the id is unknown.
    pub async fn destroy(&self, id: ListingId) -> Result<(), AppError> {
        let cascaded = self.store.delete_listing(id).await?;
        tracing::info!(listing_id = %id, bookings_removed = cascaded, "listing deleted");
        Ok(())
    }

    /// Returns the bookings owned by a listing, in id order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ListingNotFound`] if the id is unknown.
    pub async fn bookings(&self, id: ListingId) -> Result<Vec<BookingData>, AppError> {
        self.store.get_listing(id).await?;
        let bookings = self.store.list_bookings(Some(id)).await?;
        Ok(bookings
            .iter()
            .map(booking_serializer::to_representation)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use serde_json::json;

    fn make_service() -> ListingService {
        ListingService::new(Arc::new(MemoryStore::new()))
    }

    fn cabin() -> Value {
        json!({
            "title": "Cabin",
            "description": "Cozy",
            "location": "Aspen",
            "price_per_night": 120.00,
        })
    }

    #[tokio::test]
    async fn create_then_retrieve() {
        let service = make_service();
        let Ok(created) = service.create(&cabin()).await else {
            panic!("create failed");
        };
        assert_eq!(created.id, ListingId::new(1));
        assert_eq!(created.updated_at, created.created_at);

        let Ok(fetched) = service.retrieve(created.id).await else {
            panic!("retrieve failed");
        };
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Cabin");
    }

    #[tokio::test]
    async fn invalid_create_writes_nothing() {
        let service = make_service();
        let result = service.create(&json!({"title": "Cabin"})).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let Ok(all) = service.list().await else {
            panic!("list failed");
        };
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn patch_changes_only_given_fields() {
        let service = make_service();
        let Ok(created) = service.create(&cabin()).await else {
            panic!("create failed");
        };

        let Ok(updated) = service
            .update(created.id, &json!({"location": "Vail"}), true)
            .await
        else {
            panic!("update failed");
        };
        assert_eq!(updated.location, "Vail");
        assert_eq!(updated.title, "Cabin");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn overlapping_patches_keep_both_changes() {
        let service = make_service();
        let Ok(created) = service.create(&cabin()).await else {
            panic!("create failed");
        };
        let id = created.id;

        let mut tasks = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            let patch = if i % 2 == 0 {
                json!({"title": "Lodge"})
            } else {
                json!({"location": "Vail"})
            };
            tasks.push(tokio::spawn(async move {
                service.update(id, &patch, true).await
            }));
        }
        for task in tasks {
            assert!(matches!(task.await, Ok(Ok(_))));
        }

        let Ok(after) = service.retrieve(id).await else {
            panic!("retrieve failed");
        };
        assert_eq!(after.title, "Lodge");
        assert_eq!(after.location, "Vail");
    }

    #[tokio::test]
    async fn update_of_missing_listing_is_not_found() {
        let service = make_service();
        let result = service.update(ListingId::new(5), &cabin(), false).await;
        assert!(matches!(result, Err(AppError::ListingNotFound(_))));
    }

    #[tokio::test]
    async fn bookings_of_missing_listing_is_not_found() {
        let service = make_service();
        let result = service.bookings(ListingId::new(5)).await;
        assert!(matches!(result, Err(AppError::ListingNotFound(_))));
    }
}
