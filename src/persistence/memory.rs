//! In-process store used when `PERSISTENCE_ENABLED` is off, and by tests.
//!
//! Both tables live behind one [`tokio::sync::RwLock`]. Reads share the
//! lock; every mutation takes the write lock for its whole duration, which
//! makes each one a serializable transaction. Each listing row keeps the ids
//! of the bookings it owns so deletion can cascade without a table scan.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{BookingEdit, ListingEdit, Store};
use crate::domain::{Booking, BookingFields, BookingId, Listing, ListingFields, ListingId};
use crate::error::AppError;

#[derive(Debug)]
struct ListingRow {
    listing: Listing,
    bookings: BTreeSet<BookingId>,
}

#[derive(Debug, Default)]
struct Tables {
    listings: BTreeMap<ListingId, ListingRow>,
    bookings: BTreeMap<BookingId, Booking>,
    last_listing_id: i64,
    last_booking_id: i64,
}

impl Tables {
    fn next_listing_id(&mut self) -> ListingId {
        self.last_listing_id += 1;
        ListingId::new(self.last_listing_id)
    }

    fn next_booking_id(&mut self) -> BookingId {
        self.last_booking_id += 1;
        BookingId::new(self.last_booking_id)
    }
}

/// Listings and bookings held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_listings(&self) -> Result<Vec<Listing>, AppError> {
        let tables = self.tables.read().await;
        let mut listings: Vec<Listing> = tables
            .listings
            .values()
            .map(|row| row.listing.clone())
            .collect();
        listings.sort_by(Listing::default_order);
        Ok(listings)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Listing, AppError> {
        let tables = self.tables.read().await;
        tables
            .listings
            .get(&id)
            .map(|row| row.listing.clone())
            .ok_or(AppError::ListingNotFound(id))
    }

    async fn insert_listing(&self, fields: ListingFields) -> Result<Listing, AppError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_listing_id();
        let listing = Listing::create(id, fields, Utc::now());
        tables.listings.insert(
            id,
            ListingRow {
                listing: listing.clone(),
                bookings: BTreeSet::new(),
            },
        );
        Ok(listing)
    }

    async fn update_listing(
        &self,
        id: ListingId,
        edit: ListingEdit,
    ) -> Result<Listing, AppError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .listings
            .get_mut(&id)
            .ok_or(AppError::ListingNotFound(id))?;
        let fields = edit(&row.listing)?;
        row.listing.apply(fields, Utc::now());
        Ok(row.listing.clone())
    }

    async fn delete_listing(&self, id: ListingId) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .listings
            .remove(&id)
            .ok_or(AppError::ListingNotFound(id))?;
        let mut removed = 0;
        for booking_id in &row.bookings {
            if tables.bookings.remove(booking_id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn list_bookings(&self, listing: Option<ListingId>) -> Result<Vec<Booking>, AppError> {
        let tables = self.tables.read().await;
        let bookings = match listing {
            Some(listing) => tables
                .listings
                .get(&listing)
                .map(|row| {
                    row.bookings
                        .iter()
                        .filter_map(|id| tables.bookings.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default(),
            None => tables.bookings.values().cloned().collect(),
        };
        Ok(bookings)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking, AppError> {
        let tables = self.tables.read().await;
        tables
            .bookings
            .get(&id)
            .cloned()
            .ok_or(AppError::BookingNotFound(id))
    }

    async fn insert_booking(&self, fields: BookingFields) -> Result<Booking, AppError> {
        let mut tables = self.tables.write().await;
        let listing = fields.listing;
        if !tables.listings.contains_key(&listing) {
            return Err(AppError::InvalidReference(listing));
        }
        let id = tables.next_booking_id();
        let booking = Booking::create(id, fields, Utc::now());
        tables.bookings.insert(id, booking.clone());
        if let Some(row) = tables.listings.get_mut(&listing) {
            row.bookings.insert(id);
        }
        Ok(booking)
    }

    async fn update_booking(
        &self,
        id: BookingId,
        edit: BookingEdit,
    ) -> Result<Booking, AppError> {
        let mut tables = self.tables.write().await;
        let current = tables
            .bookings
            .get(&id)
            .ok_or(AppError::BookingNotFound(id))?;
        let old_listing = current.listing;
        let fields = edit(current)?;
        let new_listing = fields.listing;
        if !tables.listings.contains_key(&new_listing) {
            return Err(AppError::InvalidReference(new_listing));
        }

        let Some(booking) = tables.bookings.get_mut(&id) else {
            return Err(AppError::BookingNotFound(id));
        };
        booking.apply(fields);
        let updated = booking.clone();

        if old_listing != new_listing {
            if let Some(row) = tables.listings.get_mut(&old_listing) {
                row.bookings.remove(&id);
            }
            if let Some(row) = tables.listings.get_mut(&new_listing) {
                row.bookings.insert(id);
            }
        }
        Ok(updated)
    }

    async fn delete_booking(&self, id: BookingId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let booking = tables
            .bookings
            .remove(&id)
            .ok_or(AppError::BookingNotFound(id))?;
        if let Some(row) = tables.listings.get_mut(&booking.listing) {
            row.bookings.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::BookingStatus;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn listing_fields(title: &str) -> ListingFields {
        ListingFields {
            title: title.to_string(),
            description: "Cozy".to_string(),
            location: "Aspen".to_string(),
            price_per_night: Decimal::new(12_000, 2),
        }
    }

    fn booking_fields(listing: ListingId) -> BookingFields {
        BookingFields {
            listing,
            user_name: "Jo".to_string(),
            user_email: "jo@x.com".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap_or_default(),
            total_price: Decimal::new(48_000, 2),
            status: BookingStatus::Pending,
        }
    }

    fn replace_listing(fields: ListingFields) -> ListingEdit {
        Box::new(move |_: &Listing| Ok::<_, AppError>(fields))
    }

    fn replace_booking(fields: BookingFields) -> BookingEdit {
        Box::new(move |_: &Booking| Ok::<_, AppError>(fields))
    }

    async fn insert_listing(store: &MemoryStore, title: &str) -> Listing {
        let Ok(listing) = store.insert_listing(listing_fields(title)).await else {
            panic!("listing insert failed");
        };
        listing
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_equal_timestamps() {
        let store = MemoryStore::new();
        let first = insert_listing(&store, "Cabin").await;
        let second = insert_listing(&store, "Loft").await;

        assert_eq!(first.id, ListingId::new(1));
        assert_eq!(second.id, ListingId::new(2));
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn list_listings_is_newest_first() {
        let store = MemoryStore::new();
        for title in ["a", "b", "c"] {
            insert_listing(&store, title).await;
        }
        let Ok(listings) = store.list_listings().await else {
            panic!("list failed");
        };
        let ids: Vec<i64> = listings.iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(
            listings
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.created_at >= b.created_at))
        );
    }

    #[tokio::test]
    async fn update_listing_refreshes_updated_at() {
        let store = MemoryStore::new();
        let listing = insert_listing(&store, "Cabin").await;

        let Ok(updated) = store
            .update_listing(listing.id, replace_listing(listing_fields("Lodge")))
            .await
        else {
            panic!("update failed");
        };
        assert_eq!(updated.title, "Lodge");
        assert_eq!(updated.created_at, listing.created_at);
        assert!(updated.updated_at >= listing.updated_at);
    }

    #[tokio::test]
    async fn concurrent_edits_each_see_the_previous_write() {
        let store = Arc::new(MemoryStore::new());
        let id = insert_listing(&store, "x").await.id;

        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let edit: ListingEdit = Box::new(|current: &Listing| {
                    let mut fields = current.fields();
                    fields.title.push('x');
                    Ok::<_, AppError>(fields)
                });
                store.update_listing(id, edit).await
            }));
        }
        for task in tasks {
            assert!(matches!(task.await, Ok(Ok(_))));
        }

        let Ok(after) = store.get_listing(id).await else {
            panic!("listing vanished");
        };
        assert_eq!(after.title.len(), 51);
    }

    #[tokio::test]
    async fn rejected_edit_writes_nothing() {
        let store = MemoryStore::new();
        let listing = insert_listing(&store, "Cabin").await;
        let edit: ListingEdit = Box::new(|_: &Listing| {
            Err::<ListingFields, _>(AppError::from(crate::serializer::ValidationErrors::single(
                "title",
                "This field may not be blank.",
            )))
        });

        assert!(matches!(
            store.update_listing(listing.id, edit).await,
            Err(AppError::Validation(_))
        ));
        let Ok(unchanged) = store.get_listing(listing.id).await else {
            panic!("listing vanished");
        };
        assert_eq!(unchanged, listing);
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let store = MemoryStore::new();
        let id = ListingId::new(9);
        assert!(matches!(
            store.get_listing(id).await,
            Err(AppError::ListingNotFound(missing)) if missing == id
        ));
        assert!(matches!(
            store.update_listing(id, replace_listing(listing_fields("x"))).await,
            Err(AppError::ListingNotFound(_))
        ));
        assert!(matches!(
            store.delete_listing(id).await,
            Err(AppError::ListingNotFound(_))
        ));
    }

    #[tokio::test]
    async fn booking_against_missing_listing_is_rejected() {
        let store = MemoryStore::new();
        let result = store.insert_booking(booking_fields(ListingId::new(1))).await;
        assert!(matches!(result, Err(AppError::InvalidReference(_))));

        let Ok(bookings) = store.list_bookings(None).await else {
            panic!("list failed");
        };
        assert!(bookings.is_empty());
    }

    #[tokio::test]
    async fn delete_listing_cascades_to_its_bookings_only() {
        let store = MemoryStore::new();
        let doomed = insert_listing(&store, "Cabin").await;
        let kept = insert_listing(&store, "Loft").await;

        for _ in 0..3 {
            let _ = store.insert_booking(booking_fields(doomed.id)).await;
        }
        let Ok(survivor) = store.insert_booking(booking_fields(kept.id)).await else {
            panic!("booking insert failed");
        };

        assert!(matches!(store.delete_listing(doomed.id).await, Ok(3)));

        let Ok(bookings) = store.list_bookings(None).await else {
            panic!("list failed");
        };
        assert_eq!(bookings, vec![survivor]);
    }

    #[tokio::test]
    async fn delete_listing_without_bookings_removes_nothing_else() {
        let store = MemoryStore::new();
        let listing = insert_listing(&store, "Cabin").await;
        assert!(matches!(store.delete_listing(listing.id).await, Ok(0)));
        assert!(store.get_listing(listing.id).await.is_err());
    }

    #[tokio::test]
    async fn moving_a_booking_updates_ownership() {
        let store = MemoryStore::new();
        let from = insert_listing(&store, "Cabin").await;
        let to = insert_listing(&store, "Loft").await;
        let Ok(booking) = store.insert_booking(booking_fields(from.id)).await else {
            panic!("booking insert failed");
        };

        let Ok(moved) = store
            .update_booking(booking.id, replace_booking(booking_fields(to.id)))
            .await else {
            panic!("update failed");
        };
        assert_eq!(moved.listing, to.id);
        assert_eq!(moved.created_at, booking.created_at);

        assert!(matches!(store.delete_listing(from.id).await, Ok(0)));
        assert!(store.get_booking(booking.id).await.is_ok());
        assert!(matches!(store.delete_listing(to.id).await, Ok(1)));
        assert!(store.get_booking(booking.id).await.is_err());
    }

    #[tokio::test]
    async fn update_booking_to_missing_listing_changes_nothing() {
        let store = MemoryStore::new();
        let listing = insert_listing(&store, "Cabin").await;
        let Ok(booking) = store.insert_booking(booking_fields(listing.id)).await else {
            panic!("booking insert failed");
        };

        let result = store
            .update_booking(booking.id, replace_booking(booking_fields(ListingId::new(42))))
            .await;
        assert!(matches!(result, Err(AppError::InvalidReference(_))));

        let Ok(unchanged) = store.get_booking(booking.id).await else {
            panic!("booking vanished");
        };
        assert_eq!(unchanged, booking);
    }

    #[tokio::test]
    async fn list_bookings_filters_by_listing() {
        let store = MemoryStore::new();
        let a = insert_listing(&store, "a").await;
        let b = insert_listing(&store, "b").await;
        let _ = store.insert_booking(booking_fields(a.id)).await;
        let _ = store.insert_booking(booking_fields(b.id)).await;
        let _ = store.insert_booking(booking_fields(a.id)).await;

        let Ok(of_a) = store.list_bookings(Some(a.id)).await else {
            panic!("list failed");
        };
        let ids: Vec<i64> = of_a.iter().map(|b| b.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn delete_booking_twice_is_not_found() {
        let store = MemoryStore::new();
        let listing = insert_listing(&store, "Cabin").await;
        let Ok(booking) = store.insert_booking(booking_fields(listing.id)).await else {
            panic!("booking insert failed");
        };
        assert!(store.delete_booking(booking.id).await.is_ok());
        assert!(matches!(
            store.delete_booking(booking.id).await,
            Err(AppError::BookingNotFound(_))
        ));
    }
}
