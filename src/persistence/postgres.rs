//! PostgreSQL implementation of the [`Store`] trait.
//!
//! Each mutation runs in its own transaction. Updates lock the row with
//! `FOR UPDATE` before deriving the new fields from it. Listing deletion
//! deletes the dependent bookings explicitly before the listing row, so the
//! cascade does not depend on the `ON DELETE CASCADE` clause alone.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{BookingEdit, ListingEdit, Store};
use super::models::{BOOKING_COLUMNS, BookingRow, LISTING_COLUMNS, ListingRow};
use crate::config::AppConfig;
use crate::domain::{Booking, BookingFields, BookingId, Listing, ListingFields, ListingId};
use crate::error::AppError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

fn persistence_error(e: sqlx::Error) -> AppError {
    AppError::Persistence(e.to_string())
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`AppError::Persistence`] if the database is unreachable.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(persistence_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns a [`AppError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    /// Locks the listing row for the rest of the transaction; `false` if it
    /// does not exist.
    async fn lock_listing(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: ListingId,
        exclusive: bool,
    ) -> Result<bool, AppError> {
        let sql = if exclusive {
            "SELECT id FROM listings WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT id FROM listings WHERE id = $1 FOR SHARE"
        };
        let row = sqlx::query_scalar::<_, i64>(sql)
            .bind(id.get())
            .fetch_optional(&mut **tx)
            .await
            .map_err(persistence_error)?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn list_listings(&self) -> Result<Vec<Listing>, AppError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(persistence_error)?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn get_listing(&self, id: ListingId) -> Result<Listing, AppError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_error)?;

        row.map(Listing::from).ok_or(AppError::ListingNotFound(id))
    }

    async fn insert_listing(&self, fields: ListingFields) -> Result<Listing, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "INSERT INTO listings (title, description, location, price_per_night, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {LISTING_COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.price_per_night)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(persistence_error)?;
        tx.commit().await.map_err(persistence_error)?;

        Ok(Listing::from(row))
    }

    async fn update_listing(
        &self,
        id: ListingId,
        edit: ListingEdit,
    ) -> Result<Listing, AppError> {
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;
        let current = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence_error)?
        .map(Listing::from)
        .ok_or(AppError::ListingNotFound(id))?;
        let fields = edit(&current)?;

        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "UPDATE listings SET title = $2, description = $3, location = $4, \
             price_per_night = $5, updated_at = $6 WHERE id = $1 RETURNING {LISTING_COLUMNS}"
        ))
        .bind(id.get())
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.price_per_night)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(persistence_error)?;
        tx.commit().await.map_err(persistence_error)?;

        Ok(Listing::from(row))
    }

    async fn delete_listing(&self, id: ListingId) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;
        if !Self::lock_listing(&mut tx, id, true).await? {
            return Err(AppError::ListingNotFound(id));
        }

        let bookings = sqlx::query("DELETE FROM bookings WHERE listing_id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(persistence_error)?;
        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(persistence_error)?;
        tx.commit().await.map_err(persistence_error)?;

        Ok(bookings.rows_affected())
    }

    async fn list_bookings(&self, listing: Option<ListingId>) -> Result<Vec<Booking>, AppError> {
        let rows = if let Some(listing) = listing {
            sqlx::query_as::<_, BookingRow>(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE listing_id = $1 ORDER BY id ASC"
            ))
            .bind(listing.get())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, BookingRow>(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id ASC"
            ))
            .fetch_all(&self.pool)
            .await
        }
        .map_err(persistence_error)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking, AppError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_error)?;

        row.ok_or(AppError::BookingNotFound(id))
            .and_then(Booking::try_from)
    }

    async fn insert_booking(&self, fields: BookingFields) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;
        if !Self::lock_listing(&mut tx, fields.listing, false).await? {
            return Err(AppError::InvalidReference(fields.listing));
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "INSERT INTO bookings (listing_id, user_name, user_email, start_date, end_date, \
             total_price, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(fields.listing.get())
        .bind(&fields.user_name)
        .bind(&fields.user_email)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.total_price)
        .bind(fields.status.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(persistence_error)?;
        tx.commit().await.map_err(persistence_error)?;

        Booking::try_from(row)
    }

    async fn update_booking(
        &self,
        id: BookingId,
        edit: BookingEdit,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;
        let current = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(persistence_error)?
        .ok_or(AppError::BookingNotFound(id))
        .and_then(Booking::try_from)?;
        let fields = edit(&current)?;
        if !Self::lock_listing(&mut tx, fields.listing, false).await? {
            return Err(AppError::InvalidReference(fields.listing));
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET listing_id = $2, user_name = $3, user_email = $4, \
             start_date = $5, end_date = $6, total_price = $7, status = $8 \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id.get())
        .bind(fields.listing.get())
        .bind(&fields.user_name)
        .bind(&fields.user_email)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.total_price)
        .bind(fields.status.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(persistence_error)?;
        tx.commit().await.map_err(persistence_error)?;

        Booking::try_from(row)
    }

    async fn delete_booking(&self, id: BookingId) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(persistence_error)?;
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(persistence_error)?;
        if result.rows_affected() == 0 {
            return Err(AppError::BookingNotFound(id));
        }
        tx.commit().await.map_err(persistence_error)?;
        Ok(())
    }
}
