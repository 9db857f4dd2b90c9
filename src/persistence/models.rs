//! Database row models for the `listings` and `bookings` tables.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::{Booking, BookingId, BookingStatus, Listing, ListingId};
use crate::error::AppError;

/// Column list selected for every listing query, in [`ListingRow`] order.
pub const LISTING_COLUMNS: &str =
    "id, title, description, location, price_per_night, created_at, updated_at";

/// Column list selected for every booking query, in [`BookingRow`] order.
pub const BOOKING_COLUMNS: &str = "id, listing_id, user_name, user_email, start_date, end_date, \
     total_price, status, created_at";

/// A row of the `listings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// `VARCHAR(255)`.
    pub title: String,
    /// `TEXT`.
    pub description: String,
    /// `VARCHAR(255)`.
    pub location: String,
    /// `NUMERIC(10, 2)`.
    pub price_per_night: Decimal,
    /// `TIMESTAMPTZ`.
    pub created_at: DateTime<Utc>,
    /// `TIMESTAMPTZ`.
    pub updated_at: DateTime<Utc>,
}

/// A row of the `bookings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    /// `BIGSERIAL` primary key.
    pub id: i64,
    /// Foreign key to `listings.id`, `ON DELETE CASCADE`.
    pub listing_id: i64,
    /// `VARCHAR(255)`.
    pub user_name: String,
    /// `VARCHAR(254)`.
    pub user_email: String,
    /// `DATE`.
    pub start_date: NaiveDate,
    /// `DATE`.
    pub end_date: NaiveDate,
    /// `NUMERIC(10, 2)`.
    pub total_price: Decimal,
    /// `VARCHAR(20)`, one of the [`BookingStatus`] strings.
    pub status: String,
    /// `TIMESTAMPTZ`.
    pub created_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: ListingId::new(row.id),
            title: row.title,
            description: row.description,
            location: row.location,
            price_per_night: row.price_per_night,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse().map_err(|e| {
            AppError::Persistence(format!("booking {} has unreadable status: {e}", row.id))
        })?;
        Ok(Self {
            id: BookingId::new(row.id),
            listing: ListingId::new(row.listing_id),
            user_name: row.user_name,
            user_email: row.user_email,
            start_date: row.start_date,
            end_date: row.end_date,
            total_price: row.total_price,
            status,
            created_at: row.created_at,
        })
    }
}
