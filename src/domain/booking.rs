//! Booking entity: a guest's reservation against one listing.
//!
//! Dates, price and status are stored exactly as supplied. Nothing checks
//! that `start_date` precedes `end_date`, that `total_price` matches the
//! listing's nightly price, or that two bookings of the same listing do not
//! overlap.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BookingId, ListingId};

/// Maximum length of [`Booking::user_name`], in characters.
pub const USER_NAME_MAX_LENGTH: usize = 255;

/// Maximum length of [`Booking::user_email`], in characters.
pub const USER_EMAIL_MAX_LENGTH: usize = 254;

/// Lifecycle label of a booking.
///
/// Purely descriptive: any status may be replaced by any other.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting confirmation. Assigned when no status is supplied.
    #[default]
    Pending,
    /// Confirmed by the host.
    Confirmed,
    /// Canceled by either party.
    Canceled,
}

impl BookingStatus {
    /// Every accepted status, in declaration order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Confirmed, Self::Canceled];

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside `pending`, `confirmed`, `canceled`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct InvalidStatus(pub String);

impl FromStr for BookingStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// A persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Auto-assigned primary key.
    pub id: BookingId,
    /// Owning listing. Deleting it deletes this booking.
    pub listing: ListingId,
    /// Guest name, at most [`USER_NAME_MAX_LENGTH`] characters.
    pub user_name: String,
    /// Guest email address.
    pub user_email: String,
    /// First night.
    pub start_date: NaiveDate,
    /// Departure date.
    pub end_date: NaiveDate,
    /// Total price, `NUMERIC(10, 2)`.
    pub total_price: Decimal,
    /// Current status.
    pub status: BookingStatus,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
}

/// The client-writable part of a [`Booking`], as produced by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFields {
    /// See [`Booking::listing`].
    pub listing: ListingId,
    /// See [`Booking::user_name`].
    pub user_name: String,
    /// See [`Booking::user_email`].
    pub user_email: String,
    /// See [`Booking::start_date`].
    pub start_date: NaiveDate,
    /// See [`Booking::end_date`].
    pub end_date: NaiveDate,
    /// See [`Booking::total_price`].
    pub total_price: Decimal,
    /// See [`Booking::status`].
    pub status: BookingStatus,
}

impl Booking {
    /// Builds a freshly inserted booking.
    #[must_use]
    pub fn create(id: BookingId, fields: BookingFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            listing: fields.listing,
            user_name: fields.user_name,
            user_email: fields.user_email,
            start_date: fields.start_date,
            end_date: fields.end_date,
            total_price: fields.total_price,
            status: fields.status,
            created_at: now,
        }
    }

    /// Replaces every writable field. `created_at` is left untouched.
    pub fn apply(&mut self, fields: BookingFields) {
        self.listing = fields.listing;
        self.user_name = fields.user_name;
        self.user_email = fields.user_email;
        self.start_date = fields.start_date;
        self.end_date = fields.end_date;
        self.total_price = fields.total_price;
        self.status = fields.status;
    }

    /// Returns a copy of the writable fields.
    #[must_use]
    pub fn fields(&self) -> BookingFields {
        BookingFields {
            listing: self.listing,
            user_name: self.user_name.clone(),
            user_email: self.user_email.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            total_price: self.total_price,
            status: self.status,
        }
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Booking {} - {}", self.id, self.user_name)
    }
}
