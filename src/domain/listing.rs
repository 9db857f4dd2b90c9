//! Listing entity: a bookable travel property.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ListingId;

/// Maximum length of [`Listing::title`], in characters.
pub const TITLE_MAX_LENGTH: usize = 255;

/// Maximum length of [`Listing::location`], in characters.
pub const LOCATION_MAX_LENGTH: usize = 255;

/// A persisted travel property.
///
/// `id`, `created_at` and `updated_at` are assigned by the store and never
/// taken from client input. `updated_at` equals `created_at` until the first
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Auto-assigned primary key.
    pub id: ListingId,
    /// Short title, at most [`TITLE_MAX_LENGTH`] characters.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Location, at most [`LOCATION_MAX_LENGTH`] characters.
    pub location: String,
    /// Nightly price, `NUMERIC(10, 2)`.
    pub price_per_night: Decimal,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

/// The client-writable part of a [`Listing`], as produced by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFields {
    /// See [`Listing::title`].
    pub title: String,
    /// See [`Listing::description`].
    pub description: String,
    /// See [`Listing::location`].
    pub location: String,
    /// See [`Listing::price_per_night`].
    pub price_per_night: Decimal,
}

impl Listing {
    /// Builds a freshly inserted listing; both timestamps are set to `now`.
    #[must_use]
    pub fn create(id: ListingId, fields: ListingFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            location: fields.location,
            price_per_night: fields.price_per_night,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every writable field and refreshes `updated_at`.
    pub fn apply(&mut self, fields: ListingFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.description = fields.description;
        self.location = fields.location;
        self.price_per_night = fields.price_per_night;
        self.updated_at = now;
    }

    /// Returns a copy of the writable fields.
    #[must_use]
    pub fn fields(&self) -> ListingFields {
        ListingFields {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            price_per_night: self.price_per_night,
        }
    }

    /// Default listing order: newest first, ties broken by higher id first.
    #[must_use]
    pub fn default_order(a: &Self, b: &Self) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
