//! Booking serializer: `BookingData` representation and input validation.
//!
//! The `listing` field is the related listing's id. Only its type is
//! validated here; the store rejects ids that do not exist.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::ValidationErrors;
use super::fields::{DECIMAL_PLACES, FieldReader};
use crate::domain::booking::{USER_EMAIL_MAX_LENGTH, USER_NAME_MAX_LENGTH};
use crate::domain::{Booking, BookingFields, BookingId, BookingStatus, ListingId};

/// Every field of the external representation, in output order.
pub const FIELDS: [&str; 9] = [
    "id",
    "listing",
    "user_name",
    "user_email",
    "start_date",
    "end_date",
    "total_price",
    "status",
    "created_at",
];

/// External representation of a [`Booking`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookingData {
    /// Booking id.
    #[schema(value_type = i64, example = 1)]
    pub id: BookingId,
    /// Id of the booked listing.
    #[schema(value_type = i64, example = 1)]
    pub listing: ListingId,
    /// Guest name.
    #[schema(example = "Jo")]
    pub user_name: String,
    /// Guest email.
    #[schema(example = "jo@x.com")]
    pub user_email: String,
    /// First night (`YYYY-MM-DD`).
    pub start_date: NaiveDate,
    /// Departure date (`YYYY-MM-DD`).
    pub end_date: NaiveDate,
    /// Total price with two fractional digits.
    #[schema(value_type = String, example = "480.00")]
    pub total_price: Decimal,
    /// Booking status.
    pub status: BookingStatus,
    /// Creation timestamp (RFC 3339).
    pub created_at: DateTime<Utc>,
}

/// Renders a booking with its explicit field list.
#[must_use]
pub fn to_representation(booking: &Booking) -> BookingData {
    let mut total_price = booking.total_price;
    total_price.rescale(DECIMAL_PLACES);
    BookingData {
        id: booking.id,
        listing: booking.listing,
        user_name: booking.user_name.clone(),
        user_email: booking.user_email.clone(),
        start_date: booking.start_date,
        end_date: booking.end_date,
        total_price,
        status: booking.status,
        created_at: booking.created_at,
    }
}

/// Validates client input for a create (`instance = None`) or an update.
///
/// `status` may always be omitted: it falls back to the instance's status,
/// or to [`BookingStatus::Pending`] on create. Other fields follow the same
/// partial-update rules as listings.
///
/// # Errors
///
/// Returns every offending field with its messages.
pub fn validate(
    data: &Value,
    instance: Option<&Booking>,
    partial: bool,
) -> Result<BookingFields, ValidationErrors> {
    let current = instance.filter(|_| partial).map(Booking::fields);
    let current = current.as_ref();
    let mut reader = FieldReader::new(data)?;

    let listing = reader.pk_field("listing");
    let listing = reader
        .resolve("listing", listing, current.map(|c| c.listing.get()))
        .map(ListingId::new);

    let user_name = reader.char_field("user_name", Some(USER_NAME_MAX_LENGTH));
    let user_name = reader.resolve(
        "user_name",
        user_name,
        current.map(|c| c.user_name.clone()),
    );

    let user_email = reader.email_field("user_email", USER_EMAIL_MAX_LENGTH);
    let user_email = reader.resolve(
        "user_email",
        user_email,
        current.map(|c| c.user_email.clone()),
    );

    let start_date = reader.date_field("start_date");
    let start_date = reader.resolve("start_date", start_date, current.map(|c| c.start_date));

    let end_date = reader.date_field("end_date");
    let end_date = reader.resolve("end_date", end_date, current.map(|c| c.end_date));

    let total_price = reader.decimal_field("total_price");
    let total_price = reader.resolve("total_price", total_price, current.map(|c| c.total_price));

    let status = reader.choice_field::<BookingStatus>("status");
    let status = reader.resolve(
        "status",
        status,
        Some(instance.map_or_else(BookingStatus::default, |b| b.status)),
    );

    let errors = reader.into_errors();
    match (
        listing,
        user_name,
        user_email,
        start_date,
        end_date,
        total_price,
        status,
    ) {
        (
            Some(listing),
            Some(user_name),
            Some(user_email),
            Some(start_date),
            Some(end_date),
            Some(total_price),
            Some(status),
        ) if errors.is_empty() => Ok(BookingFields {
            listing,
            user_name,
            user_email,
            start_date,
            end_date,
            total_price,
            status,
        }),
        _ => Err(errors),
    }
}
