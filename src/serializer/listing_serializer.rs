//! Listing serializer: `ListingData` representation and input validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::ValidationErrors;
use super::fields::{DECIMAL_PLACES, FieldReader};
use crate::domain::listing::{LOCATION_MAX_LENGTH, TITLE_MAX_LENGTH};
use crate::domain::{Listing, ListingFields, ListingId};

/// Every field of the external representation, in output order.
pub const FIELDS: [&str; 7] = [
    "id",
    "title",
    "description",
    "location",
    "price_per_night",
    "created_at",
    "updated_at",
];

/// External representation of a [`Listing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListingData {
    /// Listing id.
    #[schema(value_type = i64, example = 1)]
    pub id: ListingId,
    /// Title.
    #[schema(example = "Cabin")]
    pub title: String,
    /// Description.
    #[schema(example = "Cozy")]
    pub description: String,
    /// Location.
    #[schema(example = "Aspen")]
    pub location: String,
    /// Nightly price with two fractional digits.
    #[schema(value_type = String, example = "120.00")]
    pub price_per_night: Decimal,
    /// Creation timestamp (RFC 3339).
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (RFC 3339).
    pub updated_at: DateTime<Utc>,
}

/// Renders a listing with its explicit field list.
#[must_use]
pub fn to_representation(listing: &Listing) -> ListingData {
    let mut price_per_night = listing.price_per_night;
    price_per_night.rescale(DECIMAL_PLACES);
    ListingData {
        id: listing.id,
        title: listing.title.clone(),
        description: listing.description.clone(),
        location: listing.location.clone(),
        price_per_night,
        created_at: listing.created_at,
        updated_at: listing.updated_at,
    }
}

/// Validates client input for a create (`instance = None`) or an update.
///
/// With `partial` set and an instance given, absent fields keep the
/// instance's values; otherwise every writable field is required.
/// `id`, `created_at`, `updated_at` and unknown keys are ignored.
///
/// # Errors
///
/// Returns every offending field with its messages.
pub fn validate(
    data: &Value,
    instance: Option<&Listing>,
    partial: bool,
) -> Result<ListingFields, ValidationErrors> {
    let current = instance.filter(|_| partial).map(Listing::fields);
    let current = current.as_ref();
    let mut reader = FieldReader::new(data)?;

    let title = reader.char_field("title", Some(TITLE_MAX_LENGTH));
    let title = reader.resolve("title", title, current.map(|c| c.title.clone()));

    let description = reader.char_field("description", None);
    let description = reader.resolve(
        "description",
        description,
        current.map(|c| c.description.clone()),
    );

    let location = reader.char_field("location", Some(LOCATION_MAX_LENGTH));
    let location = reader.resolve("location", location, current.map(|c| c.location.clone()));

    let price_per_night = reader.decimal_field("price_per_night");
    let price_per_night = reader.resolve(
        "price_per_night",
        price_per_night,
        current.map(|c| c.price_per_night),
    );

    let errors = reader.into_errors();
    match (title, description, location, price_per_night) {
        (Some(title), Some(description), Some(location), Some(price_per_night))
            if errors.is_empty() =>
        {
            Ok(ListingFields {
                title,
                description,
                location,
                price_per_night,
            })
        }
        _ => Err(errors),
    }
}
