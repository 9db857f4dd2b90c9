//! Type-safe record identifiers.
//!
//! [`ListingId`] and [`BookingId`] wrap the auto-assigned `BIGINT` primary
//! keys so a booking id can never be passed where a listing id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of a [`super::Listing`].
///
/// Assigned by the store on insert, starting at 1, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(i64);

/// Primary key of a [`super::Booking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(i64);

macro_rules! impl_record_id {
    ($name:ident) => {
        impl $name {
            /// Wraps a raw primary key value.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw primary key value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

impl_record_id!(ListingId);
impl_record_id!(BookingId);
