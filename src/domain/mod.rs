//! Domain layer: the two persistent entities and their identifiers.
//!
//! A [`Listing`] owns zero or more [`Booking`]s; removing a listing removes
//! its bookings with it. Entities here carry no persistence or transport
//! concerns.

pub mod booking;
pub mod ids;
pub mod listing;

pub use booking::{Booking, BookingFields, BookingStatus, InvalidStatus};
pub use ids::{BookingId, ListingId};
pub use listing::{Listing, ListingFields};
