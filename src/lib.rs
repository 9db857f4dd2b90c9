//! # travel-listings
//!
//! Data layer of a travel-listing booking application: listings, the
//! bookings made against them, the serializers that map both to and from
//! their flat JSON form, and a REST surface exposing CRUD for each.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ListingService / BookingService (service/)
//!     ├── Serializers (serializer/)
//!     │
//!     └── Store (persistence/)
//!           ├── MemoryStore
//!           └── PostgresStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod serializer;
pub mod service;
