//! Database layer for the booking engine
//!
//! Postgres repositories over sqlx. Every query issued on behalf of a
//! tenant-scoped principal is intersected with that tenant id; the
//! [`BookingStore`] trait is the seam the service layer consumes, so tests can
//! substitute an in-memory store.

pub mod db;
pub mod setup;
pub mod store;

pub use db::{BookingRepository, GuestRepository, RoomRepository, TenantRepository};
pub use setup::setup_database;
pub use store::{BookingStore, PgBookingStore};
