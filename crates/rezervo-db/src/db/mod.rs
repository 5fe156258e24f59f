//! Database repositories for the data access layer
//!
//! Each repository is responsible for one domain entity and provides
//! tenant-filtered queries. Mutations on bookings go through conditional
//! writes keyed on the booking version.

pub mod booking;
pub mod guest;
pub mod room;
pub mod tenant;

pub use booking::BookingRepository;
pub use guest::GuestRepository;
pub use room::RoomRepository;
pub use tenant::TenantRepository;
