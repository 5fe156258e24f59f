pub mod service;
pub mod types;

pub use service::BookingService;
pub use types::{BookingDetailsPatch, CreateBookingRequest};
