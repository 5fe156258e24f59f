//! Rezervo service layer
//!
//! The booking lifecycle engine: tenant-isolated data access, permission
//! gating, booking creation with atomic availability checking, status
//! transitions, and the payment ledger. The engine is invoked by a
//! request-handling layer that has already authenticated the principal and
//! parsed the request into typed fields.

pub mod booking;
pub mod test_helpers;

pub use booking::{
    BookingDetailsPatch, BookingService, CreateBookingRequest,
};
