//! Data models for the booking engine
//!
//! This module contains all data structures used throughout the application,
//! organized by domain entity.

mod booking;
mod guest;
mod room;
mod tenant;

// Re-export all models for convenient imports
pub use booking::*;
pub use guest::*;
pub use room::*;
pub use tenant::*;
