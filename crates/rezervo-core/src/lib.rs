//! Rezervo Core Library
//!
//! This crate provides the domain models, authorization model, tenant scoping,
//! pricing, booking state machine, and payment ledger rules shared across all
//! Rezervo components. It holds no process-wide state; every function here is
//! pure with respect to its inputs so the service layer can be tested against
//! an in-memory store substitute.

pub mod audit;
pub mod config;
pub mod error;
pub mod models;
pub mod payment;
pub mod permissions;
pub mod pricing;
pub mod scope;
pub mod state_machine;

// Re-export commonly used types
pub use audit::{AuditEvent, AuditSink, NoOpAuditSink, TracingAuditSink};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use permissions::{Permission, Principal, Role};
pub use scope::TenantScope;
