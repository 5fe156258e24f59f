//! Audit hooks
//!
//! Trait interface over the external audit-log sink. The engine reports every
//! mutating call here fire-and-forget: a failure to record an audit entry is
//! logged through the observability boundary and never fails the underlying
//! business operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A single audit entry describing one mutating call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub tenant_id: Option<Uuid>,
    /// Field state before the mutation, when applicable
    pub before: Option<JsonValue>,
    /// Field state after the mutation
    pub after: Option<JsonValue>,
    pub occurred_at: DateTime<Utc>,
}

/// Trait for the audit-log sink the engine reports to.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), String>;
}

/// No-op implementation for when auditing is disabled.
pub struct NoOpAuditSink;

#[async_trait]
impl AuditSink for NoOpAuditSink {
    async fn record(&self, _event: AuditEvent) -> Result<(), String> {
        Ok(())
    }
}

/// Sink that emits audit entries as structured log events.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), String> {
        tracing::info!(
            actor_id = %event.actor_id,
            action = %event.action,
            entity_type = %event.entity_type,
            entity_id = %event.entity_id,
            tenant_id = ?event.tenant_id,
            "audit"
        );
        Ok(())
    }
}
