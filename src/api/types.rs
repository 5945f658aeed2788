//! Shared types for the report API layer.

use std::sync::Arc;

use crate::service::ReportService;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the report API router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
/// Wraps the `ReportService` built once at startup.
#[derive(Clone)]
pub struct ApiContext {
    pub service: Arc<ReportService>,
}

impl ApiContext {
    pub fn new(service: Arc<ReportService>) -> Self {
        Self { service }
    }
}

// ═══════════════════════════════════════════════════════════
// Request context: injected by the access-log middleware
// ═══════════════════════════════════════════════════════════

/// Per-request correlation id, also echoed in the `X-Request-Id` header.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique_uuids() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a.0, b.0);
        assert!(uuid::Uuid::parse_str(&a.0).is_ok());
    }
}
