//! Shared state for the HTTP layer.

use std::sync::Arc;

use crate::assessment::AssessmentService;

/// Shared context for all routes. Cloned per request; the service is
/// built once at startup and never mutated.
#[derive(Clone)]
pub struct ApiContext {
    pub service: Arc<AssessmentService>,
}

impl ApiContext {
    pub fn new(service: Arc<AssessmentService>) -> Self {
        Self { service }
    }
}
