use std::sync::Arc;

use crate::config::Config;
use crate::matching::matcher::Matcher;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<Matcher>,
    pub config: Config,
}
