use pastebin::PasteService;
use shared::config::Config;
use std::time::Duration;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub paste_service: PasteService,
    /// Lifetime applied when a create request omits `lifetimeSeconds`
    pub default_lifetime_secs: i64,
    /// Upper bound on each handler's call into the service
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(paste_service: PasteService, config: &Config) -> Self {
        Self {
            paste_service,
            default_lifetime_secs: config.default_lifetime_secs,
            request_timeout: config.request_timeout,
        }
    }
}
