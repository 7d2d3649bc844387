use std::sync::Arc;

use snip_core::Shortener;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    debug: bool,
}

impl AppState {
    /// `debug` exposes the `/all` listing; keep it off in production.
    pub fn new(shortener: Arc<dyn Shortener>, debug: bool) -> Self {
        Self { shortener, debug }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}
