use std::collections::HashSet;

use axum::routing::{get, post};
use axum::Router;
use snip_shortener::AllocatorConfig;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    add_url_handler, health_handler, index_handler, list_all_handler, redirect_handler,
};
use crate::state::AppState;

/// Path segments served by fixed routes. Generated keys must never shadow them.
pub const ROUTE_WORDS: &[&str] = &["add", "all", "health"];

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/add", post(add_url_handler))
            .route("/all", get(list_all_handler))
            .route("/health", get(health_handler))
            .route("/{short_key}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Builds the allocator configuration for this front end.
    ///
    /// The route words are always reserved on top of `extra_reserved`.
    pub fn allocator_config(
        min_key_length: usize,
        max_attempts: u32,
        extra_reserved: impl IntoIterator<Item = String>,
    ) -> AllocatorConfig {
        let reserved: HashSet<String> = ROUTE_WORDS
            .iter()
            .map(|word| word.to_string())
            .chain(extra_reserved)
            .collect();

        AllocatorConfig::builder()
            .min_key_length(min_key_length)
            .max_attempts(max_attempts)
            .reserved(reserved)
            .build()
    }
}
