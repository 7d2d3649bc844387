//! HTTP front end for the snip URL shortener.
//!
//! Serves the shorten form, the `/add` endpoint, the debug-only `/all`
//! listing and the short key redirects on top of any [`Shortener`].
//!
//! [`Shortener`]: snip_core::Shortener

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
