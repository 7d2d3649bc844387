//! URL shortener service implementation.
//!
//! This crate provides the [`ShortKeyAllocator`], the key [`Generator`]s it
//! draws candidates from, and the [`ShortenerService`] that ties the
//! allocator to a repository. Core types are re-exported from `snip_core`.

pub mod allocator;
pub mod generator;
pub mod service;

pub use allocator::{AllocatorConfig, AllocatorState, ShortKeyAllocator};
pub use generator::random::RandomGenerator;
pub use generator::seq::SeqGenerator;
pub use generator::Generator;
pub use service::ShortenerService;
pub use snip_core::ShortenerError;
