//! Core types and traits for the snip URL shortener.
//!
//! This crate provides the short key type, keyspace arithmetic and the
//! repository and shortener contracts shared by the storage backends,
//! the key allocator and the HTTP gateway.

pub mod error;
pub mod keyspace;
pub mod repository;
pub mod shortener;
pub mod shortkey;

pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, UrlMapping, UrlRecord};
pub use shortener::Shortener;
pub use shortkey::ShortKey;
