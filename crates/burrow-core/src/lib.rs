//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the types shared by the code generators, the storage
//! backends, the alias service and the HTTP gateway.

pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ShortenerError, StorageError};
pub use repository::{AliasRecord, NewAlias, Repository};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, Shortener};
