//! The alias service: creation with unique codes, expiry-aware resolution
//! and usage accounting on top of any [`Repository`](burrow_core::Repository).

pub mod service;
pub mod settings;
pub mod sweeper;

pub use service::ShortenerService;
pub use settings::ShortenerSettings;
pub use sweeper::spawn_sweeper;
