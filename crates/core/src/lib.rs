//! Uptime domain core.
//!
//! Pure statistics over hit/failure history ([`uptime`]), the service
//! catalog ([`catalog`]) and the ports it consumes ([`store`],
//! [`scheduler`]). Nothing here talks to a database directly; see
//! `uptime-db` for the PostgreSQL adapter.

pub mod catalog;
pub mod error;
pub mod hashing;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod types;
pub mod uptime;

pub use catalog::ServiceCatalog;
pub use error::CoreError;
