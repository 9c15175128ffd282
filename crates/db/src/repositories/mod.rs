//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod failure_repo;
pub mod hit_repo;
pub mod service_repo;

pub use failure_repo::FailureRepo;
pub use hit_repo::HitRepo;
pub use service_repo::ServiceRepo;
