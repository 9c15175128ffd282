//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the database row
//! - A `Deserialize` create DTO for inserts (services reuse
//!   `uptime_core::service::CreateService`)
//! - A conversion into the matching `uptime-core` entity

pub mod observation;
pub mod service;
