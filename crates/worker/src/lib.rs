//! Uptime worker: keeps the service catalog fresh and forwards check
//! requests to the probing scheduler.

pub mod background;
pub mod config;
