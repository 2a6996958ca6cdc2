//! Job-application tracking over the UK visa sponsor register.

pub mod auth;
pub mod config;
pub mod dates;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
