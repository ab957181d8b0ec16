//! Infrastructure adapters and runtime bootstrap.

pub mod db;
pub mod error;
pub mod gateway;
pub mod http;
pub mod telemetry;
