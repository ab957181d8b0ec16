//! hottake: a social feed for short opinion takes.
//!
//! The server half lives here: the feed query service, take creation and
//! retrieval, the lazily-connected store gateway, configuration, and
//! telemetry. The terminal client ships as the `hottake-cli` binary and the
//! wire types are shared through the `hottake-api-types` crate.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
