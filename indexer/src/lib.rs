//! Multi-network stake indexer
//!
//! Pulls stake events from per-network subgraphs, derives the active set and keeps a
//! Postgres snapshot of it current.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;
