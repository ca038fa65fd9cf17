//! Fantasy Cricket API Library
//!
//! Player valuation, team composition under roster and budget limits,
//! and the HTTP surface over them. Storage is pluggable: PostgreSQL in
//! production, an in-memory store for tests and local runs.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
