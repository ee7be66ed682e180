//! # ScrumFlow Shared Library
//!
//! This crate contains the domain types, persistence, access rules and
//! business logic used by the ScrumFlow API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their SQL
//! - `auth`: Authentication primitives and project access control
//! - `services`: Transactional operations on projects, members and stories
//! - `db`: Connection pool and migrations
//! - `error`: Service error taxonomy
//! - `pagination`: Page resolution for list endpoints

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;

/// Current version of the ScrumFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
