//! # ScrumFlow API Server Library
//!
//! HTTP surface over `scrumflow-shared`: projects, members, sprints,
//! backlogs and user stories.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from the environment
//! - `error`: error type and HTTP response mapping
//! - `extract`: extractors rendering rejections as JSON errors
//! - `middleware`: authentication and security headers
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
