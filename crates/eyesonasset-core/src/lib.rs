//! Core library for EyesOnAsset.
//!
//! Owns everything that is independent of the presentation layer:
//!
//! - `auth`: session persistence, validity evaluation, login and logout
//! - `routing`: route classification and the navigation guard
//! - `api`: REST client for owners and assets with bearer-token handling
//! - `models`: owner/asset types and their form validation
//! - `cache`: in-memory resource lists kept in sync after mutations
//! - `config`: persisted application configuration

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod routing;

pub use config::Config;
