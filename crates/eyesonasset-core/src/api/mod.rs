//! REST API client module for the EyesOnAsset backend.
//!
//! This module provides the `ApiClient` for the owner and asset endpoints.
//! Every request carries the bearer token currently in the session store,
//! and a 401 from any of them clears that session.

pub mod client;
pub mod error;

pub use client::{ApiClient, Page};
pub use error::{extract_detail, ApiError};
