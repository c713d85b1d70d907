//! In-memory resource lists.
//!
//! This module provides `ResourceList`, the client-side copy of a backend
//! collection. After a confirmed create/update/delete the list is patched in
//! place instead of being re-fetched; `invalidate` forces the next refresh.
//! Nothing here is written to disk.

pub mod list;

pub use list::ResourceList;
