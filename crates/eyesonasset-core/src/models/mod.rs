//! Data models for EyesOnAsset entities.
//!
//! - `Owner`, `OwnerDraft`: responsible parties and their form data
//! - `Asset`, `AssetDraft`: tracked assets and their form data
//! - `ValidationError`: per-field form validation failures
//!
//! Field limits mirror the backend schemas so bad input is caught before a
//! request is made.

pub mod asset;
pub mod owner;
pub mod validation;

pub use asset::{Asset, AssetDraft, AssetPayload, AssetSortColumn};
pub use owner::{Owner, OwnerDraft, OwnerSortColumn};
pub use validation::{is_valid_email, FieldError, ValidationError};

use uuid::Uuid;

/// Anything with a server-assigned id, so lists can be patched in place
pub trait Identified {
    fn id(&self) -> Uuid;
}
