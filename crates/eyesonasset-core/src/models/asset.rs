use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::owner::Owner;
use super::validation::{check_text, ValidationError};
use super::Identified;

pub const ASSET_NAME_MAX: usize = 140;
pub const ASSET_CATEGORY_MAX: usize = 60;

/// A tracked physical asset (aircraft, vessel, vehicle...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub owner_id: Uuid,
    /// Owner embedded by the backend when the relationship is loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ref: Option<Owner>,
}

impl Asset {
    /// Owner name from the embedded reference, falling back to `owners`
    pub fn owner_name<'a>(&'a self, owners: &'a [Owner]) -> Option<&'a str> {
        self.owner_ref
            .as_ref()
            .map(|o| o.name.as_str())
            .or_else(|| {
                owners
                    .iter()
                    .find(|o| o.id == self.owner_id)
                    .map(|o| o.name.as_str())
            })
    }
}

impl Identified for Asset {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Asset form contents. The owner id is kept as text until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDraft {
    pub name: String,
    pub category: String,
    pub owner_id: String,
}

/// Wire body for asset create/update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetPayload {
    pub name: String,
    pub category: String,
    pub owner_id: Uuid,
}

impl AssetDraft {
    pub fn validate(&self) -> Result<AssetPayload, ValidationError> {
        let name = self.name.trim();
        let category = self.category.trim();
        let owner_id = self.owner_id.trim();

        let mut errors = ValidationError::default();
        check_text(&mut errors, "name", "Name", name, ASSET_NAME_MAX);
        check_text(&mut errors, "category", "Category", category, ASSET_CATEGORY_MAX);

        let parsed_owner = if owner_id.is_empty() {
            errors.push("owner_id", "Owner is required");
            None
        } else {
            match Uuid::parse_str(owner_id) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push("owner_id", "Owner id is not a valid UUID");
                    None
                }
            }
        };

        match parsed_owner {
            Some(owner_id) if errors.is_empty() => Ok(AssetPayload {
                name: name.to_string(),
                category: category.to_string(),
                owner_id,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Asset> for AssetDraft {
    fn from(asset: &Asset) -> Self {
        Self {
            name: asset.name.clone(),
            category: asset.category.clone(),
            owner_id: asset.owner_id.to_string(),
        }
    }
}

/// Column to sort assets by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetSortColumn {
    #[default]
    Name,
    Category,
}

impl AssetSortColumn {
    pub fn toggle(self) -> Self {
        match self {
            AssetSortColumn::Name => AssetSortColumn::Category,
            AssetSortColumn::Category => AssetSortColumn::Name,
        }
    }

    pub fn sort(self, assets: &mut [&Asset]) {
        match self {
            AssetSortColumn::Name => assets.sort_by_key(|a| a.name.to_lowercase()),
            AssetSortColumn::Category => {
                assets.sort_by(|a, b| {
                    a.category
                        .to_lowercase()
                        .cmp(&b.category.to_lowercase())
                        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                });
            }
        }
    }
}
