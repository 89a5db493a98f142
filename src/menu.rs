//! Menu item descriptors
//!
//! The menu subsystem is external to the AR engine: it hands a [`MenuItem`]
//! to the AR view on navigation and nothing more. The engine only reads
//! `name`, `price` and `asset_ref`; the remaining fields ride along for the
//! HUD. An absent item is a valid state ("no item selected"), not an error.

use serde::Deserialize;

/// A single dish as described by the menu subsystem.
///
/// Immutable for the duration of an AR session.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItem {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: String,
    /// Preview image shown on the idle screen; never touched by the engine.
    #[serde(default)]
    pub thumbnail_ref: String,
    /// Path to a 3D scene asset. Empty or missing means "synthesize a model
    /// from the item name instead".
    #[serde(default)]
    pub asset_ref: Option<String>,
}

impl MenuItem {
    /// The asset reference, with empty strings treated the same as absence.
    pub fn asset_ref(&self) -> Option<&str> {
        self.asset_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// A parsed menu, as delivered by the (out-of-scope) menu subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuCatalog {
    pub items: Vec<MenuItem>,
}

impl MenuCatalog {
    /// Parses a catalog from its JSON form.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let catalog: MenuCatalog = serde_json::from_str(json)?;
        Ok(catalog)
    }

    pub fn find(&self, id: u32) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "items": [
            {
                "id": 1,
                "name": "Margherita Pizza",
                "description": "Tomato, mozzarella, basil",
                "price": 15.99,
                "category": "Pizza",
                "thumbnail_ref": "images/margherita.jpg",
                "asset_ref": "models/margherita.obj"
            },
            {
                "id": 2,
                "name": "Garden Salad",
                "price": 9.5,
                "category": "Salads",
                "asset_ref": ""
            }
        ]
    }"#;

    #[test]
    fn parses_catalog() {
        let catalog = MenuCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.items.len(), 2);
        assert_eq!(catalog.find(1).unwrap().name, "Margherita Pizza");
        assert!(catalog.find(3).is_none());
    }

    #[test]
    fn empty_asset_ref_reads_as_absent() {
        let catalog = MenuCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(
            catalog.find(1).unwrap().asset_ref(),
            Some("models/margherita.obj")
        );
        assert_eq!(catalog.find(2).unwrap().asset_ref(), None);
    }

    #[test]
    fn missing_optional_fields_default() {
        let catalog = MenuCatalog::from_json(SAMPLE).unwrap();
        let salad = catalog.find(2).unwrap();
        assert!(salad.description.is_empty());
        assert!(salad.thumbnail_ref.is_empty());
    }
}
