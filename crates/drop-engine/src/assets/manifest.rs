use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Asset manifest describing the atlases and named sprites for a game.
/// Loaded from a JSON file (embedded or fetched by the host).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// List of texture atlases.
    pub atlases: Vec<AtlasDescriptor>,
    /// Named sprite lookup: name → atlas index + cell coordinates.
    #[serde(default)]
    pub sprites: HashMap<String, SpriteDescriptor>,
}

/// Describes a single texture atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    /// Human-readable name (e.g., "food").
    pub name: String,
    /// Number of columns in the atlas grid.
    pub cols: u32,
    /// Number of rows in the atlas grid.
    pub rows: u32,
    /// Relative path to the PNG file.
    pub path: String,
}

/// Describes a named sprite within an atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Index into the atlases array.
    pub atlas: u32,
    /// Column in the atlas grid.
    pub col: u32,
    /// Row in the atlas grid.
    pub row: u32,
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sprites that point past the end of the atlas list or outside their grid.
    pub fn invalid_sprites(&self) -> Vec<&str> {
        let mut bad: Vec<&str> = self
            .sprites
            .iter()
            .filter(|(_, desc)| match self.atlases.get(desc.atlas as usize) {
                Some(atlas) => desc.col >= atlas.cols || desc.row >= atlas.rows,
                None => true,
            })
            .map(|(name, _)| name.as_str())
            .collect();
        bad.sort_unstable();
        bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_manifest() {
        let json = r#"{
            "atlases": [
                { "name": "food", "cols": 4, "rows": 4, "path": "food.png" }
            ],
            "sprites": {
                "apple": { "atlas": 0, "col": 0, "row": 0 }
            }
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.atlases.len(), 1);
        assert_eq!(manifest.atlases[0].cols, 4);
        assert_eq!(manifest.sprites["apple"].atlas, 0);
        assert!(manifest.invalid_sprites().is_empty());
    }

    #[test]
    fn sprites_outside_their_atlas_are_reported() {
        let json = r#"{
            "atlases": [
                { "name": "food", "cols": 2, "rows": 2, "path": "food.png" }
            ],
            "sprites": {
                "ok": { "atlas": 0, "col": 1, "row": 1 },
                "wide": { "atlas": 0, "col": 2, "row": 0 },
                "lost": { "atlas": 3, "col": 0, "row": 0 }
            }
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.invalid_sprites(), vec!["lost", "wide"]);
    }
}
