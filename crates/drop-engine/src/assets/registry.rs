use std::collections::HashMap;
use crate::assets::manifest::AssetManifest;
use crate::components::sprite::{SpriteComponent, AtlasId};

/// Registry of named sprites, built from an AssetManifest.
/// Provides name-based sprite lookup for game code.
#[derive(Debug, Clone, Default)]
pub struct SpriteRegistry {
    sprites: HashMap<String, SpriteComponent>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a parsed AssetManifest.
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let sprites = manifest
            .sprites
            .iter()
            .map(|(name, desc)| {
                let sprite =
                    SpriteComponent::cell(AtlasId(desc.atlas), desc.col as f32, desc.row as f32);
                (name.clone(), sprite)
            })
            .collect();
        Self { sprites }
    }

    /// Register or replace a sprite by name.
    pub fn insert(&mut self, name: impl Into<String>, sprite: SpriteComponent) {
        self.sprites.insert(name.into(), sprite);
    }

    /// Look up a sprite by name. Returns None if not found.
    pub fn get(&self, name: &str) -> Option<&SpriteComponent> {
        self.sprites.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sprites.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
