//! The fixed item catalog and the sprites that draw it.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use drop_engine::{AssetManifest, SpriteRegistry};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");
const BUILTIN_SPRITES: &str = include_str!("../assets/sprites.json");

/// Opaque catalog identifier of a collectible item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl Borrow<str> for ItemKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: ItemKey,
    /// Display name shown by the host UI.
    pub name: String,
    /// Image path relative to the host's asset root.
    pub image: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog is empty")]
    Empty,
    #[error("duplicate catalog key '{0}'")]
    DuplicateKey(ItemKey),
    #[error("no sprite for catalog item '{0}'")]
    MissingSprite(ItemKey),
    #[error("sprites point outside their atlas: {0:?}")]
    BadSprites(Vec<String>),
}

/// Immutable set of known items, in file order.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<ItemKey, usize>,
}

impl Catalog {
    /// Parse a JSON array of `{ key, name, image }`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.key.clone(), i).is_some() {
                return Err(CatalogError::DuplicateKey(entry.key.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    /// The catalog bundled with the game.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every item must have a sprite registered under its key.
    pub fn check_sprites(&self, sprites: &SpriteRegistry) -> Result<(), CatalogError> {
        match self.keys().find(|key| !sprites.contains(key.as_str())) {
            Some(missing) => Err(CatalogError::MissingSprite(missing.clone())),
            None => Ok(()),
        }
    }
}

/// Sprite registry for a manifest, rejecting sprites outside their atlas.
pub fn sprites_from_json(json: &str) -> Result<SpriteRegistry, CatalogError> {
    let manifest = AssetManifest::from_json(json)?;
    let bad = manifest.invalid_sprites();
    if !bad.is_empty() {
        return Err(CatalogError::BadSprites(
            bad.into_iter().map(str::to_owned).collect(),
        ));
    }
    Ok(SpriteRegistry::from_manifest(&manifest))
}

/// The sprite manifest bundled with the game.
pub fn builtin_sprites() -> Result<SpriteRegistry, CatalogError> {
    sprites_from_json(BUILTIN_SPRITES)
}
