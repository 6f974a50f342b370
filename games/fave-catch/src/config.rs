//! Session configuration from the host, and gameplay tuning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use drop_engine::SelectorError;

use crate::catalog::{Catalog, ItemKey};
use crate::session::Phase;

/// What the host sends to start a round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchConfig {
    pub liked_keys: Vec<ItemKey>,
    pub disliked_keys: Vec<ItemKey>,
}

#[derive(Debug, Error, PartialEq)]
pub enum StartError {
    #[error("at least one liked item is required")]
    NoLikedItems,
    #[error("at least one disliked item is required")]
    NoDislikedItems,
    #[error("unknown item '{0}'")]
    UnknownItem(ItemKey),
    #[error("item '{0}' is both liked and disliked")]
    Conflicting(ItemKey),
    #[error("cannot start: scene is {0}")]
    NotIdle(Phase),
    #[error("a start is already pending")]
    AlreadyPending,
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// A configuration checked against the catalog: both lists non-empty,
/// every key known, no duplicates, no key in both lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    liked: Vec<ItemKey>,
    disliked: Vec<ItemKey>,
}

impl ValidatedConfig {
    pub fn liked(&self) -> &[ItemKey] {
        &self.liked
    }

    pub fn disliked(&self) -> &[ItemKey] {
        &self.disliked
    }
}

impl CatchConfig {
    pub fn new(
        liked: impl IntoIterator<Item = impl Into<String>>,
        disliked: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            liked_keys: liked.into_iter().map(ItemKey::new).collect(),
            disliked_keys: disliked.into_iter().map(ItemKey::new).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<ValidatedConfig, StartError> {
        if self.liked_keys.is_empty() {
            return Err(StartError::NoLikedItems);
        }
        if self.disliked_keys.is_empty() {
            return Err(StartError::NoDislikedItems);
        }
        let liked = known_unique(&self.liked_keys, catalog)?;
        let disliked = known_unique(&self.disliked_keys, catalog)?;
        if let Some(both) = liked.iter().find(|k| disliked.contains(*k)) {
            return Err(StartError::Conflicting(both.clone()));
        }
        Ok(ValidatedConfig { liked, disliked })
    }
}

fn known_unique(keys: &[ItemKey], catalog: &Catalog) -> Result<Vec<ItemKey>, StartError> {
    let mut out: Vec<ItemKey> = Vec::with_capacity(keys.len());
    for key in keys {
        if !catalog.contains(key.as_str()) {
            return Err(StartError::UnknownItem(key.clone()));
        }
        if !out.contains(key) {
            out.push(key.clone());
        }
    }
    Ok(out)
}

#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("malformed tuning JSON: {0}")]
    Parse(String),
}

/// Gameplay constants. Every field has a default, so a host override only
/// names what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    /// Round length in seconds.
    pub round_seconds: f32,
    /// Seconds between liked spawns.
    pub liked_interval: f32,
    /// Seconds between disliked spawns.
    pub disliked_interval: f32,
    pub liked_points: i64,
    pub disliked_points: i64,
    /// Player speed in world units per second.
    pub player_speed: f32,
    /// Downward acceleration of falling items.
    pub fall_gravity: f32,
    /// Item size as a fraction of play width (clamped by the layout).
    pub item_scale: f32,
    /// Entities built up front per pool.
    pub pool_capacity: usize,
    /// How long the catch tint stays on the player.
    pub cue_seconds: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            round_seconds: 30.0,
            liked_interval: 0.9,
            disliked_interval: 1.4,
            liked_points: 10,
            disliked_points: -5,
            player_speed: 360.0,
            fall_gravity: 420.0,
            item_scale: 0.08,
            pool_capacity: 8,
            cue_seconds: 0.25,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("roundSeconds", self.round_seconds),
            ("likedInterval", self.liked_interval),
            ("dislikedInterval", self.disliked_interval),
            ("playerSpeed", self.player_speed),
            ("itemScale", self.item_scale),
            ("cueSeconds", self.cue_seconds),
        ];
        match positive.iter().find(|(_, v)| !(*v > 0.0)) {
            Some((name, _)) => Err(TuningError::NotPositive(*name)),
            None => Ok(()),
        }
    }
}
