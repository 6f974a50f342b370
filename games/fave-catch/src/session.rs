//! Per-session bookkeeping: phase, collected items, counters, HUD readout.

use serde::Serialize;

use crate::catalog::ItemKey;

/// Scene lifecycle. `GameOver` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::GameOver => "game over",
        })
    }
}

/// Which list an item was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Liked,
    Disliked,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Liked, Category::Disliked];

    /// Entity tag for pooled items of this category.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Liked => "liked",
            Category::Disliked => "disliked",
        }
    }
}

/// Distinct keys in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    keys: Vec<ItemKey>,
}

impl Collected {
    /// Returns true if `key` was new.
    pub fn insert(&mut self, key: ItemKey) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.keys.contains(key)
    }

    pub fn as_slice(&self) -> &[ItemKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub spawned: u32,
    pub liked_caught: u32,
    pub disliked_hit: u32,
    /// Items that reached the ground untouched.
    pub dropped: u32,
}

/// Everything the host UI shows outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hud {
    pub score: i64,
    pub seconds_left: u32,
    pub phase: Phase,
}

/// Whole seconds shown for `remaining` seconds on the clock.
pub fn display_seconds(remaining: f32) -> u32 {
    remaining.max(0.0).ceil() as u32
}
