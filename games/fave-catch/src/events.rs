//! Events crossing between the scene and the host UI.

use drop_engine::Topic;
use serde_json::{json, Value};

use crate::catalog::ItemKey;
use crate::handle::SceneHandle;

pub const GAME_OVER: &str = "game-over";
pub const UPDATE_ITEM_LIST: &str = "update-itemList";
pub const UPDATE_DISLIKES: &str = "update-dislikes";
pub const SCENE_READY: &str = "scene-ready";

/// Outward notifications on the engine-scoped channel.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchEvent {
    GameOver { score: i64 },
    /// Collected liked items, in order of first catch.
    ItemList(Vec<ItemKey>),
    /// Disliked items hit, in order of first hit.
    Dislikes(Vec<ItemKey>),
}

impl CatchEvent {
    /// JSON payload handed to host listeners.
    pub fn payload(&self) -> Value {
        match self {
            CatchEvent::GameOver { score } => json!({ "score": score }),
            CatchEvent::ItemList(keys) | CatchEvent::Dislikes(keys) => json!(keys),
        }
    }
}

impl Topic for CatchEvent {
    fn topic(&self) -> &'static str {
        match self {
            CatchEvent::GameOver { .. } => GAME_OVER,
            CatchEvent::ItemList(_) => UPDATE_ITEM_LIST,
            CatchEvent::Dislikes(_) => UPDATE_DISLIKES,
        }
    }
}

/// Published on the app-wide channel once a scene has initialized.
#[derive(Debug, Clone)]
pub struct SceneReady {
    pub handle: SceneHandle,
}

impl Topic for SceneReady {
    fn topic(&self) -> &'static str {
        SCENE_READY
    }
}
