use drop_engine::Viewport;
use glam::Vec2;

use crate::config::Tuning;

const MIN_ITEM: f32 = 24.0;
const MAX_ITEM: f32 = 96.0;
const GROUND_HEIGHT: f32 = 24.0;

/// Positions and sizes derived from the viewport. Recomputed only when the
/// viewport changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub item_size: f32,
    pub player_size: Vec2,
    /// Centre of the ground strip.
    pub ground_center: Vec2,
    pub ground_size: Vec2,
    /// Player centre height, standing on the ground.
    pub player_y: f32,
    /// Items appear just above the top edge.
    pub spawn_y: f32,
}

impl Layout {
    pub fn from_viewport(viewport: Viewport, tuning: &Tuning) -> Self {
        let width = viewport.width.max(1.0);
        let height = viewport.height.max(1.0);
        let item_size = (width * tuning.item_scale).clamp(MIN_ITEM, MAX_ITEM);
        let player_size = Vec2::new(item_size * 1.6, item_size * 2.0);
        let ground_size = Vec2::new(width, GROUND_HEIGHT);
        Self {
            width,
            height,
            item_size,
            player_size,
            ground_center: Vec2::new(width * 0.5, height - GROUND_HEIGHT * 0.5),
            ground_size,
            player_y: height - GROUND_HEIGHT - player_size.y * 0.5,
            spawn_y: -item_size,
        }
    }

    pub fn mid_x(&self) -> f32 {
        self.width * 0.5
    }

    /// Leftmost and rightmost player centre that keep it on screen.
    pub fn player_x_range(&self) -> (f32, f32) {
        let half = self.player_size.x * 0.5;
        (half, (self.width - half).max(half))
    }
}
