use glam::Vec2;
use crate::api::types::EntityId;
use crate::components::animation::Animator;
use crate::components::sprite::SpriteComponent;
#[cfg(feature = "physics")]
use crate::core::physics::PhysicsBody;

/// Fat entity: one struct with optional components.
///
/// Pooled entities are never removed from the scene between uses; they are
/// switched off with `active`/`visible` and switched back on when reused.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Category tag (e.g. "player", "liked").
    pub tag: String,
    /// Per-use name; pooled items carry the item key they currently show.
    pub name: String,
    /// Inactive entities are skipped by physics sync and rendering.
    pub active: bool,
    /// Hidden entities stay simulated but are not rendered.
    pub visible: bool,
    /// Position in world space (centre of the sprite).
    pub pos: Vec2,
    pub rotation: f32,
    /// World-space rendered size.
    pub scale: Vec2,
    pub sprite: Option<SpriteComponent>,
    pub animation: Option<Animator>,
    #[cfg(feature = "physics")]
    pub body: Option<PhysicsBody>,
}

impl Entity {
    /// Create a new active, visible entity at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            name: String::new(),
            active: true,
            visible: true,
            pos: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            sprite: None,
            animation: None,
            #[cfg(feature = "physics")]
            body: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteComponent) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn with_animation(mut self, animation: Animator) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Start switched off (pool reserve).
    pub fn dormant(mut self) -> Self {
        self.active = false;
        self.visible = false;
        self
    }

    #[cfg(feature = "physics")]
    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Active and visible: what the renderer draws.
    pub fn is_shown(&self) -> bool {
        self.active && self.visible
    }
}
