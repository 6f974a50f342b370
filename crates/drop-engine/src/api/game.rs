use crate::api::types::{EntityId, Viewport};
use crate::core::scene::Scene;
use crate::input::queue::InputQueue;
#[cfg(feature = "physics")]
use crate::core::physics::{
    PhysicsWorld, BodyDesc, ColliderDesc, ColliderMaterial, CollisionPair,
};
#[cfg(feature = "physics")]
use crate::components::entity::Entity;
#[cfg(feature = "physics")]
use glam::Vec2;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of render instances (default: 512).
    pub max_instances: usize,
    /// Gravity vector for physics simulation. Default: zero (no gravity).
    /// Y points down, so positive Y pulls toward the bottom of the screen.
    #[cfg(feature = "physics")]
    pub gravity: Vec2,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            max_instances: 512,
            #[cfg(feature = "physics")]
            gravity: Vec2::ZERO,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The game loop tick. Called once per fixed step, before physics.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Release everything the game created. Called once when the runner
    /// shuts down; the context is dropped afterwards.
    fn teardown(&mut self, _ctx: &mut EngineContext) {}
}

/// Mutable access to engine state, passed to the `Game` hooks.
pub struct EngineContext {
    pub scene: Scene,
    next_id: u32,
    viewport: Viewport,
    #[cfg(feature = "physics")]
    pub physics: PhysicsWorld,
    #[cfg(feature = "physics")]
    collision_events: Vec<CollisionPair>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::from_config(&GameConfig::default())
    }

    /// Build a context sized and tuned for `config`.
    pub fn from_config(config: &GameConfig) -> Self {
        #[cfg(feature = "physics")]
        let physics = {
            let mut world = PhysicsWorld::new(config.gravity);
            world.set_dt(config.fixed_dt);
            world
        };
        Self {
            scene: Scene::new(),
            next_id: 1,
            viewport: Viewport::new(config.world_width, config.world_height),
            #[cfg(feature = "physics")]
            physics,
            #[cfg(feature = "physics")]
            collision_events: Vec::new(),
        }
    }

    /// Create an EngineContext with a custom gravity vector.
    #[cfg(feature = "physics")]
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self::from_config(&GameConfig {
            gravity,
            ..GameConfig::default()
        })
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Current play-area size. The host updates it on resize.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. Returns the EntityId.
    /// The entity's position is set from the BodyDesc.
    #[cfg(feature = "physics")]
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity.with_pos(desc.position).with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    #[cfg(feature = "physics")]
    pub fn despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.despawn(id) {
            if let Some(body) = &entity.body {
                self.physics.remove_body(body);
            }
        }
    }

    /// Set the linear velocity of an entity's physics body.
    #[cfg(feature = "physics")]
    pub fn set_velocity(&mut self, id: EntityId, vel: Vec2) {
        if let Some(body) = self.body_of(id) {
            self.physics.set_velocity(&body, vel);
        }
    }

    /// Get the linear velocity of an entity's physics body.
    #[cfg(feature = "physics")]
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.scene
            .get(id)
            .and_then(|e| e.body.as_ref())
            .map(|body| self.physics.velocity(body))
            .unwrap_or(Vec2::ZERO)
    }

    /// Switch an entity's body in or out of the simulation.
    #[cfg(feature = "physics")]
    pub fn set_body_enabled(&mut self, id: EntityId, enabled: bool) {
        if let Some(body) = self.body_of(id) {
            self.physics.set_enabled(&body, enabled);
        }
    }

    /// Move an entity and its body to `pos` at rest.
    #[cfg(feature = "physics")]
    pub fn teleport(&mut self, id: EntityId, pos: Vec2) {
        if let Some(entity) = self.scene.get_mut(id) {
            entity.pos = pos;
            entity.rotation = 0.0;
            if let Some(body) = entity.body {
                self.physics.teleport(&body, pos);
            }
        }
    }

    #[cfg(feature = "physics")]
    pub fn set_collider_shape(&mut self, id: EntityId, shape: ColliderDesc) {
        if let Some(body) = self.body_of(id) {
            self.physics.set_collider_shape(&body, shape);
        }
    }

    /// Get collision events from the most recent physics step.
    #[cfg(feature = "physics")]
    pub fn collisions(&self) -> &[CollisionPair] {
        &self.collision_events
    }

    /// Take the collision events from the most recent physics step, leaving
    /// the list empty. Lets a game resolve pairs while mutating the context.
    #[cfg(feature = "physics")]
    pub fn take_collisions(&mut self) -> Vec<CollisionPair> {
        std::mem::take(&mut self.collision_events)
    }

    /// Step the physics simulation and sync positions back to entities.
    /// Called automatically by the game runner after `Game::update()`.
    #[cfg(feature = "physics")]
    pub fn step_physics(&mut self) {
        self.collision_events.clear();
        self.physics.step_into(&mut self.collision_events);

        for entity in self.scene.iter_mut() {
            if !entity.active {
                continue;
            }
            if let Some(body) = &entity.body {
                let (pos, rot) = self.physics.body_position(body);
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }

    #[cfg(feature = "physics")]
    fn body_of(&self, id: EntityId) -> Option<crate::core::physics::PhysicsBody> {
        self.scene.get(id).and_then(|e| e.body)
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut ctx = EngineContext::new();
        let a = ctx.next_id();
        let b = ctx.next_id();
        assert!(b.0 > a.0);
    }

    #[test]
    fn viewport_starts_at_world_size() {
        let ctx = EngineContext::from_config(&GameConfig {
            world_width: 390.0,
            world_height: 844.0,
            ..GameConfig::default()
        });
        assert_eq!(ctx.viewport(), Viewport::new(390.0, 844.0));
    }
}
