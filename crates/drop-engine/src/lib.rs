pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;
pub mod events;
pub mod random;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{EntityId, Viewport};
pub use components::animation::{AnimationClip, Animator};
pub use components::entity::Entity;
pub use components::sprite::{SpriteComponent, AtlasId, WHITE};
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use core::timer::{TimerId, TimerMode, Timers};
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use input::queue::{keys, InputEvent, InputQueue};
pub use assets::manifest::AssetManifest;
pub use assets::registry::SpriteRegistry;
pub use bridge::protocol::ProtocolLayout;
pub use events::{EventChannel, ListenerId, Subscriptions, Topic};
pub use random::{CyclingSelector, RandomError, RandomSource, SelectorError};
pub use systems::animation::tick_animations;
pub use systems::render::build_render_buffer;

#[cfg(feature = "physics")]
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial, CollisionGroups, CollisionPair,
};
#[cfg(feature = "physics")]
pub use core::pool::{EntityPool, PoolBlueprint, PoolError};
