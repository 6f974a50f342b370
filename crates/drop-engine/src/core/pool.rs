//! Reusable entity pool.
//!
//! Every entity a pool constructs lives in the scene for the pool's whole
//! lifetime. Between uses it is switched off (inactive, hidden, body
//! disabled) and parked on the free list. `acquire` never fails: an empty
//! free list grows the pool by one.

use std::collections::HashMap;

use glam::Vec2;
use thiserror::Error;

use crate::api::game::EngineContext;
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::components::sprite::SpriteComponent;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, CollisionGroups};

/// How a pool builds its entities.
#[derive(Debug, Clone)]
pub struct PoolBlueprint {
    /// Category tag written to every entity on acquire.
    pub tag: String,
    /// Display size in world units; the collider follows it.
    pub size: Vec2,
    pub sensor: bool,
    pub groups: Option<CollisionGroups>,
    pub material: ColliderMaterial,
    /// Entities constructed up front.
    pub capacity: usize,
}

impl PoolBlueprint {
    pub fn new(tag: impl Into<String>, size: Vec2) -> Self {
        Self {
            tag: tag.into(),
            size,
            sensor: false,
            groups: None,
            material: ColliderMaterial::default(),
            capacity: 8,
        }
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = Some(groups);
        self
    }

    pub fn with_material(mut self, material: ColliderMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Circle inscribed in the display box.
    fn collider(&self) -> ColliderDesc {
        let half = self.size * 0.5;
        ColliderDesc::Ball {
            radius: half.x.min(half.y).max(0.5),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("entity {0} does not belong to this pool")]
    NotOwned(EntityId),
    #[error("entity {0} is already free")]
    NotActive(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    Active,
}

/// A free list and an active list over entities the pool constructed.
/// Each owned id is in exactly one of the two.
#[derive(Debug)]
pub struct EntityPool {
    blueprint: PoolBlueprint,
    slots: HashMap<EntityId, Slot>,
    free: Vec<EntityId>,
    active: Vec<EntityId>,
}

impl EntityPool {
    /// Construct `blueprint.capacity` parked entities.
    pub fn new(ctx: &mut EngineContext, blueprint: PoolBlueprint) -> Self {
        let mut pool = Self {
            slots: HashMap::with_capacity(blueprint.capacity),
            free: Vec::with_capacity(blueprint.capacity),
            active: Vec::with_capacity(blueprint.capacity),
            blueprint,
        };
        for _ in 0..pool.blueprint.capacity {
            let id = pool.construct(ctx);
            pool.free.push(id);
        }
        pool
    }

    /// Take a parked entity (or build one), place it at `pos` showing
    /// `sprite`, and switch it on. `name` is stored on the entity.
    pub fn acquire(
        &mut self,
        ctx: &mut EngineContext,
        pos: Vec2,
        sprite: SpriteComponent,
        name: &str,
    ) -> EntityId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = self.construct(ctx);
                log::debug!(
                    "pool '{}' grew to {} entities",
                    self.blueprint.tag,
                    self.slots.len()
                );
                id
            }
        };

        if let Some(entity) = ctx.scene.get_mut(id) {
            entity.tag.clone_from(&self.blueprint.tag);
            entity.name.clear();
            entity.name.push_str(name);
            entity.scale = self.blueprint.size;
            entity.sprite = Some(sprite);
            entity.active = true;
            entity.visible = true;
        }
        ctx.set_collider_shape(id, self.blueprint.collider());
        ctx.teleport(id, pos);
        ctx.set_body_enabled(id, true);

        self.slots.insert(id, Slot::Active);
        self.active.push(id);
        id
    }

    /// Switch an entity off and park it on the free list.
    pub fn release(&mut self, ctx: &mut EngineContext, id: EntityId) -> Result<(), PoolError> {
        match self.slots.get(&id) {
            None => return Err(PoolError::NotOwned(id)),
            Some(Slot::Free) => return Err(PoolError::NotActive(id)),
            Some(Slot::Active) => {}
        }

        if let Some(entity) = ctx.scene.get_mut(id) {
            entity.active = false;
            entity.visible = false;
        }
        ctx.set_body_enabled(id, false);

        self.slots.insert(id, Slot::Free);
        self.active.retain(|&a| a != id);
        self.free.push(id);
        Ok(())
    }

    /// Release every active entity. Returns how many were released.
    pub fn release_all(&mut self, ctx: &mut EngineContext) -> usize {
        let flushed = std::mem::take(&mut self.active);
        for &id in &flushed {
            if let Some(entity) = ctx.scene.get_mut(id) {
                entity.active = false;
                entity.visible = false;
            }
            ctx.set_body_enabled(id, false);
            self.slots.insert(id, Slot::Free);
        }
        self.free.extend_from_slice(&flushed);
        flushed.len()
    }

    /// Active ids in acquisition order.
    pub fn active(&self) -> &[EntityId] {
        &self.active
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Entities built so far, free and active.
    pub fn constructed(&self) -> usize {
        self.slots.len()
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.slots.get(&id) == Some(&Slot::Active)
    }

    pub fn owns(&self, id: EntityId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn tag(&self) -> &str {
        &self.blueprint.tag
    }

    pub fn display_size(&self) -> Vec2 {
        self.blueprint.size
    }

    /// New display size for later acquisitions. Active entities keep theirs.
    pub fn set_display_size(&mut self, size: Vec2) {
        self.blueprint.size = size;
    }

    /// Despawn every owned entity and its body.
    pub fn destroy_all(self, ctx: &mut EngineContext) {
        for &id in self.slots.keys() {
            ctx.despawn(id);
        }
        log::debug!(
            "pool '{}' destroyed ({} entities)",
            self.blueprint.tag,
            self.slots.len()
        );
    }

    fn construct(&mut self, ctx: &mut EngineContext) -> EntityId {
        let id = ctx.next_id();
        let mut desc = BodyDesc::dynamic(self.blueprint.collider())
            .with_fixed_rotation(true)
            .with_sensor(self.blueprint.sensor);
        if let Some(groups) = self.blueprint.groups {
            desc = desc.with_groups(groups);
        }

        let entity = Entity::new(id)
            .with_tag(self.blueprint.tag.clone())
            .with_scale(self.blueprint.size)
            .dormant();
        ctx.spawn_with_body(entity, desc, self.blueprint.material);
        ctx.set_body_enabled(id, false);

        self.slots.insert(id, Slot::Free);
        id
    }
}
