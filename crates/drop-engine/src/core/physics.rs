use glam::Vec2;
use rapier2d::prelude::*;
use std::sync::Mutex;

use crate::api::types::EntityId;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
    KinematicVelocityBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicVelocityBased => RigidBodyType::KinematicVelocityBased,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn shared_shape(&self) -> SharedShape {
        match *self {
            ColliderDesc::Ball { radius } => SharedShape::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                SharedShape::cuboid(half_width, half_height)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Collision filter: `memberships` are the groups this collider belongs to,
/// `filter` the groups it may touch. Two colliders interact only when each
/// one's memberships intersect the other's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionGroups {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionGroups {
    pub const fn new(memberships: u32, filter: u32) -> Self {
        Self { memberships, filter }
    }

    fn to_rapier(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.memberships),
            Group::from_bits_truncate(self.filter),
        )
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub collider: ColliderDesc,
    /// Sensors report overlaps but exert no contact forces.
    pub sensor: bool,
    /// `None` interacts with everything.
    pub groups: Option<CollisionGroups>,
}

impl BodyDesc {
    fn with_type(body_type: BodyType, collider: ColliderDesc) -> Self {
        Self {
            body_type,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            fixed_rotation: false,
            collider,
            sensor: false,
            groups: None,
        }
    }

    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Dynamic, collider)
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            gravity_scale: 0.0,
            fixed_rotation: true,
            ..Self::with_type(BodyType::Fixed, collider)
        }
    }

    /// A body moved only by the velocity the game sets on it.
    pub fn kinematic(collider: ColliderDesc) -> Self {
        Self {
            gravity_scale: 0.0,
            fixed_rotation: true,
            ..Self::with_type(BodyType::KinematicVelocityBased, collider)
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = Some(groups);
        self
    }
}

/// Handle pair stored on an Entity, referencing Rapier internals.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// A collision event between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the collision just started, `false` when it ended.
    pub started: bool,
}

impl CollisionPair {
    /// The other party if `id` is one side of the pair.
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.entity_a == id {
            Some(self.entity_b)
        } else if self.entity_b == id {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut guard = self.collisions.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are unused, but the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single, easy-to-use struct.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    /// Y points down, so positive Y gravity pulls bodies toward the ground.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// The gravity vector passed to every step.
    pub fn gravity(&self) -> Vec2 {
        na_to_vec2(&self.gravity)
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for collision lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let mut rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .linvel(vec2_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .user_data(entity_id.0 as u128);
        // A sensor-only dynamic body must still have mass for gravity to act on it.
        if desc.sensor && desc.body_type == BodyType::Dynamic {
            rb = rb.additional_mass(material.density.max(0.1));
        }

        let body_handle = self.bodies.insert(rb.build());

        let mut builder = ColliderBuilder::new(desc.collider.shared_shape())
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(desc.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .active_collision_types(ActiveCollisionTypes::all());
        if let Some(groups) = desc.groups {
            builder = builder.collision_groups(groups.to_rapier());
        }

        let collider_handle =
            self.colliders
                .insert_with_parent(builder.build(), body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation and collect collision events into the provided Vec.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Drain collision events and resolve entity IDs from user_data
        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            // Colliders removed mid-step no longer resolve; drop those events.
            let entity_a = self.collider_to_entity(h1);
            let entity_b = self.collider_to_entity(h2);

            if let (Some(a), Some(b)) = (entity_a, entity_b) {
                collision_events.push(CollisionPair {
                    entity_a: a,
                    entity_b: b,
                    started,
                });
            }
        }
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Disabled bodies keep their handles but leave the simulation:
    /// no integration, no contacts, no events.
    pub fn set_enabled(&mut self, body: &PhysicsBody, enabled: bool) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_enabled(enabled);
        }
    }

    pub fn is_enabled(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .is_some_and(|rb| rb.is_enabled())
    }

    /// Move a body instantly and stop it.
    pub fn teleport(&mut self, body: &PhysicsBody, pos: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec2_to_na(pos), true);
            rb.set_rotation(nalgebra::UnitComplex::new(0.0), true);
            rb.set_linvel(nalgebra::Vector2::zeros(), true);
            rb.set_angvel(0.0, true);
        }
    }

    /// Replace a body's collider shape, keeping material and filters.
    pub fn set_collider_shape(&mut self, body: &PhysicsBody, shape: ColliderDesc) {
        if let Some(collider) = self.colliders.get_mut(body.collider_handle) {
            collider.set_shape(shape.shared_shape());
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Query the collider shape of a physics body.
    /// Returns `None` if the collider no longer exists or has an unsupported shape.
    pub fn collider_shape(&self, body: &PhysicsBody) -> Option<ColliderDesc> {
        let collider = self.colliders.get(body.collider_handle)?;
        let shape = collider.shape();
        if let Some(ball) = shape.as_ball() {
            Some(ColliderDesc::Ball { radius: ball.radius })
        } else {
            shape.as_cuboid().map(|cuboid| ColliderDesc::Cuboid {
                half_width: cuboid.half_extents.x,
                half_height: cuboid.half_extents.y,
            })
        }
    }

    pub fn is_sensor(&self, body: &PhysicsBody) -> bool {
        self.colliders
            .get(body.collider_handle)
            .is_some_and(|c| c.is_sensor())
    }

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn step_n(world: &mut PhysicsWorld, n: usize) -> Vec<CollisionPair> {
        let mut events = Vec::new();
        for _ in 0..n {
            world.step_into(&mut events);
        }
        events
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 }),
            ColliderMaterial::default(),
        );
        assert_eq!(world.body_count(), 1);
        world.remove_body(&body);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_affects_dynamic_body() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 100.0));
        world.set_dt(1.0 / 60.0);

        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 }),
            ColliderMaterial::default(),
        );

        let (initial_pos, _) = world.body_position(&body);
        step_n(&mut world, 10);
        let (new_pos, _) = world.body_position(&body);

        // Positive Y = down
        assert!(
            new_pos.y > initial_pos.y,
            "Body should fall: start={}, end={}",
            initial_pos.y,
            new_pos.y
        );
    }

    #[test]
    fn kinematic_body_moves_with_velocity_only() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 500.0));
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::kinematic(ColliderDesc::Cuboid {
                half_width: 20.0,
                half_height: 20.0,
            })
            .with_position(Vec2::new(100.0, 300.0)),
            ColliderMaterial::default(),
        );

        world.set_velocity(&body, Vec2::new(60.0, 0.0));
        step_n(&mut world, 60);

        let (pos, _) = world.body_position(&body);
        assert!(pos.x > 150.0, "x={}", pos.x);
        assert!((pos.y - 300.0).abs() < 0.001, "gravity must not apply");
    }

    #[test]
    fn fixed_body_does_not_move() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 100.0));
        world.set_dt(1.0 / 60.0);

        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: 100.0,
                half_height: 10.0,
            })
            .with_position(Vec2::new(0.0, 500.0)),
            ColliderMaterial::default(),
        );

        step_n(&mut world, 10);

        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 500.0).abs() < 0.001, "y={}", pos.y);
    }

    #[test]
    fn falling_body_reports_ground_contact() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 400.0));
        world.set_dt(1.0 / 60.0);

        world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 })
                .with_position(Vec2::new(0.0, 0.0)),
            ColliderMaterial::default(),
        );
        world.create_body(
            EntityId(2),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: 200.0,
                half_height: 10.0,
            })
            .with_position(Vec2::new(0.0, 100.0)),
            ColliderMaterial::default(),
        );

        let events = step_n(&mut world, 120);
        let started = events.iter().find(|e| e.started).expect("a contact");
        assert_eq!(started.other(EntityId(1)), Some(EntityId(2)));
    }

    #[test]
    fn sensor_passes_through_but_reports_overlap() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 400.0));
        world.set_dt(1.0 / 60.0);

        let ball = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 }).with_sensor(true),
            ColliderMaterial::default(),
        );
        world.create_body(
            EntityId(2),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: 200.0,
                half_height: 10.0,
            })
            .with_position(Vec2::new(0.0, 100.0)),
            ColliderMaterial::default(),
        );
        assert!(world.is_sensor(&ball));

        let events = step_n(&mut world, 120);
        assert!(events.iter().any(|e| e.started));
        let (pos, _) = world.body_position(&ball);
        assert!(pos.y > 120.0, "sensor should fall through: y={}", pos.y);
    }

    #[test]
    fn disjoint_groups_never_touch() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 400.0));
        world.set_dt(1.0 / 60.0);

        world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 })
                .with_groups(CollisionGroups::new(0b01, 0b01)),
            ColliderMaterial::default(),
        );
        world.create_body(
            EntityId(2),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: 200.0,
                half_height: 10.0,
            })
            .with_position(Vec2::new(0.0, 100.0))
            .with_groups(CollisionGroups::new(0b10, 0b10)),
            ColliderMaterial::default(),
        );

        assert!(step_n(&mut world, 120).is_empty());
    }

    #[test]
    fn disabled_body_is_frozen_until_teleported_back() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 400.0));
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 }),
            ColliderMaterial::default(),
        );

        world.set_enabled(&body, false);
        assert!(!world.is_enabled(&body));
        step_n(&mut world, 30);
        assert_eq!(world.body_position(&body).0, Vec2::ZERO);

        world.teleport(&body, Vec2::new(50.0, -20.0));
        world.set_enabled(&body, true);
        assert_eq!(world.body_position(&body).0, Vec2::new(50.0, -20.0));
        assert_eq!(world.velocity(&body), Vec2::ZERO);

        step_n(&mut world, 10);
        assert!(world.body_position(&body).0.y > -20.0);
    }

    #[test]
    fn set_velocity_directly() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 }),
            ColliderMaterial::default(),
        );

        world.set_velocity(&body, Vec2::new(50.0, -30.0));
        let vel = world.velocity(&body);
        assert!((vel.x - 50.0).abs() < 0.001);
        assert!((vel.y - (-30.0)).abs() < 0.001);
    }

    #[test]
    fn builder_pattern() {
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 })
            .with_position(Vec2::new(10.0, 20.0))
            .with_velocity(Vec2::new(1.0, 2.0))
            .with_fixed_rotation(true)
            .with_sensor(true)
            .with_groups(CollisionGroups::new(2, 5));

        assert_eq!(desc.body_type, BodyType::Dynamic);
        assert_eq!(desc.position, Vec2::new(10.0, 20.0));
        assert_eq!(desc.velocity, Vec2::new(1.0, 2.0));
        assert!((desc.gravity_scale - 1.0).abs() < 0.001);
        assert!(desc.fixed_rotation);
        assert!(desc.sensor);
        assert_eq!(desc.groups, Some(CollisionGroups::new(2, 5)));
    }

    #[test]
    fn collider_shape_can_be_replaced() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 15.0 }),
            ColliderMaterial::default(),
        );
        assert_eq!(
            world.collider_shape(&body),
            Some(ColliderDesc::Ball { radius: 15.0 })
        );

        world.set_collider_shape(
            &body,
            ColliderDesc::Cuboid {
                half_width: 50.0,
                half_height: 10.0,
            },
        );
        match world.collider_shape(&body) {
            Some(ColliderDesc::Cuboid { half_width, half_height }) => {
                assert!((half_width - 50.0).abs() < 0.001);
                assert!((half_height - 10.0).abs() < 0.001);
            }
            other => panic!("expected Cuboid, got {:?}", other),
        }
    }

    #[test]
    fn collision_pair_other() {
        let pair = CollisionPair {
            entity_a: EntityId(1),
            entity_b: EntityId(2),
            started: true,
        };
        assert_eq!(pair.other(EntityId(2)), Some(EntityId(1)));
        assert_eq!(pair.other(EntityId(3)), None);
    }
}
