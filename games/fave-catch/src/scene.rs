//! The catcher scene: spawning, steering, collision scoring and the round
//! countdown, as a plain state machine driven by the engine runner.

use std::rc::Rc;

use glam::Vec2;

use drop_engine::{
    keys, AnimationClip, Animator, BodyDesc, ColliderDesc, ColliderMaterial, CollisionGroups,
    CyclingSelector, EngineContext, Entity, EntityId, EntityPool, EventChannel, Game, GameConfig,
    InputQueue, PoolBlueprint, RandomSource, SpriteComponent, SpriteRegistry, TimerId, Timers,
    Viewport, WHITE,
};

use crate::catalog::{Catalog, ItemKey};
use crate::config::{CatchConfig, StartError, Tuning, TuningError, ValidatedConfig};
use crate::events::{CatchEvent, SceneReady};
use crate::handle::{SceneControl, SceneHandle};
use crate::layout::Layout;
use crate::session::{display_seconds, Category, Collected, Hud, Phase, Stats};

/// Fixed simulation step.
pub const FIXED_DT: f32 = 1.0 / 60.0;

const PLAYER_GROUP: u32 = 0b001;
const ITEM_GROUP: u32 = 0b010;
const GROUND_GROUP: u32 = 0b100;

const PLAYER_GROUPS: CollisionGroups = CollisionGroups::new(PLAYER_GROUP, ITEM_GROUP);
const ITEM_GROUPS: CollisionGroups = CollisionGroups::new(ITEM_GROUP, PLAYER_GROUP | GROUND_GROUP);
const GROUND_GROUPS: CollisionGroups = CollisionGroups::new(GROUND_GROUP, ITEM_GROUP);

const CAUGHT_TINT: [f32; 3] = [0.55, 1.0, 0.55];
const HIT_TINT: [f32; 3] = [1.0, 0.45, 0.45];

const STANCE_IDLE: &str = "idle";
const STANCE_LEFT: &str = "left";
const STANCE_RIGHT: &str = "right";

/// Outcome of resolving one collision pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// The player touched an active item.
    Caught(Category),
    /// An active item reached the ground.
    Lost,
    /// Stale or irrelevant pair.
    Ignored,
}

/// One item category's spawn machinery.
#[derive(Debug)]
struct Lane {
    category: Category,
    selector: CyclingSelector<ItemKey>,
    pool: EntityPool,
    timer: TimerId,
}

#[derive(Debug)]
struct Round {
    liked: Lane,
    disliked: Lane,
    countdown: TimerId,
}

impl Round {
    fn lane(&self, category: Category) -> &Lane {
        match category {
            Category::Liked => &self.liked,
            Category::Disliked => &self.disliked,
        }
    }

    fn lane_mut(&mut self, category: Category) -> &mut Lane {
        match category {
            Category::Liked => &mut self.liked,
            Category::Disliked => &mut self.disliked,
        }
    }

    /// Category of `id` if it is currently an active item.
    fn active_category(&self, id: EntityId) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|&c| self.lane(c).pool.is_active(id))
    }

    fn lane_for_timer(&self, timer: TimerId) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|&c| self.lane(c).timer == timer)
    }
}

pub struct CatchScene {
    control: Rc<SceneControl>,
    events: Rc<EventChannel<CatchEvent>>,
    app: Rc<EventChannel<SceneReady>>,
    tuning: Tuning,
    sprites: SpriteRegistry,
    rng: RandomSource,
    timers: Timers,
    fired: Vec<TimerId>,
    round: Option<Round>,
    cue: Option<TimerId>,
    player: Option<EntityId>,
    ground: Option<EntityId>,
    layout: Layout,
    last_viewport: Option<Viewport>,
    score: i64,
    final_score: Option<i64>,
    liked: Collected,
    disliked: Collected,
    stats: Stats,
}

impl CatchScene {
    /// `events` carries outward notifications; `app` receives the
    /// scene-ready signal once `init` has run.
    pub fn new(
        catalog: Rc<Catalog>,
        sprites: SpriteRegistry,
        rng: RandomSource,
        events: Rc<EventChannel<CatchEvent>>,
        app: Rc<EventChannel<SceneReady>>,
    ) -> Self {
        let tuning = Tuning::default();
        let layout = Layout::from_viewport(Viewport::new(390.0, 844.0), &tuning);
        Self {
            control: Rc::new(SceneControl::new(catalog)),
            events,
            app,
            tuning,
            sprites,
            rng,
            timers: Timers::new(),
            fired: Vec::new(),
            round: None,
            cue: None,
            player: None,
            ground: None,
            layout,
            last_viewport: None,
            score: 0,
            final_score: None,
            liked: Collected::default(),
            disliked: Collected::default(),
            stats: Stats::default(),
        }
    }

    /// Replace the gameplay constants. Only meaningful before `init`.
    /// Rejects non-positive intervals and durations.
    pub fn with_tuning(mut self, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        self.tuning = tuning;
        Ok(self)
    }

    /// A handle the host can keep to issue the start command.
    pub fn handle(&self) -> SceneHandle {
        SceneHandle::new(Rc::clone(&self.control))
    }

    pub fn phase(&self) -> Phase {
        self.control.phase()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Score frozen when the round ended.
    pub fn final_score(&self) -> Option<i64> {
        self.final_score
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn collected_liked(&self) -> &[ItemKey] {
        self.liked.as_slice()
    }

    pub fn collected_disliked(&self) -> &[ItemKey] {
        self.disliked.as_slice()
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn ground_id(&self) -> Option<EntityId> {
        self.ground
    }

    /// Active item ids of one category, in spawn order.
    pub fn active_items(&self, category: Category) -> &[EntityId] {
        match &self.round {
            Some(round) => round.lane(category).pool.active(),
            None => &[],
        }
    }

    /// Timers still scheduled: spawn lanes, countdown and cue.
    pub fn pending_timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Seconds left on the countdown, unrounded.
    pub fn remaining_seconds(&self) -> f32 {
        match (self.phase(), &self.round) {
            (Phase::Idle, _) => self.tuning.round_seconds,
            (Phase::Running, Some(round)) => self.timers.remaining(round.countdown).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            seconds_left: display_seconds(self.remaining_seconds()),
            phase: self.phase(),
        }
    }

    /// Validate `config` and start the round right away.
    pub fn start_game(
        &mut self,
        ctx: &mut EngineContext,
        config: &CatchConfig,
    ) -> Result<(), StartError> {
        let phase = self.phase();
        if phase != Phase::Idle {
            return Err(StartError::NotIdle(phase));
        }
        let validated = config.validate(self.control.catalog())?;
        self.control.discard_pending();
        self.begin(ctx, validated)
    }

    fn begin(&mut self, ctx: &mut EngineContext, config: ValidatedConfig) -> Result<(), StartError> {
        let liked = CyclingSelector::new(config.liked(), &mut self.rng)?;
        let disliked = CyclingSelector::new(config.disliked(), &mut self.rng)?;

        let liked = self.open_lane(ctx, Category::Liked, liked);
        let disliked = self.open_lane(ctx, Category::Disliked, disliked);
        let countdown = self.timers.add_once(self.tuning.round_seconds);
        self.round = Some(Round {
            liked,
            disliked,
            countdown,
        });
        self.control.set_phase(Phase::Running);

        log::info!(
            "round started: {} liked, {} disliked, {}s",
            config.liked().len(),
            config.disliked().len(),
            self.tuning.round_seconds
        );
        Ok(())
    }

    fn open_lane(
        &mut self,
        ctx: &mut EngineContext,
        category: Category,
        selector: CyclingSelector<ItemKey>,
    ) -> Lane {
        let blueprint = PoolBlueprint::new(category.tag(), Vec2::splat(self.layout.item_size))
            .with_sensor(category == Category::Liked)
            .with_groups(ITEM_GROUPS)
            .with_material(ColliderMaterial {
                restitution: 0.0,
                ..ColliderMaterial::default()
            })
            .with_capacity(self.tuning.pool_capacity);
        let interval = match category {
            Category::Liked => self.tuning.liked_interval,
            Category::Disliked => self.tuning.disliked_interval,
        };
        Lane {
            category,
            selector,
            pool: EntityPool::new(ctx, blueprint),
            timer: self.timers.add_repeating(interval),
        }
    }

    /// Spawn the next item of `category` at a random x above the top edge.
    pub fn spawn(&mut self, ctx: &mut EngineContext, category: Category) -> Option<EntityId> {
        if self.phase() != Phase::Running {
            return None;
        }
        let x = self.rng.random_int(0, self.layout.width.floor() as i64) as f32;
        let round = self.round.as_mut()?;
        let lane = round.lane_mut(category);
        let key = lane.selector.next(&mut self.rng);

        let Some(sprite) = self.sprites.get(key.as_str()).cloned() else {
            log::warn!("no sprite for item '{}'; spawn skipped", key);
            return None;
        };
        let id = lane
            .pool
            .acquire(ctx, Vec2::new(x, self.layout.spawn_y), sprite, key.as_str());
        self.stats.spawned += 1;
        log::debug!("spawned {} '{}' as {} at x={}", lane.category.tag(), key, id, x);
        Some(id)
    }

    /// Apply one collision pair. Pairs whose item is no longer active, or
    /// that arrive outside a running round, are ignored.
    pub fn resolve_contact(&mut self, ctx: &mut EngineContext, a: EntityId, b: EntityId) -> Contact {
        if self.phase() != Phase::Running {
            return Contact::Ignored;
        }
        let Some(round) = &self.round else {
            return Contact::Ignored;
        };

        for (toucher, item) in [(a, b), (b, a)] {
            let Some(category) = round.active_category(item) else {
                continue;
            };
            if Some(toucher) == self.player {
                self.catch_item(ctx, item, category);
                return Contact::Caught(category);
            }
            if Some(toucher) == self.ground {
                self.release_item(ctx, item, category);
                self.stats.dropped += 1;
                return Contact::Lost;
            }
        }
        Contact::Ignored
    }

    fn catch_item(&mut self, ctx: &mut EngineContext, item: EntityId, category: Category) {
        let key = ctx.scene.get(item).map(|e| ItemKey::new(e.name.as_str()));
        self.release_item(ctx, item, category);

        let (points, tint) = match category {
            Category::Liked => {
                self.stats.liked_caught += 1;
                (self.tuning.liked_points, CAUGHT_TINT)
            }
            Category::Disliked => {
                self.stats.disliked_hit += 1;
                (self.tuning.disliked_points, HIT_TINT)
            }
        };
        self.score += points;
        self.show_cue(ctx, tint);

        let Some(key) = key else {
            return;
        };
        log::debug!("{} '{}' caught; score {}", category.tag(), key, self.score);
        match category {
            Category::Liked => {
                if self.liked.insert(key) {
                    self.events
                        .publish(&CatchEvent::ItemList(self.liked.as_slice().to_vec()));
                }
            }
            Category::Disliked => {
                if self.disliked.insert(key) {
                    self.events
                        .publish(&CatchEvent::Dislikes(self.disliked.as_slice().to_vec()));
                }
            }
        }
    }

    fn release_item(&mut self, ctx: &mut EngineContext, item: EntityId, category: Category) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if let Err(e) = round.lane_mut(category).pool.release(ctx, item) {
            log::warn!("{} release ignored: {}", category.tag(), e);
        }
    }

    fn show_cue(&mut self, ctx: &mut EngineContext, tint: [f32; 3]) {
        self.set_player_tint(ctx, tint);
        if let Some(previous) = self.cue.take() {
            self.timers.destroy(previous);
        }
        self.cue = Some(self.timers.add_once(self.tuning.cue_seconds));
    }

    fn set_player_tint(&self, ctx: &mut EngineContext, tint: [f32; 3]) {
        let sprite = self
            .player
            .and_then(|id| ctx.scene.get_mut(id))
            .and_then(|e| e.sprite.as_mut());
        if let Some(sprite) = sprite {
            sprite.tint = tint;
        }
    }

    fn run_timers(&mut self, ctx: &mut EngineContext) {
        let mut fired = std::mem::take(&mut self.fired);
        fired.clear();
        self.timers.tick(FIXED_DT, &mut fired);
        for &id in &fired {
            if self.phase() != Phase::Running {
                break;
            }
            self.on_timer(ctx, id);
        }
        self.fired = fired;
    }

    fn on_timer(&mut self, ctx: &mut EngineContext, id: TimerId) {
        if self.cue == Some(id) {
            self.cue = None;
            self.set_player_tint(ctx, WHITE);
            return;
        }
        let Some(round) = &self.round else {
            return;
        };
        if id == round.countdown {
            self.finish(ctx);
        } else if let Some(category) = round.lane_for_timer(id) {
            self.spawn(ctx, category);
        }
    }

    /// End the round: freeze the player, cancel every timer, flush the
    /// pools and announce the final score.
    fn finish(&mut self, ctx: &mut EngineContext) {
        if let Some(player) = self.player {
            if let Some(animation) = ctx.scene.get_mut(player).and_then(|e| e.animation.as_mut()) {
                animation.halt();
            }
            ctx.set_velocity(player, Vec2::ZERO);
        }
        if let Some(cue) = self.cue.take() {
            self.timers.destroy(cue);
        }
        self.set_player_tint(ctx, WHITE);

        let mut flushed = 0;
        if let Some(round) = self.round.as_mut() {
            self.timers.destroy(round.countdown);
            for category in Category::ALL {
                let lane = round.lane_mut(category);
                self.timers.destroy(lane.timer);
                flushed += lane.pool.release_all(ctx);
            }
        }

        self.control.set_phase(Phase::GameOver);
        self.final_score = Some(self.score);
        log::info!(
            "game over: score {} ({} caught, {} hit, {} flushed)",
            self.score,
            self.stats.liked_caught,
            self.stats.disliked_hit,
            flushed
        );
        self.events
            .publish(&CatchEvent::GameOver { score: self.score });
    }

    /// Recompute the layout when the viewport changed since the last tick.
    fn adapt_viewport(&mut self, ctx: &mut EngineContext) {
        let viewport = ctx.viewport();
        if self.last_viewport == Some(viewport) {
            return;
        }
        self.last_viewport = Some(viewport);
        self.layout = Layout::from_viewport(viewport, &self.tuning);
        let layout = self.layout;

        if let Some(ground) = self.ground {
            ctx.set_collider_shape(ground, half_extents(layout.ground_size));
            ctx.teleport(ground, layout.ground_center);
            if let Some(entity) = ctx.scene.get_mut(ground) {
                entity.scale = layout.ground_size;
            }
        }
        if let Some(player) = self.player {
            let x = ctx.scene.get(player).map_or(layout.mid_x(), |e| e.pos.x);
            let (lo, hi) = layout.player_x_range();
            ctx.set_collider_shape(player, half_extents(layout.player_size));
            ctx.teleport(player, Vec2::new(x.clamp(lo, hi), layout.player_y));
            if let Some(entity) = ctx.scene.get_mut(player) {
                entity.scale = layout.player_size;
            }
        }
        if let Some(round) = self.round.as_mut() {
            for category in Category::ALL {
                round
                    .lane_mut(category)
                    .pool
                    .set_display_size(Vec2::splat(layout.item_size));
            }
        }
        log::debug!("layout for {}x{}", layout.width, layout.height);
    }

    /// Keys first, then a held pointer overrides them for this tick.
    fn steer(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        let Some(player) = self.player else {
            return;
        };
        let mut direction = 0.0_f32;
        if input.is_key_down(keys::ARROW_LEFT) || input.is_key_down(keys::A) {
            direction = -1.0;
        }
        if input.is_key_down(keys::ARROW_RIGHT) || input.is_key_down(keys::D) {
            direction = 1.0;
        }
        if let Some(pointer) = input.pointer_held() {
            direction = if pointer.x < self.layout.mid_x() { -1.0 } else { 1.0 };
        }

        let x = ctx.scene.get(player).map_or(self.layout.mid_x(), |e| e.pos.x);
        let (lo, hi) = self.layout.player_x_range();
        if x < lo || x > hi {
            ctx.teleport(player, Vec2::new(x.clamp(lo, hi), self.layout.player_y));
        }
        if (direction < 0.0 && x <= lo) || (direction > 0.0 && x >= hi) {
            direction = 0.0;
        }
        ctx.set_velocity(player, Vec2::new(direction * self.tuning.player_speed, 0.0));

        let stance = if direction < 0.0 {
            STANCE_LEFT
        } else if direction > 0.0 {
            STANCE_RIGHT
        } else {
            STANCE_IDLE
        };
        if let Some(animation) = ctx.scene.get_mut(player).and_then(|e| e.animation.as_mut()) {
            animation.play(stance);
        }
    }

    fn spawn_fixtures(&mut self, ctx: &mut EngineContext) {
        let layout = self.layout;

        let ground = ctx.next_id();
        let mut entity = Entity::new(ground)
            .with_tag("ground")
            .with_scale(layout.ground_size);
        if let Some(sprite) = self.sprites.get("ground") {
            entity = entity.with_sprite(sprite.clone());
        }
        ctx.spawn_with_body(
            entity,
            BodyDesc::fixed(half_extents(layout.ground_size))
                .with_position(layout.ground_center)
                .with_groups(GROUND_GROUPS),
            ColliderMaterial::default(),
        );
        self.ground = Some(ground);

        let player = ctx.next_id();
        let stances = Animator::new(STANCE_IDLE, AnimationClip::still(0.0, 0.0))
            .with_clip(STANCE_LEFT, AnimationClip::strip(1.0, 0.0, 4, 10.0))
            .with_clip(STANCE_RIGHT, AnimationClip::strip(2.0, 0.0, 4, 10.0));
        let sprite = self
            .sprites
            .get("player")
            .cloned()
            .unwrap_or_else(SpriteComponent::default);
        ctx.spawn_with_body(
            Entity::new(player)
                .with_tag("player")
                .with_scale(layout.player_size)
                .with_sprite(sprite)
                .with_animation(stances),
            BodyDesc::kinematic(half_extents(layout.player_size))
                .with_position(Vec2::new(layout.mid_x(), layout.player_y))
                .with_groups(PLAYER_GROUPS),
            ColliderMaterial::default(),
        );
        self.player = Some(player);
    }
}

fn half_extents(size: Vec2) -> ColliderDesc {
    ColliderDesc::Cuboid {
        half_width: size.x * 0.5,
        half_height: size.y * 0.5,
    }
}

impl Game for CatchScene {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: FIXED_DT,
            world_width: 390.0,
            world_height: 844.0,
            max_instances: 256,
            gravity: Vec2::new(0.0, self.tuning.fall_gravity),
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        let viewport = ctx.viewport();
        self.layout = Layout::from_viewport(viewport, &self.tuning);
        self.last_viewport = Some(viewport);
        self.spawn_fixtures(ctx);

        log::info!("catch scene ready ({}x{})", viewport.width, viewport.height);
        self.app.publish(&SceneReady {
            handle: self.handle(),
        });
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        if self.phase() == Phase::Idle {
            self.adapt_viewport(ctx);
            if let Some(config) = self.control.take_pending() {
                if let Err(e) = self.begin(ctx, config) {
                    log::warn!("pending start failed: {}", e);
                }
            }
        }
        if self.phase() != Phase::Running {
            ctx.take_collisions();
            return;
        }

        for pair in ctx.take_collisions() {
            if pair.started {
                self.resolve_contact(ctx, pair.entity_a, pair.entity_b);
            }
        }
        self.run_timers(ctx);
        if self.phase() != Phase::Running {
            return;
        }
        self.adapt_viewport(ctx);
        self.steer(ctx, input);
    }

    fn teardown(&mut self, ctx: &mut EngineContext) {
        if let Some(round) = self.round.take() {
            round.liked.pool.destroy_all(ctx);
            round.disliked.pool.destroy_all(ctx);
        }
        self.liked.clear();
        self.disliked.clear();
        self.timers.clear();
        self.cue = None;
        self.control.discard_pending();
        for id in [self.player.take(), self.ground.take()].into_iter().flatten() {
            ctx.despawn(id);
        }
        log::info!("catch scene torn down");
    }
}

impl std::fmt::Debug for CatchScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatchScene")
            .field("phase", &self.phase())
            .field("score", &self.score)
            .field("timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}
