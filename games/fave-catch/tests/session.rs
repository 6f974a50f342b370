//! Integration tests driving a whole catch round through the engine context.

use std::cell::RefCell;
use std::rc::Rc;

use drop_engine::{
    keys, tick_animations, EngineContext, EventChannel, Game, InputEvent, InputQueue,
    RandomSource, Viewport,
};
use drop_web::GameRunner;
use fave_catch::catalog::{builtin_sprites, Catalog};
use fave_catch::config::{CatchConfig, StartError, Tuning, TuningError};
use fave_catch::events::{CatchEvent, SceneReady, GAME_OVER, UPDATE_DISLIKES, UPDATE_ITEM_LIST};
use fave_catch::handle::SceneHandle;
use fave_catch::scene::{CatchScene, Contact, FIXED_DT};
use fave_catch::session::{Category, Phase};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

// -- helpers ----------------------------------------------------------------

type Log = Rc<RefCell<Vec<CatchEvent>>>;

struct Harness {
    scene: CatchScene,
    ctx: EngineContext,
    input: InputQueue,
    events: Log,
    ready: Rc<RefCell<Vec<SceneHandle>>>,
}

fn record(events: &EventChannel<CatchEvent>) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    for topic in [GAME_OVER, UPDATE_ITEM_LIST, UPDATE_DISLIKES] {
        let sink = Rc::clone(&log);
        events.subscribe(topic, move |e: &CatchEvent| sink.borrow_mut().push(e.clone()));
    }
    log
}

fn build(tuning: Tuning, seed: u64) -> (CatchScene, Log, Rc<RefCell<Vec<SceneHandle>>>) {
    let events = Rc::new(EventChannel::new());
    let app = Rc::new(EventChannel::new());
    let log = record(&events);

    let ready = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ready);
    app.subscribe("scene-ready", move |r: &SceneReady| {
        sink.borrow_mut().push(r.handle.clone())
    });

    let scene = CatchScene::new(
        Rc::new(Catalog::builtin().unwrap()),
        builtin_sprites().unwrap(),
        RandomSource::new(StdRng::seed_from_u64(seed)),
        events,
        app,
    )
    .with_tuning(tuning)
    .unwrap();
    (scene, log, ready)
}

fn harness(tuning: Tuning, seed: u64) -> Harness {
    let (mut scene, events, ready) = build(tuning, seed);
    let mut ctx = EngineContext::from_config(&scene.config());
    scene.init(&mut ctx);
    Harness {
        scene,
        ctx,
        input: InputQueue::new(),
        events,
        ready,
    }
}

impl Harness {
    /// One fixed step, in the order the runner uses.
    fn step(&mut self) {
        self.scene.update(&mut self.ctx, &self.input);
        self.ctx.step_physics();
        tick_animations(&mut self.ctx.scene, FIXED_DT);
    }

    fn start(&mut self, liked: &[&str], disliked: &[&str]) {
        self.scene
            .start_game(&mut self.ctx, &CatchConfig::new(liked.to_vec(), disliked.to_vec()))
            .unwrap();
    }

    fn player_x(&self) -> f32 {
        let id = self.scene.player_id().unwrap();
        self.ctx.scene.get(id).unwrap().pos.x
    }

    fn stance(&self) -> &'static str {
        let id = self.scene.player_id().unwrap();
        self.ctx
            .scene
            .get(id)
            .unwrap()
            .animation
            .as_ref()
            .unwrap()
            .current()
    }

    fn item_name(&self, id: drop_engine::EntityId) -> String {
        self.ctx.scene.get(id).unwrap().name.clone()
    }

    /// Step until the scene's tallies change or a second has passed.
    fn step_until_resolved(&mut self) -> bool {
        let before = self.scene.stats();
        for _ in 0..60 {
            self.step();
            if self.scene.stats() != before {
                return true;
            }
        }
        false
    }

    /// Put `item` just above the player's top edge.
    fn drop_on_player(&mut self, item: drop_engine::EntityId) {
        let layout = *self.scene.layout();
        let above = layout.player_y - layout.player_size.y * 0.5 - layout.item_size;
        let x = self.player_x();
        self.ctx.teleport(item, Vec2::new(x, above));
    }

    /// Put `item` at the left edge, just above the ground.
    fn drop_on_ground(&mut self, item: drop_engine::EntityId) {
        let layout = *self.scene.layout();
        let above = layout.ground_center.y - layout.ground_size.y * 0.5 - layout.item_size;
        self.ctx.teleport(item, Vec2::new(10.0, above));
    }

    fn game_overs(&self) -> Vec<i64> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                CatchEvent::GameOver { score } => Some(*score),
                _ => None,
            })
            .collect()
    }
}

/// No timed spawns, so only items a test places are in play.
fn quiet_lanes() -> Tuning {
    Tuning {
        liked_interval: 100.0,
        disliked_interval: 100.0,
        ..Tuning::default()
    }
}

fn short_round(seconds: f32) -> Tuning {
    Tuning {
        round_seconds: seconds,
        ..Tuning::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn full_session_scores_every_contact_and_ends_once() {
    let mut h = harness(short_round(5.0), 7);
    h.start(&["apple", "banana", "pizza"], &["broccoli", "taco"]);
    assert_eq!(h.scene.phase(), Phase::Running);

    let mut ticks = 0;
    while h.scene.phase() == Phase::Running {
        h.step();
        ticks += 1;
        assert!(ticks < 60 * 10, "round never ended");
    }

    let stats = h.scene.stats();
    let tuning = h.scene.tuning().clone();
    assert!(stats.spawned >= 5);
    assert!(stats.liked_caught + stats.disliked_hit + stats.dropped > 0);
    assert_eq!(
        h.scene.score(),
        tuning.liked_points * stats.liked_caught as i64
            + tuning.disliked_points * stats.disliked_hit as i64
    );

    assert_eq!(h.scene.phase(), Phase::GameOver);
    assert_eq!(h.game_overs(), vec![h.scene.score()]);
    assert_eq!(h.scene.final_score(), Some(h.scene.score()));
    assert_eq!(h.scene.pending_timer_count(), 0);
    assert!(h.scene.active_items(Category::Liked).is_empty());
    assert!(h.scene.active_items(Category::Disliked).is_empty());
    assert_eq!(h.scene.hud().seconds_left, 0);

    // Nothing moves or fires after the round.
    for _ in 0..120 {
        h.step();
    }
    assert_eq!(h.game_overs().len(), 1);
    assert_eq!(h.scene.stats(), stats);
}

#[test]
fn collection_is_reported_in_first_catch_order() {
    let mut h = harness(Tuning::default(), 21);
    h.start(&["apple", "banana"], &["taco"]);
    let player = h.scene.player_id().unwrap();

    let first = h.scene.spawn(&mut h.ctx, Category::Liked).unwrap();
    let second = h.scene.spawn(&mut h.ctx, Category::Liked).unwrap();
    let (a, b) = (h.item_name(first), h.item_name(second));
    assert_ne!(a, b, "one cycle hands out each item once");

    assert_eq!(
        h.scene.resolve_contact(&mut h.ctx, player, first),
        Contact::Caught(Category::Liked)
    );
    assert_eq!(
        h.scene.resolve_contact(&mut h.ctx, second, player),
        Contact::Caught(Category::Liked)
    );
    assert_eq!(
        *h.events.borrow(),
        vec![
            CatchEvent::ItemList(vec![a.as_str().into()]),
            CatchEvent::ItemList(vec![a.as_str().into(), b.as_str().into()]),
        ]
    );
    assert_eq!(h.scene.score(), 20);

    // A repeat catch scores but does not grow the list.
    let third = h.scene.spawn(&mut h.ctx, Category::Liked).unwrap();
    h.scene.resolve_contact(&mut h.ctx, player, third);
    assert_eq!(h.scene.score(), 30);
    assert_eq!(h.events.borrow().len(), 2);
}

#[test]
fn items_reaching_the_ground_are_lost_silently() {
    let mut h = harness(Tuning::default(), 3);
    h.start(&["apple"], &["taco"]);
    let ground = h.scene.ground_id().unwrap();

    let item = h.scene.spawn(&mut h.ctx, Category::Disliked).unwrap();
    assert_eq!(h.scene.resolve_contact(&mut h.ctx, ground, item), Contact::Lost);
    assert_eq!(h.scene.score(), 0);
    assert_eq!(h.scene.stats().dropped, 1);
    assert!(h.scene.collected_disliked().is_empty());
    assert!(h.events.borrow().is_empty());

    // The same pair arriving again refers to a parked entity.
    assert_eq!(h.scene.resolve_contact(&mut h.ctx, ground, item), Contact::Ignored);
    let player = h.scene.player_id().unwrap();
    assert_eq!(h.scene.resolve_contact(&mut h.ctx, player, ground), Contact::Ignored);
}

#[test]
fn disliked_hit_deducts_and_reports() {
    let mut h = harness(Tuning::default(), 5);
    h.start(&["apple"], &["taco"]);
    let player = h.scene.player_id().unwrap();

    let item = h.scene.spawn(&mut h.ctx, Category::Disliked).unwrap();
    assert_eq!(
        h.scene.resolve_contact(&mut h.ctx, player, item),
        Contact::Caught(Category::Disliked)
    );
    assert_eq!(h.scene.score(), -5);
    assert_eq!(
        *h.events.borrow(),
        vec![CatchEvent::Dislikes(vec!["taco".into()])]
    );

    let tint = h.ctx.scene.get(player).unwrap().sprite.as_ref().unwrap().tint;
    assert_ne!(tint, drop_engine::WHITE);
    for _ in 0..30 {
        h.step();
    }
    let tint = h.ctx.scene.get(player).unwrap().sprite.as_ref().unwrap().tint;
    assert_eq!(tint, drop_engine::WHITE);
}

#[test]
fn falling_liked_item_is_caught_by_the_player() {
    let mut h = harness(quiet_lanes(), 31);
    h.start(&["apple"], &["taco"]);

    let item = h.scene.spawn(&mut h.ctx, Category::Liked).unwrap();
    h.drop_on_player(item);
    assert!(h.step_until_resolved(), "item never touched the player");

    assert_eq!(h.scene.stats().liked_caught, 1);
    assert_eq!(h.scene.score(), 10);
    assert_eq!(*h.events.borrow(), vec![CatchEvent::ItemList(vec!["apple".into()])]);
    assert!(h.scene.active_items(Category::Liked).is_empty());
}

#[test]
fn falling_disliked_item_hits_the_player() {
    let mut h = harness(quiet_lanes(), 32);
    h.start(&["apple"], &["taco"]);

    let item = h.scene.spawn(&mut h.ctx, Category::Disliked).unwrap();
    h.drop_on_player(item);
    assert!(h.step_until_resolved(), "item never touched the player");

    assert_eq!(h.scene.stats().disliked_hit, 1);
    assert_eq!(h.scene.score(), -5);
    assert_eq!(*h.events.borrow(), vec![CatchEvent::Dislikes(vec!["taco".into()])]);
}

#[test]
fn falling_items_missed_by_the_player_reach_the_ground() {
    let mut h = harness(quiet_lanes(), 33);
    h.start(&["apple"], &["taco"]);

    let liked = h.scene.spawn(&mut h.ctx, Category::Liked).unwrap();
    h.drop_on_ground(liked);
    assert!(h.step_until_resolved(), "liked item never landed");

    let disliked = h.scene.spawn(&mut h.ctx, Category::Disliked).unwrap();
    h.drop_on_ground(disliked);
    assert!(h.step_until_resolved(), "disliked item never landed");

    let stats = h.scene.stats();
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.liked_caught + stats.disliked_hit, 0);
    assert_eq!(h.scene.score(), 0);
    assert!(h.events.borrow().is_empty());
}

#[test]
fn lost_item_is_reused_by_the_next_spawn() {
    let mut h = harness(quiet_lanes(), 34);
    h.start(&["apple"], &["taco"]);

    let first = h.scene.spawn(&mut h.ctx, Category::Liked).unwrap();
    for round in 1..=3 {
        let item = if round == 1 {
            first
        } else {
            h.scene.spawn(&mut h.ctx, Category::Liked).unwrap()
        };
        assert_eq!(item, first);
        assert_eq!(h.scene.active_items(Category::Liked), vec![first]);

        h.drop_on_ground(item);
        assert!(h.step_until_resolved(), "item never landed on pass {round}");
        assert_eq!(h.scene.stats().dropped, round);
        assert!(h.scene.active_items(Category::Liked).is_empty());
    }
    assert_eq!(h.scene.score(), 0);
}

#[test]
fn zero_spawn_interval_is_rejected() {
    let tuning = Tuning {
        liked_interval: 0.0,
        ..Tuning::default()
    };
    let scene = CatchScene::new(
        Rc::new(Catalog::builtin().unwrap()),
        builtin_sprites().unwrap(),
        RandomSource::new(StdRng::seed_from_u64(1)),
        Rc::new(EventChannel::new()),
        Rc::new(EventChannel::new()),
    )
    .with_tuning(tuning);
    assert_eq!(
        scene.err(),
        Some(TuningError::NotPositive("likedInterval"))
    );
}

#[test]
fn start_is_rejected_synchronously() {
    let mut h = harness(Tuning::default(), 1);
    let err = |liked: &[&str], disliked: &[&str], h: &mut Harness| {
        h.scene
            .start_game(&mut h.ctx, &CatchConfig::new(liked.to_vec(), disliked.to_vec()))
            .unwrap_err()
    };

    assert_eq!(err(&[], &["taco"], &mut h), StartError::NoLikedItems);
    assert_eq!(err(&["apple"], &[], &mut h), StartError::NoDislikedItems);
    assert_eq!(
        err(&["apple"], &["kiwi"], &mut h),
        StartError::UnknownItem("kiwi".into())
    );
    assert_eq!(h.scene.phase(), Phase::Idle);
    assert_eq!(h.scene.pending_timer_count(), 0);

    h.start(&["apple"], &["taco"]);
    assert_eq!(
        err(&["apple"], &["taco"], &mut h),
        StartError::NotIdle(Phase::Running)
    );
}

#[test]
fn scene_ready_handle_starts_on_next_tick() {
    let mut h = harness(Tuning::default(), 9);
    let handle = h.ready.borrow().first().cloned().expect("scene-ready published");
    assert_eq!(h.ready.borrow().len(), 1);

    handle
        .start_game(&CatchConfig::new(["apple"], ["taco"]))
        .unwrap();
    assert_eq!(handle.phase(), Phase::Idle);
    assert!(handle.is_start_pending());

    h.step();
    assert_eq!(handle.phase(), Phase::Running);
    assert!(!handle.is_start_pending());
    // Two spawn lanes and the countdown.
    assert_eq!(h.scene.pending_timer_count(), 3);
    assert_eq!(
        handle.start_game(&CatchConfig::new(["apple"], ["taco"])),
        Err(StartError::NotIdle(Phase::Running))
    );
}

#[test]
fn keys_steer_and_pointer_overrides() {
    let mut h = harness(Tuning::default(), 4);
    h.start(&["apple"], &["taco"]);
    let player = h.scene.player_id().unwrap();
    let start_x = h.player_x();

    h.input.push(InputEvent::KeyDown { key_code: keys::ARROW_LEFT });
    h.step();
    assert_eq!(h.ctx.velocity(player).x, -h.scene.tuning().player_speed);
    assert_eq!(h.stance(), "left");
    for _ in 0..10 {
        h.step();
    }
    assert!(h.player_x() < start_x);

    // Pointer on the right half wins over the held left key.
    let right = h.scene.layout().width * 0.9;
    h.input.push(InputEvent::PointerDown { x: right, y: 400.0 });
    h.step();
    assert!(h.ctx.velocity(player).x > 0.0);
    assert_eq!(h.stance(), "right");

    h.input.push(InputEvent::PointerUp { x: right, y: 400.0 });
    h.input.push(InputEvent::KeyUp { key_code: keys::ARROW_LEFT });
    h.step();
    assert_eq!(h.ctx.velocity(player), Vec2::ZERO);
    assert_eq!(h.stance(), "idle");
}

#[test]
fn player_stops_at_the_edge() {
    let mut h = harness(Tuning::default(), 4);
    h.start(&["apple"], &["taco"]);
    let (lo, _) = h.scene.layout().player_x_range();

    h.input.push(InputEvent::KeyDown { key_code: keys::A });
    for _ in 0..120 {
        h.step();
    }
    assert!(h.player_x() >= lo - 1.0);
    assert_eq!(h.ctx.velocity(h.scene.player_id().unwrap()).x, 0.0);
}

#[test]
fn resize_relayouts_fixtures() {
    let mut h = harness(Tuning::default(), 2);
    h.start(&["apple"], &["taco"]);

    h.ctx.set_viewport(Viewport::new(800.0, 600.0));
    h.scene.update(&mut h.ctx, &h.input);

    let layout = *h.scene.layout();
    assert_eq!(layout.width, 800.0);
    let ground = h.ctx.scene.get(h.scene.ground_id().unwrap()).unwrap();
    assert_eq!(ground.pos, Vec2::new(400.0, 588.0));
    assert_eq!(ground.scale, Vec2::new(800.0, 24.0));
    let player = h.ctx.scene.get(h.scene.player_id().unwrap()).unwrap();
    assert_eq!(player.pos.y, layout.player_y);

    let item = h.scene.spawn(&mut h.ctx, Category::Liked).unwrap();
    assert_eq!(
        h.ctx.scene.get(item).unwrap().scale,
        Vec2::splat(layout.item_size)
    );
}

#[test]
fn game_over_freezes_the_player() {
    let mut h = harness(short_round(0.5), 8);
    h.start(&["apple"], &["taco"]);
    let player = h.scene.player_id().unwrap();

    h.input.push(InputEvent::KeyDown { key_code: keys::D });
    for _ in 0..40 {
        h.step();
    }
    assert_eq!(h.scene.phase(), Phase::GameOver);
    assert_eq!(h.ctx.velocity(player), Vec2::ZERO);
    let animator = h.ctx.scene.get(player).unwrap().animation.clone().unwrap();
    assert!(animator.is_halted());

    let x = h.player_x();
    for _ in 0..30 {
        h.step();
    }
    assert_eq!(h.player_x(), x);
    assert_eq!(
        h.scene
            .start_game(&mut h.ctx, &CatchConfig::new(["apple"], ["taco"])),
        Err(StartError::NotIdle(Phase::GameOver))
    );
}

#[test]
fn runner_drives_a_round_and_teardown_leaves_nothing() {
    let (scene, events, ready) = build(short_round(1.0), 13);
    let mut runner = GameRunner::new(scene);
    runner.init();
    let handle = ready.borrow()[0].clone();
    handle
        .start_game(&CatchConfig::new(["apple", "cake"], ["taco"]))
        .unwrap();

    for _ in 0..120 {
        runner.tick(FIXED_DT);
    }
    assert_eq!(runner.game().phase(), Phase::GameOver);
    assert!(runner.instance_count() >= 2, "ground and player are drawn");
    assert_eq!(
        events
            .borrow()
            .iter()
            .filter(|e| matches!(e, CatchEvent::GameOver { .. }))
            .count(),
        1
    );

    runner.shutdown();
    assert!(runner.ctx().scene.is_empty());
    assert_eq!(runner.ctx().physics.body_count(), 0);
    assert_eq!(runner.game().pending_timer_count(), 0);
    assert!(runner.game().collected_liked().is_empty());
    assert_eq!(runner.tick(FIXED_DT), 0);
}
