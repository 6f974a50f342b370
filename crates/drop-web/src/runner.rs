use drop_engine::{
    Game, GameConfig, EngineContext, Viewport,
    InputEvent, InputQueue, RenderBuffer,
    FixedTimestep, ProtocolLayout,
};
use drop_engine::bridge::protocol::HEADER_FLOATS;
use drop_engine::systems::animation::tick_animations;
use drop_engine::systems::render::build_render_buffer;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    frame: u32,
    initialized: bool,
    shut_down: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self {
            ctx: EngineContext::from_config(&config),
            input: InputQueue::new(),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            timestep: FixedTimestep::new(config.fixed_dt),
            layout: ProtocolLayout::from_config(&config),
            header: [0.0; HEADER_FLOATS],
            frame: 0,
            initialized: false,
            shut_down: false,
            config,
            game,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// The host canvas changed size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.ctx.set_viewport(Viewport::new(width, height));
    }

    /// Run one frame: as many fixed steps as `dt` covers, then rebuild the
    /// render buffer and frame header. Returns the number of steps run.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.initialized || self.shut_down {
            return 0;
        }

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.game.update(&mut self.ctx, &self.input);
            #[cfg(feature = "physics")]
            self.ctx.step_physics();
            tick_animations(&mut self.ctx.scene, self.timestep.dt());
        }

        // Drain input after update; held keys stay held.
        self.input.drain();

        build_render_buffer(self.ctx.scene.iter(), &mut self.render_buffer);

        self.frame = self.frame.wrapping_add(1);
        self.layout.write_header(
            &mut self.header,
            self.frame,
            self.render_buffer.instance_count(),
            steps,
            self.ctx.viewport(),
        );
        steps
    }

    /// Tear the game down. Later ticks do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        if self.initialized {
            self.game.teardown(&mut self.ctx);
        }
        self.render_buffer.clear();
        self.input.release_all();
        self.shut_down = true;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn ctx(&self) -> &EngineContext {
        &self.ctx
    }

    /// Game and context together, for host commands that act on both.
    pub fn parts_mut(&mut self) -> (&mut G, &mut EngineContext) {
        (&mut self.game, &mut self.ctx)
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    // ---- Pointer accessors for reads from wasm memory ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn world_width(&self) -> f32 {
        self.ctx.viewport().width
    }

    pub fn world_height(&self) -> f32 {
        self.ctx.viewport().height
    }

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn fixed_dt(&self) -> f32 {
        self.config.fixed_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drop_engine::{Entity, SpriteComponent};
    use drop_engine::bridge::protocol::{HEADER_INSTANCE_COUNT, HEADER_WORLD_WIDTH};

    #[derive(Default)]
    struct Counter {
        updates: u32,
        torn_down: bool,
    }

    impl Game for Counter {
        fn init(&mut self, ctx: &mut EngineContext) {
            let id = ctx.next_id();
            ctx.scene
                .spawn(Entity::new(id).with_sprite(SpriteComponent::default()));
        }

        fn update(&mut self, _ctx: &mut EngineContext, _input: &InputQueue) {
            self.updates += 1;
        }

        fn teardown(&mut self, ctx: &mut EngineContext) {
            ctx.scene.clear();
            self.torn_down = true;
        }
    }

    #[test]
    fn tick_runs_fixed_steps_and_fills_buffers() {
        let mut runner = GameRunner::new(Counter::default());
        runner.init();

        let steps = runner.tick(2.5 / 60.0);
        assert_eq!(steps, 2);
        assert_eq!(runner.game().updates, 2);
        assert_eq!(runner.instance_count(), 1);
        assert_eq!(runner.header[HEADER_INSTANCE_COUNT], 1.0);
    }

    #[test]
    fn resize_reaches_the_header() {
        let mut runner = GameRunner::new(Counter::default());
        runner.init();
        runner.resize(390.0, 844.0);
        runner.tick(0.0);
        assert_eq!(runner.header[HEADER_WORLD_WIDTH], 390.0);
        assert_eq!(runner.world_height(), 844.0);
    }

    #[test]
    fn shutdown_tears_down_once_and_stops_ticks() {
        let mut runner = GameRunner::new(Counter::default());
        runner.init();
        runner.shutdown();
        runner.shutdown();

        assert!(runner.game().torn_down);
        assert_eq!(runner.tick(1.0), 0);
        assert_eq!(runner.game().updates, 0);
    }

    #[test]
    fn uninitialized_runner_does_not_tick() {
        let mut runner = GameRunner::new(Counter::default());
        assert_eq!(runner.tick(1.0), 0);
    }
}
