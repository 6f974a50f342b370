pub mod deferred;
pub mod runner;

pub use deferred::defer;
pub use runner::GameRunner;

/// Generate the `#[wasm_bindgen]` exports every game needs.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner
/// - `with_runner()` helper function (returns `None` before `game_init`)
/// - wasm-bindgen exports for the lifecycle, input, resize and frame data
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use drop_engine::*;
///
/// drop_web::export_game!(MyGame, "my-game", MyGame::try_new);
/// ```
///
/// # Arguments
///
/// - `$game_type`: The game struct type that implements `drop_engine::Game`
/// - `$game_name`: A string literal used in log messages
/// - `$ctor`: Expression called by `game_init`, returning
///   `Result<$game_type, E>` where `E: Display`. An error is handed to the
///   host as a rejected `game_init`.
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal, $ctor:expr) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        /// Run `f` against the live runner, then any host callbacks it
        /// deferred. `None` before `game_init`, after `game_shutdown`, or
        /// when called back from inside a running hook.
        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> Option<R> {
            let result = RUNNER.with(|cell| match cell.try_borrow_mut() {
                Ok(mut runner) => runner.as_mut().map(f),
                Err(_) => {
                    log::warn!("{}: runner is busy; call ignored", $game_name);
                    None
                }
            });
            $crate::deferred::run_pending();
            result
        }

        #[wasm_bindgen]
        pub fn game_init() -> Result<(), JsValue> {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game: $game_type = match ($ctor)() {
                Ok(game) => game,
                Err(e) => {
                    log::error!("{}: init failed: {}", $game_name, e);
                    return Err(JsValue::from_str(&e.to_string()));
                }
            };
            let mut runner = $crate::GameRunner::new(game);
            runner.init();

            let previous = RUNNER.with(|cell| cell.borrow_mut().replace(runner));
            if let Some(mut previous) = previous {
                previous.shutdown();
                log::warn!("{}: re-initialized; previous session shut down", $game_name);
            }
            log::info!("{}: initialized", $game_name);
            $crate::deferred::run_pending();
            Ok(())
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) -> u32 {
            with_runner(|r| r.tick(dt)).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn game_resize(width: f32, height: f32) {
            with_runner(|r| r.resize(width, height));
        }

        #[wasm_bindgen]
        pub fn game_shutdown() {
            // Take the runner out first so teardown hooks may call back in.
            let runner = RUNNER.with(|cell| cell.borrow_mut().take());
            if let Some(mut runner) = runner {
                runner.shutdown();
                log::info!("{}: shut down", $game_name);
            }
            $crate::deferred::run_pending();
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_up(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_move(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_header_ptr() -> *const f32 {
            with_runner(|r| r.header_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_instances_ptr() -> *const f32 {
            with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_instance_count() -> u32 {
            with_runner(|r| r.instance_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_world_width() -> f32 {
            with_runner(|r| r.world_width()).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn get_world_height() -> f32 {
            with_runner(|r| r.world_height()).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn get_max_instances() -> u32 {
            with_runner(|r| r.max_instances()).unwrap_or(0)
        }
    };
}
