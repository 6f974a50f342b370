use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::prelude::*;
use drop_engine::*;

pub mod catalog;
pub mod config;
pub mod events;
pub mod handle;
pub mod layout;
pub mod scene;
pub mod session;
pub mod store;

use catalog::{builtin_sprites, Catalog, CatalogError};
use config::{CatchConfig, Tuning, TuningError};
use events::{CatchEvent, SceneReady};
use handle::SceneHandle;
use scene::CatchScene;
use store::GameCode;

thread_local! {
    static EVENTS: Rc<EventChannel<CatchEvent>> = Rc::new(EventChannel::new());
    static APP: Rc<EventChannel<SceneReady>> = Rc::new(EventChannel::new());
    static TUNING: std::cell::RefCell<Option<Tuning>> = const { std::cell::RefCell::new(None) };
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Random(#[from] RandomError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

fn build_scene() -> Result<CatchScene, SetupError> {
    let catalog = Catalog::builtin()?;
    let sprites = builtin_sprites()?;
    catalog.check_sprites(&sprites)?;
    let rng = RandomSource::from_os()?;

    let events = EVENTS.with(Rc::clone);
    let app = APP.with(Rc::clone);
    let tuning = TUNING.with(|t| t.borrow().clone()).unwrap_or_default();
    Ok(CatchScene::new(Rc::new(catalog), sprites, rng, events, app).with_tuning(tuning)?)
}

drop_web::export_game!(CatchScene, "fave-catch", build_scene);

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Override gameplay constants for the next `game_init`.
#[wasm_bindgen]
pub fn game_configure(tuning_json: &str) -> Result<(), JsValue> {
    let tuning = Tuning::from_json(tuning_json).map_err(js_error)?;
    TUNING.with(|t| *t.borrow_mut() = Some(tuning));
    Ok(())
}

/// Start the round directly, outside any scene-ready callback.
#[wasm_bindgen]
pub fn start_game(config_json: &str) -> Result<(), JsValue> {
    let config = CatchConfig::from_json(config_json).map_err(js_error)?;
    with_runner(|r| {
        let (game, ctx) = r.parts_mut();
        game.start_game(ctx, &config)
    })
    .ok_or_else(|| js_error("game is not running"))?
    .map_err(js_error)
}

/// Listen for `game-over`, `update-itemList` or `update-dislikes`. The
/// callback receives the payload as a JSON string. It runs once the export
/// that raised the event returns, so it may call any other export.
#[wasm_bindgen]
pub fn on_event(topic: &str, callback: js_sys::Function) -> u32 {
    let callback = Rc::new(callback);
    let id = EVENTS.with(|events| {
        events.subscribe(topic, move |event: &CatchEvent| {
            let callback = Rc::clone(&callback);
            let topic = event.topic();
            let payload = event.payload().to_string();
            drop_web::defer(move || {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
                    log::error!("{} listener threw: {:?}", topic, e);
                }
            });
        })
    });
    id.0
}

#[wasm_bindgen]
pub fn off_event(id: u32) -> bool {
    EVENTS.with(|events| events.unsubscribe(ListenerId(id)))
}

/// The host-side view of a scene, delivered to `on_scene_ready` callbacks.
#[wasm_bindgen]
pub struct JsSceneHandle {
    inner: SceneHandle,
}

#[wasm_bindgen]
impl JsSceneHandle {
    /// Queue a round start for the scene's next tick. Configuration errors
    /// reject immediately.
    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&self, config_json: &str) -> Result<(), JsValue> {
        let config = CatchConfig::from_json(config_json).map_err(js_error)?;
        self.inner.start_game(&config).map_err(js_error)
    }

    pub fn phase(&self) -> String {
        self.inner.phase().to_string()
    }
}

/// Subscribe before `game_init`: the signal is sent once per scene and is
/// not replayed. The callback runs after `game_init` returns.
#[wasm_bindgen]
pub fn on_scene_ready(callback: js_sys::Function) -> u32 {
    let callback = Rc::new(callback);
    let id = APP.with(|app| {
        app.subscribe(events::SCENE_READY, move |ready: &SceneReady| {
            let callback = Rc::clone(&callback);
            let handle = JsSceneHandle {
                inner: ready.handle.clone(),
            };
            drop_web::defer(move || {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(handle)) {
                    log::error!("scene-ready listener threw: {:?}", e);
                }
            });
        })
    });
    id.0
}

#[wasm_bindgen]
pub fn off_scene_ready(id: u32) -> bool {
    APP.with(|app| app.unsubscribe(ListenerId(id)))
}

// ---- HUD ----

#[wasm_bindgen]
pub fn get_score() -> f64 {
    with_runner(|r| r.game().score() as f64).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_seconds_left() -> u32 {
    with_runner(|r| r.game().hud().seconds_left).unwrap_or(0)
}

/// `{ score, secondsLeft, phase }` as JSON.
#[wasm_bindgen]
pub fn get_hud() -> String {
    with_runner(|r| serde_json::to_string(&r.game().hud()).unwrap_or_default())
        .unwrap_or_default()
}

// ---- Share codes ----

#[wasm_bindgen]
pub fn new_game_code() -> Result<String, JsValue> {
    let mut rng = RandomSource::from_os().map_err(js_error)?;
    Ok(GameCode::generate(&mut rng).to_string())
}

#[wasm_bindgen]
pub fn is_valid_game_code(code: &str) -> bool {
    GameCode::parse(code).is_ok()
}
