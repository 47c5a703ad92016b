//! Browser bridge for a single projection wall.
//!
//! The page fetches the program config and scene JSON, then calls
//! `wall_load` with the `wall` and `modifiers` query parameters. Each
//! animation frame it calls `wall_tick` and reads the frame JSON, the queued
//! audio commands and the particle vertex buffers back out.

pub mod devtools;
pub mod overrides;
pub mod runner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

pub use runner::{PageState, WallRunner};

thread_local! {
    static RUNNER: RefCell<Option<WallRunner>> = RefCell::new(None);
}

/// Run `f` against the runner, or return `fallback` before `wall_init`.
fn with_runner<R>(fallback: R, f: impl FnOnce(&mut WallRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            // The logger may not be installed yet.
            web_sys::console::warn_1(&JsValue::from_str("quadwall: call wall_init() first"));
            fallback
        }
    })
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        log::error!("serialization failed: {}", err);
        "null".to_string()
    })
}

#[wasm_bindgen]
pub fn wall_init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(WallRunner::default());
    });
    log::info!("quadwall: initialized");
}

/// Mount a scene. Returns the page state as JSON.
#[wasm_bindgen]
pub fn wall_load(program_json: &str, scene_json: &str, wall: &str, modifiers: &str) -> String {
    with_runner("null".to_string(), |r| {
        to_json(r.load(program_json, scene_json, wall, modifiers))
    })
}

#[wasm_bindgen]
pub fn wall_state_json() -> String {
    with_runner("null".to_string(), |r| to_json(r.state()))
}

#[wasm_bindgen]
pub fn wall_tick(dt: f32) -> bool {
    with_runner(false, |r| r.tick(dt))
}

#[wasm_bindgen]
pub fn wall_frame_json() -> String {
    with_runner("null".to_string(), |r| r.frame_json())
}

/// Drain the queued audio commands as a JSON array.
#[wasm_bindgen]
pub fn wall_audio_commands_json() -> String {
    with_runner("[]".to_string(), |r| to_json(&r.take_audio_commands()))
}

/// Copy of a particle system's vertices from the last frame.
#[wasm_bindgen]
pub fn wall_particle_vertices(particle_id: &str) -> js_sys::Float32Array {
    with_runner(js_sys::Float32Array::new_with_length(0), |r| {
        js_sys::Float32Array::from(r.particle_floats(particle_id).unwrap_or(&[]))
    })
}

// ---- Modifiers ----

#[wasm_bindgen]
pub fn wall_modifiers() -> String {
    with_runner(String::new(), |r| r.modifiers())
}

#[wasm_bindgen]
pub fn wall_set_modifiers(modifiers: &str) {
    with_runner((), |r| r.set_modifiers(modifiers));
}

/// Returns the new `modifiers` query string.
#[wasm_bindgen]
pub fn wall_update_modifier(id: &str, value: &str) -> String {
    with_runner(String::new(), |r| r.update_modifier(id, value))
}

/// Returns the new `modifiers` query string.
#[wasm_bindgen]
pub fn wall_reset_modifiers() -> String {
    with_runner(String::new(), |r| r.reset_modifiers())
}

#[wasm_bindgen]
pub fn wall_controls_json() -> String {
    with_runner("[]".to_string(), |r| to_json(&r.controls()))
}

// ---- Playback ----

#[wasm_bindgen]
pub fn wall_set_playing(playing: bool) {
    with_runner((), |r| r.set_playing(playing));
}

#[wasm_bindgen]
pub fn wall_reset_time() {
    with_runner((), |r| r.reset_time());
}

// ---- Asset and audio loading ----

/// `[[id, src], ...]` of models still loading.
#[wasm_bindgen]
pub fn wall_pending_assets_json() -> String {
    with_runner("[]".to_string(), |r| to_json(&r.pending_assets()))
}

/// `[[id, src, loop], ...]` of every audio cue.
#[wasm_bindgen]
pub fn wall_audio_sources_json() -> String {
    with_runner("[]".to_string(), |r| to_json(&r.audio_sources()))
}

#[wasm_bindgen]
pub fn wall_asset_loaded(model_id: &str) -> bool {
    with_runner(false, |r| r.asset_loaded(model_id))
}

#[wasm_bindgen]
pub fn wall_asset_failed(model_id: &str, reason: &str) -> bool {
    with_runner(false, |r| r.asset_failed(model_id, reason))
}

#[wasm_bindgen]
pub fn wall_audio_loaded(cue_id: &str) -> bool {
    with_runner(false, |r| r.audio_loaded(cue_id))
}

/// Unmount the scene. Its stop commands are left for `wall_audio_commands_json`.
#[wasm_bindgen]
pub fn wall_unmount() {
    with_runner((), |r| r.unmount());
}
