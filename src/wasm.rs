//! WebAssembly bindings for the GPU demos.
//!
//! `runLife` and `runCube` append a canvas to the page and hand the demo to
//! the browser's event loop. `WasmLifeGrid` wraps the CPU reference
//! simulation for pages that want to inspect generations directly.

use wasm_bindgen::prelude::*;

use crate::{
    app::{self, CubeDemo, CubeSetup, LifeDemo},
    compute::{LifeGrid, gpu::checkerboard_texture},
    schema::{CubeConfig, LifeConfig},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// Parse a config, treating an empty string as "all defaults".
fn parse_config<T>(config_json: &str) -> Result<T, JsValue>
where
    T: serde::de::DeserializeOwned + Default,
{
    if config_json.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(config_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Start the Game of Life demo.
///
/// # Arguments
/// * `config_json` - JSON string containing a `LifeConfig`, or empty for defaults
#[wasm_bindgen(js_name = runLife)]
pub fn run_life(config_json: &str) -> Result<(), JsValue> {
    let config: LifeConfig = parse_config(config_json)?;
    config.validate().map_err(to_js_error)?;
    app::spawn::<LifeDemo>(config).map_err(to_js_error)
}

/// Start the textured cube demo.
///
/// # Arguments
/// * `config_json` - JSON string containing a `CubeConfig`, or empty for defaults
/// * `texture` - encoded PNG/JPEG bytes; a checkerboard is used when absent
///
/// `texture_path` in the config is ignored: there is no filesystem here.
#[wasm_bindgen(js_name = runCube)]
pub fn run_cube(config_json: &str, texture: Option<Box<[u8]>>) -> Result<(), JsValue> {
    let config: CubeConfig = parse_config(config_json)?;
    config.validate().map_err(to_js_error)?;

    let texture = match texture {
        Some(bytes) => image::load_from_memory(&bytes)
            .map_err(|e| JsValue::from_str(&format!("Invalid texture: {e}")))?
            .to_rgba8(),
        None => checkerboard_texture(256, 8),
    };

    app::spawn::<CubeDemo>(CubeSetup { config, texture }).map_err(to_js_error)
}

/// Preset configurations, as plain JS objects.
#[wasm_bindgen(js_name = lifePresets)]
pub fn life_presets() -> Result<JsValue, JsValue> {
    let presets = [("default", LifeConfig::default()), ("large", LifeConfig::large())];
    serde_wasm_bindgen::to_value(&presets)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// WebAssembly wrapper for the CPU reference simulation.
#[wasm_bindgen]
pub struct WasmLifeGrid {
    grid: LifeGrid,
}

#[wasm_bindgen]
impl WasmLifeGrid {
    /// Create a grid seeded from a JSON `LifeConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmLifeGrid, JsValue> {
        let config: LifeConfig = parse_config(config_json)?;
        config.validate().map_err(to_js_error)?;
        Ok(WasmLifeGrid {
            grid: LifeGrid::from_config(&config),
        })
    }

    /// Advance one generation.
    #[wasm_bindgen]
    pub fn step(&mut self) {
        self.grid.step();
    }

    /// Advance several generations.
    #[wasm_bindgen]
    pub fn run(&mut self, steps: u64) {
        self.grid.run(steps);
    }

    /// Cell states, row-major, 0 or 1 each.
    #[wasm_bindgen(js_name = getCells)]
    pub fn get_cells(&self) -> Vec<u32> {
        self.grid.cells().to_vec()
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.grid.stats())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    #[wasm_bindgen(js_name = getStep)]
    pub fn get_step(&self) -> u64 {
        self.grid.step_count()
    }

    #[wasm_bindgen(js_name = getSize)]
    pub fn get_size(&self) -> u32 {
        self.grid.size()
    }
}
