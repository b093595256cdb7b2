use js_sys::Array;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_layers_core::{
    codec::{decode_with_tolerance, encode, KeyRecord},
    manage, AnimationHost, Config, Curve, Keyframe, LayerContext, LayerId, LayerTransfer, Scene,
    SceneDocument, TakeId, TakeSelection,
};

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Serialize maps as plain objects so JS sees `{ "Cube1.Translation.X": [...] }`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("serialize error: {e}")))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsError> {
    swb::from_value(value).map_err(|e| JsError::new(&format!("{what} parse error: {e}")))
}

fn core_err(e: vizij_layers_core::LayersError) -> JsError {
    JsError::new(&format!("{} error: {e}", e.category()))
}

fn layer_ids(layers: &[u32]) -> Vec<LayerId> {
    layers.iter().copied().map(LayerId).collect()
}

fn take_ids(takes: &[u32]) -> Vec<TakeId> {
    takes.iter().copied().map(TakeId).collect()
}

#[wasm_bindgen]
pub struct VizijLayers {
    scene: Scene,
}

#[wasm_bindgen]
impl VizijLayers {
    /// Create an empty scene. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new VizijLayers({ frame_rate: 24 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijLayers, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            from_js(config, "config")?
        };
        Ok(VizijLayers {
            scene: Scene::new(cfg),
        })
    }

    /// Replace the scene with a scene document (object or JSON string).
    #[wasm_bindgen(js_name = load_scene)]
    pub fn load_scene(&mut self, doc: JsValue) -> Result<(), JsError> {
        let cfg = self.scene.config().clone();
        let scene = match doc.as_string() {
            Some(text) => Scene::from_json(&text, cfg),
            None => {
                let doc: SceneDocument = from_js(doc, "load_scene")?;
                Scene::from_document(&doc, cfg)
            }
        }
        .map_err(core_err)?;
        log::debug!("load_scene: {} takes", scene.takes().len());
        self.scene = scene;
        Ok(())
    }

    /// Current scene as a scene document.
    #[wasm_bindgen(js_name = export_scene)]
    pub fn export_scene(&self) -> Result<JsValue, JsError> {
        to_js(&self.scene.to_document().map_err(core_err)?)
    }

    #[wasm_bindgen(js_name = take_id)]
    pub fn take_id(&self, name: &str) -> Option<u32> {
        self.scene.take_by_name(name).map(|t| t.id.0)
    }

    #[wasm_bindgen(js_name = layer_id)]
    pub fn layer_id(&self, take: &str, layer: &str) -> Option<u32> {
        self.scene.context_by_name(take, layer).map(|c| c.layer.0)
    }

    /// Layer names of a take, bottom to top.
    #[wasm_bindgen(js_name = layer_names)]
    pub fn layer_names(&self, take: u32) -> Result<Array, JsError> {
        let names = self.scene.layer_names(TakeId(take)).map_err(core_err)?;
        Ok(names.into_iter().map(JsValue::from).collect())
    }

    /// Transfer layers. `selections` is `[{ take, layers: [layerId...] }]`, `destinations` is
    /// a list of take ids. Returns the transfer report.
    #[wasm_bindgen]
    pub fn transfer(
        &mut self,
        selections: JsValue,
        destinations: Vec<u32>,
    ) -> Result<JsValue, JsError> {
        let selections: Vec<TakeSelection> = from_js(selections, "selections")?;
        let engine = LayerTransfer::new(self.scene.config().clone());
        let report = engine.transfer(&mut self.scene, &selections, &take_ids(&destinations));
        to_js(&report)
    }

    #[wasm_bindgen(js_name = rename_layers)]
    pub fn rename_layers(
        &mut self,
        take: u32,
        layers: Vec<u32>,
        name: &str,
    ) -> Result<Array, JsError> {
        let names = manage::rename_layers(&mut self.scene, TakeId(take), &layer_ids(&layers), name)
            .map_err(core_err)?;
        Ok(names.into_iter().map(JsValue::from).collect())
    }

    #[wasm_bindgen(js_name = delete_layers)]
    pub fn delete_layers(&mut self, take: u32, layers: Vec<u32>) -> Result<(), JsError> {
        manage::delete_layers(&mut self.scene, TakeId(take), &layer_ids(&layers))
            .map_err(core_err)
    }

    #[wasm_bindgen(js_name = set_layers_weight)]
    pub fn set_layers_weight(
        &mut self,
        take: u32,
        layers: Vec<u32>,
        weight: f64,
    ) -> Result<(), JsError> {
        manage::set_layers_weight(&mut self.scene, TakeId(take), &layer_ids(&layers), weight)
            .map_err(core_err)
    }

    #[wasm_bindgen(js_name = set_layers_muted)]
    pub fn set_layers_muted(
        &mut self,
        take: u32,
        layers: Vec<u32>,
        muted: bool,
    ) -> Result<(), JsError> {
        manage::set_layers_muted(&mut self.scene, TakeId(take), &layer_ids(&layers), muted)
            .map_err(core_err)
    }

    /// Copy takes with the configured suffix. Returns the new take ids.
    #[wasm_bindgen(js_name = duplicate_takes)]
    pub fn duplicate_takes(&mut self, takes: Vec<u32>) -> Result<Vec<u32>, JsError> {
        let cfg = self.scene.config().clone();
        let copies = manage::duplicate_takes(&mut self.scene, &cfg, &take_ids(&takes))
            .map_err(core_err)?;
        Ok(copies.into_iter().map(|t| t.0).collect())
    }

    #[wasm_bindgen(js_name = set_frame_range)]
    pub fn set_frame_range(
        &mut self,
        takes: Vec<u32>,
        start: i32,
        stop: i32,
    ) -> Result<(), JsError> {
        let cfg = self.scene.config().clone();
        manage::set_frame_range(
            &mut self.scene,
            &cfg,
            &take_ids(&takes),
            i64::from(start),
            i64::from(stop),
        )
        .map(drop)
        .map_err(core_err)
    }

    /// Encoded curve of one channel on one layer, or `undefined` if it has none.
    #[wasm_bindgen(js_name = channel_records)]
    pub fn channel_records(&self, take: u32, layer: u32, path: &str) -> Result<JsValue, JsError> {
        let ctx = LayerContext::new(TakeId(take), LayerId(layer));
        match self.scene.curve_of(ctx, &path.into()) {
            Some(curve) => to_js(&encode(curve)),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

/// Encode keyframes (`[{ time, value, ... }]`) into keyframe records.
#[wasm_bindgen]
pub fn encode_curve(keys: JsValue) -> Result<JsValue, JsError> {
    let keys: Vec<Keyframe> = from_js(keys, "keys")?;
    to_js(&encode(&Curve::from_keys(keys)))
}

/// Decode keyframe records back into keyframes. `tolerance_ticks` defaults to 0.
#[wasm_bindgen]
pub fn decode_curve(records: JsValue, tolerance_ticks: Option<f64>) -> Result<JsValue, JsError> {
    let records: Vec<KeyRecord> = from_js(records, "records")?;
    let mut curve = Curve::new();
    decode_with_tolerance(&mut curve, &records, tolerance_ticks.unwrap_or(0.0) as i64)
        .map_err(core_err)?;
    to_js(&curve.keys())
}
