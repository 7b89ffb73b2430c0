use crate::error;
use crate::interop::{self, to_js};
use crate::Editor;
use js_sys::Function;
use pathedit::{DocumentAction, EditorNotice, Grid, Path, Vec2};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn finite(name: &str, v: f64) -> Result<f64, JsValue> {
    if v.is_finite() { Ok(v) } else { Err(error::non_finite(name)) }
}

fn result(r: Result<JsValue, JsValue>) -> JsValue {
    match r {
        Ok(v) => error::ok(v),
        Err(e) => e,
    }
}

impl Editor {
    fn find(&self, raw: u64) -> Option<&Path> {
        self.inner.paths().find(|p| p.id().raw() == raw)
    }

    fn action(v: JsValue) -> Result<DocumentAction, JsValue> {
        serde_wasm_bindgen::from_value(v).map_err(error::invalid_action)
    }
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        crate::Editor::rs_new()
    }
    pub fn revision(&self) -> usize {
        self.rs_revision()
    }

    /// `config` is an `EditorConfig` as JSON; missing fields take defaults.
    pub fn with_config_res(config: &str) -> Result<Editor, JsValue> {
        let config = pathedit::EditorConfig::from_json(config).map_err(error::document)?;
        Ok(Editor { inner: pathedit::Editor::with_config(config) })
    }

    pub fn set_grid(&mut self, cell_size: Option<f64>) {
        self.inner.set_grid(cell_size.map(|cell_size| Grid::Cartesian { cell_size }));
    }

    // Actions
    pub fn send_res(&mut self, action: JsValue) -> JsValue {
        result(Self::action(action).and_then(|a| {
            self.inner.send(a).map(JsValue::from_bool).map_err(error::document)
        }))
    }
    pub fn preview_res(&mut self, action: JsValue) -> JsValue {
        result(Self::action(action).map(|a| JsValue::from_bool(self.inner.preview(a))))
    }
    pub fn commit_pending_res(&mut self) -> JsValue {
        result(self.inner.commit_pending().map(JsValue::from_bool).map_err(error::document))
    }
    pub fn cancel_pending(&mut self) -> bool {
        self.inner.cancel_pending()
    }
    pub fn is_previewing(&self) -> bool {
        self.inner.store().is_previewing()
    }
    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    /// `points` is interleaved `[x0, y0, x1, y1, …]`.
    pub fn draw_res(&mut self, points: &[f64]) -> JsValue {
        if let Some(i) = points.iter().position(|v| !v.is_finite()) {
            return error::non_finite(&format!("points[{}]", i));
        }
        let pts = interop::points(points);
        result(
            self.inner
                .draw(&pts)
                .map(|id| id.map_or(JsValue::NULL, |id| JsValue::from_f64(id.raw() as f64)))
                .map_err(error::document),
        )
    }

    // Persistence + SVG
    pub fn to_json_res(&self) -> JsValue {
        result(self.inner.to_json().map(|s| JsValue::from_str(&s)).map_err(error::document))
    }
    pub fn load_document_res(&mut self, json: &str) -> JsValue {
        result(self.inner.load_document(json).map(|_| JsValue::TRUE).map_err(error::document))
    }
    pub fn load_svg_res(&mut self, d: &str) -> JsValue {
        result(self.inner.load_svg(d).map_err(error::document).map(|ids| {
            let raw: Vec<f64> = ids.iter().map(|id| id.raw() as f64).collect();
            interop::arr_f64(&raw).into()
        }))
    }
    pub fn svg_path_data_res(&self, id: f64) -> JsValue {
        result(error::raw_id(id).and_then(|raw| {
            self.find(raw)
                .map(|p| JsValue::from_str(&p.to_svg_path_data()))
                .ok_or_else(|| error::invalid_id(id))
        }))
    }

    // Selectors
    pub fn path_ids(&self) -> Vec<f64> {
        self.inner.paths().map(|p| p.id().raw() as f64).collect()
    }
    pub fn path_res(&self, id: f64) -> JsValue {
        result(error::raw_id(id).and_then(|raw| {
            let path = self.find(raw).ok_or_else(|| error::invalid_id(id))?;
            to_js(path).map_err(error::serialize)
        }))
    }
    pub fn property_res(&self, id: f64) -> JsValue {
        result(error::raw_id(id).and_then(|raw| {
            let path = self.find(raw).ok_or_else(|| error::invalid_id(id))?;
            match self.inner.property(path.id()) {
                Some(prop) => to_js(prop).map_err(error::serialize),
                None => Ok(JsValue::NULL),
            }
        }))
    }
    pub fn hit_test_res(&self, x: f64, y: f64, threshold: Option<f64>) -> JsValue {
        result((|| {
            let pos = Vec2::new(finite("x", x)?, finite("y", y)?);
            if let Some(t) = threshold {
                if finite("threshold", t)? < 0.0 {
                    return Err(error::out_of_range("threshold", 0.0, f64::INFINITY, t));
                }
            }
            Ok(self
                .inner
                .hit_test(pos, threshold)
                .map_or(JsValue::NULL, |id| JsValue::from_f64(id.raw() as f64)))
        })())
    }
    pub fn pick_res(&self, x: f64, y: f64, tol: f64) -> JsValue {
        result((|| {
            let pos = Vec2::new(finite("x", x)?, finite("y", y)?);
            if finite("tol", tol)? < 0.0 {
                return Err(error::out_of_range("tol", 0.0, f64::INFINITY, tol));
            }
            match self.inner.pick(pos, tol) {
                Some(pick) => to_js(&pick).map_err(error::serialize),
                None => Ok(JsValue::NULL),
            }
        })())
    }

    /// `callback(kind, event)` with kind `"committed"`, `"pending"` or
    /// `"replayed"`. Returns a handle for `unsubscribe`.
    pub fn subscribe(&mut self, callback: Function) -> usize {
        self.inner.subscribe(move |notice| {
            let (kind, event) = match notice {
                EditorNotice::Committed(e) => ("committed", to_js(e).unwrap_or(JsValue::NULL)),
                EditorNotice::Pending(e) => ("pending", e.as_ref().and_then(|e| to_js(e).ok()).unwrap_or(JsValue::NULL)),
                EditorNotice::Replayed => ("replayed", JsValue::NULL),
            };
            if let Err(e) = callback.call2(&JsValue::NULL, &JsValue::from_str(kind), &event) {
                web_sys::console::error_1(&e);
            }
        })
    }
    pub fn unsubscribe(&mut self, handle: usize) -> bool {
        self.inner.unsubscribe(handle)
    }
}
