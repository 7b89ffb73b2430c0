use js_sys::{Float64Array, Object, Reflect};
use serde::Serialize;
use wasm_bindgen::JsValue;

pub fn new_obj() -> Object { Object::new() }

pub fn set_kv(obj: &Object, key: &str, val: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), val);
}

pub fn arr_f64(data: &[f64]) -> Float64Array { Float64Array::from(data) }

/// Plain JS objects and numbers, the shape `JSON.parse` would give.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// Interleaved `[x0, y0, x1, y1, …]` into points; a trailing odd value is ignored.
pub fn points(flat: &[f64]) -> Vec<pathedit::Vec2> {
    flat.chunks_exact(2).map(|c| pathedit::Vec2::new(c[0], c[1])).collect()
}
