use crate::interop::{new_obj, set_kv};
use pathedit::DocumentError;
use wasm_bindgen::prelude::*;

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f64, max: f64, got: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min));
    set_kv(&d, "max", &JsValue::from_f64(max));
    set_kv(&d, "got", &JsValue::from_f64(got));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_id(id: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "id", &JsValue::from_f64(id));
    err("invalid_id", "no such path", Some(d.into()))
}

pub fn invalid_action(e: serde_wasm_bindgen::Error) -> JsValue {
    err("invalid_action", e.to_string(), None)
}

pub fn serialize(e: serde_wasm_bindgen::Error) -> JsValue {
    err("serialize", e.to_string(), None)
}

pub fn document(e: DocumentError) -> JsValue {
    let code = match &e {
        DocumentError::Json(_) => "json_parse",
        DocumentError::UnsupportedVersion(_) => "unsupported_version",
        DocumentError::LimitExceeded { .. } => "limit_exceeded",
        DocumentError::Svg(_) => "svg_parse",
    };
    err(code, e.to_string(), None)
}

/// JS numbers carry ids; anything that is not a non-negative integer is rejected.
pub fn raw_id(id: f64) -> Result<u64, JsValue> {
    if id.is_finite() && id >= 0.0 && id.fract() == 0.0 && id <= 9_007_199_254_740_991.0 {
        Ok(id as u64)
    } else {
        Err(invalid_id(id))
    }
}
