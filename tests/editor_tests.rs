use js_sys::{Float64Array, Function, Reflect};
use pathedit_wasm::Editor;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_ok(v: &JsValue) -> bool {
    Reflect::get(v, &JsValue::from_str("ok")).ok().and_then(|x| x.as_bool()).unwrap_or(false)
}

fn value(v: &JsValue) -> JsValue {
    Reflect::get(v, &JsValue::from_str("value")).unwrap()
}

fn is_err_code(v: &JsValue, code: &str) -> bool {
    if is_ok(v) {
        return false;
    }
    if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
        if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
            return c.as_string().map_or(false, |s| s == code);
        }
    }
    false
}

fn action(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

#[wasm_bindgen_test]
fn svg_load_and_export() {
    let mut ed = Editor::new();
    let r = ed.load_svg_res("M0 0 L10 0 L10 10 Z");
    assert!(is_ok(&r));
    let ids = Float64Array::new(&value(&r));
    assert_eq!(ids.length(), 1);
    let id = ids.get_index(0);

    let d = ed.svg_path_data_res(id);
    assert!(is_ok(&d));
    assert_eq!(value(&d).as_string().unwrap(), "M0,0 L10,0 L10,10 L0,0 Z");
    assert!(is_err_code(&ed.load_svg_res("L 1 1"), "svg_parse"));
}

#[wasm_bindgen_test]
fn send_preview_commit() {
    let mut ed = Editor::new();
    let r = ed.load_svg_res("M0 0 L100 0");
    let id = Float64Array::new(&value(&r)).get_index(0);
    let rev = ed.revision();

    let drag = |dx: f64| action(&format!(
        r#"{{"type":"update","path_id":{},"kind":{{"type":"movePath","offset":{{"x":{},"y":0}}}}}}"#,
        id, dx
    ));
    assert!(is_ok(&ed.preview_res(drag(5.0))));
    assert!(ed.is_previewing());
    assert_eq!(ed.revision(), rev);
    assert!(is_ok(&ed.commit_pending_res()));
    assert_eq!(ed.revision(), rev + 1);
    assert!(ed.undo());
    assert_eq!(ed.revision(), rev);

    assert!(is_err_code(&ed.send_res(action(r#"{"type":"nope"}"#)), "invalid_action"));
}

#[wasm_bindgen_test]
fn selectors_validate_arguments() {
    let mut ed = Editor::new();
    let r = ed.load_svg_res("M0 0 L100 0");
    let id = Float64Array::new(&value(&r)).get_index(0);

    let hit = ed.hit_test_res(50.0, 4.0, Some(10.0));
    assert_eq!(value(&hit).as_f64(), Some(id));
    assert!(value(&ed.hit_test_res(50.0, 11.0, Some(10.0))).is_null());
    assert!(is_err_code(&ed.hit_test_res(f64::NAN, 0.0, None), "non_finite"));
    assert!(is_err_code(&ed.pick_res(0.0, 0.0, -1.0), "out_of_range"));
    assert!(is_err_code(&ed.path_res(-1.0), "invalid_id"));
    assert!(is_err_code(&ed.path_res(123_456_789.0), "invalid_id"));
    assert!(is_ok(&ed.path_res(id)));
}

#[wasm_bindgen_test]
fn document_round_trip() {
    let mut ed = Editor::new();
    ed.load_svg_res("M0 0 C 0 10 10 10 10 0");
    let json = value(&ed.to_json_res()).as_string().unwrap();
    let mut other = Editor::new();
    assert!(is_ok(&other.load_document_res(&json)));
    assert_eq!(other.path_ids(), ed.path_ids());
    assert!(is_err_code(&other.load_document_res(r#"{"version":9,"events":[]}"#), "unsupported_version"));
}

#[wasm_bindgen_test]
fn subscribers_hear_commits() {
    let mut ed = Editor::new();
    let seen = js_sys::Array::new();
    let f = Function::new_with_args("kind", "this.push(kind)");
    let bound = f.bind(&seen);
    let handle = ed.subscribe(bound);
    ed.load_svg_res("M0 0 L1 1");
    assert_eq!(seen.length(), 1);
    assert_eq!(seen.get(0).as_string().unwrap(), "replayed");
    assert!(ed.unsubscribe(handle));
}
