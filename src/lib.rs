use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Editor { pub(crate) inner: pathedit::Editor }

impl Editor {
    pub fn rs_new() -> Editor { Editor { inner: pathedit::Editor::new() } }
    pub fn rs_revision(&self) -> usize { self.inner.document().len() }
}
