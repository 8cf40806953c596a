//! select2 による検索可能セレクト

use crate::js_bindings::{apply_select2, has_select2};
use apiary_forms_common::{Error, Result, SearchableSelect, SelectConfig};
use web_sys::Element;

/// select2 プラグイン
pub struct Select2;

impl Select2 {
    /// ページに select2 が読み込まれていれば返す
    pub fn detect() -> Option<Self> {
        has_select2().then_some(Self)
    }
}

impl SearchableSelect for Select2 {
    type Node = Element;

    fn activate(&self, node: &Element, config: &SelectConfig) -> Result<()> {
        let options = serde_wasm_bindgen::to_value(config)
            .map_err(|e| Error::Dom(format!("select2 options: {}", e)))?;
        apply_select2(node, &options).map_err(|e| Error::Dom(format!("select2: {:?}", e)))
    }
}
