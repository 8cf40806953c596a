//! JavaScript Bridge バインディング
//!
//! jQuery / select2 はJavaScript側にしか存在しないため、
//! 呼び出しは js/select2-bridge.js に委譲する。

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::Element;

#[wasm_bindgen(module = "/js/select2-bridge.js")]
extern "C" {
    /// ページに jQuery（django.jQuery を含む）があるか
    #[wasm_bindgen(js_name = "hasJquery")]
    pub fn has_jquery() -> bool;

    /// jQuery に select2 プラグインが登録されているか
    #[wasm_bindgen(js_name = "hasSelect2")]
    pub fn has_select2() -> bool;

    /// select2 を適用
    ///
    /// # Arguments
    /// * `element` - 対象の select 要素
    /// * `options` - select2 のオプションオブジェクト
    #[wasm_bindgen(js_name = "applySelect2", catch)]
    pub fn apply_select2(element: &Element, options: &JsValue) -> Result<(), JsValue>;

    /// jQuery 経由で change を購読（select2 が発火する jQuery イベントも受け取る）
    #[wasm_bindgen(js_name = "onJqueryChange")]
    pub fn on_jquery_change(element: &Element, callback: &Function);

    /// 旧来の jQuery 版 formset イベントを全ての jQuery で購読（引数は対象の行要素）
    ///
    /// # Arguments
    /// * `name` - `formset:added` / `formset:removed`
    /// * `callback` - 行要素を受け取る関数
    #[wasm_bindgen(js_name = "onLegacyFormsetEvent")]
    pub fn on_legacy_formset_event(name: &str, callback: &Function);
}
