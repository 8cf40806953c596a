//! Apiary Forms (WASM)
//!
//! 管理画面のフォームを拡張する。select2 と FileReader はブラウザ側の機能を使う。

mod app;
mod js_bindings;
mod logger;

pub mod decoder;
pub mod page;
pub mod select2;

pub use app::{install, WebDispatcher};

use wasm_bindgen::prelude::*;
use web_sys::Element;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Warn);

    if let Err(e) = app::boot() {
        log::warn!("form enhancement disabled: {}", e);
    }
}

/// 動的に挿入した部分木を拡張する
#[wasm_bindgen(js_name = "onSubtreeInserted")]
pub fn on_subtree_inserted(root: Element) {
    app::on_subtree_inserted(&root);
}
