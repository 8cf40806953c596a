//! 起動処理
//!
//! DOMContentLoaded 後に文書全体を走査し、以降は formset:added で届いた行だけを走査する。

use crate::decoder::DataUrlDecoder;
use crate::js_bindings::on_legacy_formset_event;
use crate::page::WebPage;
use crate::select2::Select2;
use apiary_forms_common::{
    EnhancementConfig, EnhancementDispatcher, Error, Result, ScanReport, SearchableSelect,
};
use gloo::events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

/// `json_script` で埋め込まれる設定の要素ID
const CONFIG_ELEMENT_ID: &str = "form-enhance-config";

const FORMSET_ADDED: &str = "formset:added";
const FORMSET_REMOVED: &str = "formset:removed";

pub type WebDispatcher<S = Select2> = EnhancementDispatcher<WebPage, S, DataUrlDecoder>;

type SubtreeHook = Rc<dyn Fn(&Element)>;

thread_local! {
    static ON_INSERTED: RefCell<Option<SubtreeHook>> = const { RefCell::new(None) };
}

/// 文書の読込状態に応じて起動
pub(crate) fn boot() -> Result<()> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| Error::ElementNotFound("document".into()))?;

    if document.ready_state() == "loading" {
        let ready = document.clone();
        EventListener::once(&document, "DOMContentLoaded", move |_| {
            if let Err(e) = start(ready) {
                log::warn!("form enhancement disabled: {}", e);
            }
        })
        .forget();
        Ok(())
    } else {
        start(document)
    }
}

fn start(document: Document) -> Result<()> {
    let config = load_config(&document);
    log::set_max_level(config.log_level_filter());

    let page = WebPage::new(document.clone())?;
    let dispatcher = EnhancementDispatcher::new(page, Select2::detect(), DataUrlDecoder, config);
    install(&document, dispatcher);
    Ok(())
}

/// 文書全体を走査し、以降の行の追加・削除を購読する
///
/// `onSubtreeInserted` の呼び出しも最後に取り付けたディスパッチャに届く。
pub fn install<S>(document: &Document, dispatcher: WebDispatcher<S>) -> ScanReport
where
    S: SearchableSelect<Node = Element> + 'static,
{
    let dispatcher = Rc::new(dispatcher);
    let report = dispatcher.start();
    if dispatcher.is_enabled() {
        listen_for_rows(document, &dispatcher);
    }

    let hook = Rc::clone(&dispatcher);
    ON_INSERTED.with(|slot| {
        *slot.borrow_mut() = Some(Rc::new(move |root: &Element| {
            hook.on_subtree_inserted(root);
        }));
    });
    report
}

/// ページ内の設定を読む（なければ既定値、壊れていれば警告して既定値）
fn load_config(document: &Document) -> EnhancementConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
    else {
        return EnhancementConfig::default();
    };

    match EnhancementConfig::from_json(&text) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("invalid #{}: {}", CONFIG_ELEMENT_ID, e);
            EnhancementConfig::default()
        }
    }
}

fn listen_for_rows<S>(document: &Document, dispatcher: &Rc<WebDispatcher<S>>)
where
    S: SearchableSelect<Node = Element> + 'static,
{
    // Django 4.1 以降: 追加された行から bubbles する CustomEvent
    let added = Rc::clone(dispatcher);
    EventListener::new(document, FORMSET_ADDED, move |event| {
        if let Some(row) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
            added.on_subtree_inserted(&row);
        }
    })
    .forget();

    // 削除は行を外した後に document で発火する
    let removed = Rc::clone(dispatcher);
    EventListener::new(document, FORMSET_REMOVED, move |_| {
        removed.on_subtree_removed();
    })
    .forget();

    // 旧来の jQuery 版トリガー
    let legacy_added = Rc::clone(dispatcher);
    let on_added = Closure::wrap(Box::new(move |row: JsValue| {
        if let Ok(row) = row.dyn_into::<Element>() {
            legacy_added.on_subtree_inserted(&row);
        }
    }) as Box<dyn FnMut(JsValue)>);
    on_legacy_formset_event(FORMSET_ADDED, on_added.as_ref().unchecked_ref());
    on_added.forget();

    let legacy_removed = Rc::clone(dispatcher);
    let on_removed = Closure::wrap(Box::new(move |_: JsValue| {
        legacy_removed.on_subtree_removed();
    }) as Box<dyn FnMut(JsValue)>);
    on_legacy_formset_event(FORMSET_REMOVED, on_removed.as_ref().unchecked_ref());
    on_removed.forget();
}

/// 任意の動的行の仕組みから、挿入した部分木を渡してもらう入口
pub fn on_subtree_inserted(root: &Element) {
    let hook = ON_INSERTED.with(|slot| slot.borrow().clone());
    match hook {
        Some(hook) => hook(root),
        None => log::debug!("onSubtreeInserted called before start; ignored"),
    }
}
