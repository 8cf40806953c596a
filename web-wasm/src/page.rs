//! web-sys によるページ実装

use crate::js_bindings::{has_jquery, on_jquery_change};
use apiary_forms_common::{ChangeHandler, Error, Page, Result, Selector};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, File, HtmlElement, HtmlInputElement, HtmlSelectElement};

fn dom_error(context: &str, e: JsValue) -> Error {
    Error::Dom(format!("{}: {:?}", context, e))
}

/// ブラウザの文書
#[derive(Clone)]
pub struct WebPage {
    document: Document,
    root: Element,
    jquery: bool,
}

impl WebPage {
    pub fn new(document: Document) -> Result<Self> {
        let root = document
            .document_element()
            .ok_or_else(|| Error::ElementNotFound("documentElement".into()))?;
        Ok(Self {
            document,
            root,
            jquery: has_jquery(),
        })
    }
}

impl Page for WebPage {
    type Node = Element;
    type File = File;

    fn root(&self) -> Element {
        self.root.clone()
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_all(&self, root: &Element, selector: &Selector) -> Vec<Element> {
        let list = match root.query_selector_all(&selector.to_css()) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("querySelectorAll({}) failed: {:?}", selector, e);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn closest(&self, node: &Element, selector: &Selector) -> Option<Element> {
        node.closest(&selector.to_css()).ok().flatten()
    }

    fn attr(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attr(&self, node: &Element, name: &str, value: &str) -> Result<()> {
        node.set_attribute(name, value)
            .map_err(|e| dom_error("setAttribute", e))
    }

    fn remove_attr(&self, node: &Element, name: &str) -> Result<()> {
        node.remove_attribute(name)
            .map_err(|e| dom_error("removeAttribute", e))
    }

    fn is_disabled(&self, node: &Element) -> bool {
        if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            return select.disabled();
        }
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            return input.disabled();
        }
        node.has_attribute("disabled")
    }

    fn is_checked(&self, node: &Element) -> bool {
        node.dyn_ref::<HtmlInputElement>()
            .map(|input| input.checked())
            .unwrap_or(false)
    }

    fn set_checked(&self, node: &Element, checked: bool) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn value(&self, node: &Element) -> String {
        if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            return select.value();
        }
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            return input.value();
        }
        node.get_attribute("value").unwrap_or_default()
    }

    fn set_value(&self, node: &Element, value: &str) {
        if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn set_hidden(&self, node: &Element, hidden: bool) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            element.set_hidden(hidden);
        }
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn create_element(&self, tag: &str) -> Result<Element> {
        self.document
            .create_element(tag)
            .map_err(|e| dom_error("createElement", e))
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<()> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| dom_error("appendChild", e))
    }

    fn insert_after(&self, anchor: &Element, node: &Element) -> Result<()> {
        anchor
            .insert_adjacent_element("afterend", node)
            .map(|_| ())
            .map_err(|e| dom_error("insertAdjacentElement", e))
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn on_change(&self, node: &Element, handler: ChangeHandler) {
        // 関数はJS側に渡し、要素と一緒に回収させる
        let callback = Closure::wrap(handler).into_js_value();

        // select2 は jQuery の change しか発火しないため、jQuery があればそちらで購読する
        if self.jquery {
            on_jquery_change(node, callback.unchecked_ref());
        } else if let Err(e) = node.add_event_listener_with_callback("change", callback.unchecked_ref())
        {
            log::warn!("addEventListener(change) failed: {:?}", e);
        }
    }

    fn selected_file(&self, input: &Element) -> Option<File> {
        input.dyn_ref::<HtmlInputElement>()?.files()?.get(0)
    }
}
