//! 画像プレビューの初期化とイベント配線
//!
//! ファイル入力の直後（ウィジェットがあればその直後）にプレビューを挿入し、
//! 入力とクリア用チェックボックスの変更を `PreviewState` に反映して再描画する。

use super::state::{PreviewState, PreviewView, ReadOutcome, ReadTicket};
use crate::config::PreviewConfig;
use crate::error::Result;
use crate::page::Page;
use crate::scanner::{claim, PREVIEW_MARKER};
use crate::selector::Selector;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// 保存済みファイルのURL
pub const INITIAL_URL_ATTR: &str = "data-initial-preview-url";
/// 見出しラベルの上書き
pub const LABEL_ATTR: &str = "data-preview-label";
/// 「開く」リンクの文言の上書き
pub const OPEN_LABEL_ATTR: &str = "data-preview-open-label";

/// ローカルファイルを表示可能な画像ソース（data URL）に非同期で変換する
pub trait ImageDecoder: Clone + 'static {
    type File;
    /// 読込中のハンドル。完了前に破棄すると読込を中止する
    type Pending: 'static;

    /// 完了時に `done` を一度だけ呼ぶ（中止された場合は呼ばない）
    fn decode(&self, file: Self::File, done: Box<dyn FnOnce(Result<String>)>) -> Self::Pending;
}

#[derive(Debug, Clone)]
struct PreviewElements<N> {
    wrapper: N,
    link: N,
    image: N,
}

/// ファイル入力1つ分の配線（状態はこの入力のハンドラだけが触る）
///
/// 所有者はコントローラのみ。イベントハンドラと読込完了は弱参照で届く。
struct PreviewBinding<P: Page, D: ImageDecoder> {
    page: P,
    decoder: D,
    input: P::Node,
    clear_checkbox: Option<P::Node>,
    elements: PreviewElements<P::Node>,
    state: RefCell<PreviewState>,
    pending: RefCell<Option<D::Pending>>,
}

impl<P, D> PreviewBinding<P, D>
where
    P: Page,
    D: ImageDecoder<File = P::File>,
{
    fn on_clear_changed(&self) {
        let Some(checkbox) = &self.clear_checkbox else {
            return;
        };
        let checked = self.page.is_checked(checkbox);
        self.state.borrow_mut().set_clear(checked);
        if checked {
            self.cancel_read();
        }
        if checked && !self.page.value(&self.input).is_empty() {
            self.page.set_value(&self.input, "");
        }
        self.render();
    }

    fn on_input_changed(self: &Rc<Self>) {
        let Some(file) = self.page.selected_file(&self.input) else {
            self.state.borrow_mut().discard_selection();
            self.cancel_read();
            self.render();
            return;
        };

        let ticket = self.state.borrow_mut().begin_read();
        let binding = Rc::downgrade(self);
        let pending = self.decoder.decode(
            file,
            Box::new(move |result: Result<String>| {
                if let Some(binding) = binding.upgrade() {
                    binding.on_read_complete(ticket, result);
                }
            }),
        );
        // 前の読込はここで中止される
        let previous = self.pending.replace(Some(pending));
        drop(previous);
    }

    fn cancel_read(&self) {
        let previous = self.pending.take();
        drop(previous);
    }

    fn on_read_complete(&self, ticket: ReadTicket, result: Result<String>) {
        let decoded = match result {
            Ok(data_url) => Some(data_url),
            Err(e) => {
                log::warn!("image preview: {}", e);
                None
            }
        };

        let outcome = self.state.borrow_mut().complete_read(ticket, decoded);
        match outcome {
            ReadOutcome::Stale => {
                log::debug!("image preview: discarded stale read");
                return;
            }
            ReadOutcome::Applied => {
                // ファイルを選んだ時点で値を残す意思があるとみなす
                if let Some(checkbox) = &self.clear_checkbox {
                    self.page.set_checked(checkbox, false);
                }
            }
            ReadOutcome::Failed => {}
        }
        self.render();
    }

    fn render(&self) {
        let view = self.state.borrow().view();
        if let Err(e) = self.apply(&view) {
            log::warn!("image preview: render failed: {}", e);
        }
    }

    fn apply(&self, view: &PreviewView) -> Result<()> {
        let page = &self.page;
        let PreviewElements { wrapper, link, image } = &self.elements;

        match &view.image_url {
            Some(url) => {
                page.set_attr(image, "src", url)?;
                page.set_hidden(image, false);
                page.set_hidden(wrapper, false);
            }
            None => {
                page.remove_attr(image, "src")?;
                page.set_hidden(image, true);
                page.set_hidden(wrapper, true);
            }
        }

        match &view.link_url {
            Some(url) => {
                page.set_attr(link, "href", url)?;
                page.set_hidden(link, false);
            }
            None => {
                page.remove_attr(link, "href")?;
                page.set_hidden(link, true);
            }
        }
        Ok(())
    }
}

/// 画像プレビューコントローラ
pub struct ImagePreviewController<P: Page, D: ImageDecoder> {
    page: P,
    decoder: D,
    config: PreviewConfig,
    bindings: RefCell<Vec<Rc<PreviewBinding<P, D>>>>,
}

impl<P, D> ImagePreviewController<P, D>
where
    P: Page,
    D: ImageDecoder<File = P::File>,
{
    pub fn new(page: P, decoder: D, config: PreviewConfig) -> Self {
        Self {
            page,
            decoder,
            config,
            bindings: RefCell::new(Vec::new()),
        }
    }

    /// 保持しているプレビューの数
    pub fn live(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// 削除された行の入力に属するプレビューを破棄する（読込中なら中止）
    pub fn release_detached(&self) -> usize {
        let detached = {
            let mut bindings = self.bindings.borrow_mut();
            let (kept, detached): (Vec<_>, Vec<_>) = bindings
                .drain(..)
                .partition(|binding| self.page.is_connected(&binding.input));
            *bindings = kept;
            detached
        };
        let released = detached.len();
        drop(detached);
        if released > 0 {
            log::debug!("image preview: released {} detached inputs", released);
        }
        released
    }

    /// ファイル入力にプレビューを付ける。初期化済みなら何もせず false を返す
    pub fn initialise(&self, input: &P::Node) -> Result<bool> {
        if !claim(&self.page, input, PREVIEW_MARKER) {
            return Ok(false);
        }

        let elements = self.build_elements(input)?;
        let anchor = self.widget_container(input).unwrap_or_else(|| input.clone());
        self.page.insert_after(&anchor, &elements.wrapper)?;

        let clear_checkbox = self.find_clear_checkbox(input);
        let clear_requested = clear_checkbox
            .as_ref()
            .map(|checkbox| self.page.is_checked(checkbox))
            .unwrap_or(false);
        let initial_url = self.page.attr(input, INITIAL_URL_ATTR);

        let binding = Rc::new(PreviewBinding {
            page: self.page.clone(),
            decoder: self.decoder.clone(),
            input: input.clone(),
            clear_checkbox,
            elements,
            state: RefCell::new(PreviewState::new(initial_url, clear_requested)),
            pending: RefCell::new(None),
        });

        if let Some(checkbox) = &binding.clear_checkbox {
            let handler = Rc::downgrade(&binding);
            self.page.on_change(
                checkbox,
                Box::new(move || {
                    if let Some(binding) = handler.upgrade() {
                        binding.on_clear_changed();
                    }
                }),
            );
        }

        let handler: Weak<PreviewBinding<P, D>> = Rc::downgrade(&binding);
        self.page.on_change(
            input,
            Box::new(move || {
                if let Some(binding) = handler.upgrade() {
                    binding.on_input_changed();
                }
            }),
        );

        binding.render();
        self.bindings.borrow_mut().push(binding);
        Ok(true)
    }

    fn build_elements(&self, input: &P::Node) -> Result<PreviewElements<P::Node>> {
        let page = &self.page;
        let label_text = self.label(input, LABEL_ATTR, &self.config.default_label);
        let open_text = self.label(input, OPEN_LABEL_ATTR, &self.config.default_open_label);

        let wrapper = page.create_element("div")?;
        page.set_attr(&wrapper, "class", "image-preview-wrapper")?;
        page.set_hidden(&wrapper, true);

        let header = page.create_element("div")?;
        page.set_attr(&header, "class", "image-preview-header")?;
        page.append_child(&wrapper, &header)?;

        let label = page.create_element("small")?;
        page.set_text(&label, &label_text);
        page.append_child(&header, &label)?;

        let link = page.create_element("a")?;
        page.set_attr(&link, "class", "image-preview-link")?;
        page.set_attr(&link, "target", "_blank")?;
        page.set_attr(&link, "rel", "noopener noreferrer")?;
        page.set_text(&link, &open_text);
        page.set_hidden(&link, true);
        page.append_child(&header, &link)?;

        let image = page.create_element("img")?;
        page.set_attr(&image, "class", &self.config.image_class)?;
        page.set_attr(&image, "alt", &label_text)?;
        page.set_hidden(&image, true);
        page.append_child(&wrapper, &image)?;

        Ok(PreviewElements {
            wrapper,
            link,
            image,
        })
    }

    fn label(&self, input: &P::Node, attr: &str, fallback: &str) -> String {
        self.page
            .attr(input, attr)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    fn widget_container(&self, input: &P::Node) -> Option<P::Node> {
        self.page
            .closest(input, &Selector::class(&self.config.widget_wrapper_class))
            .or_else(|| self.page.closest(input, &Selector::class(&self.config.row_class)))
    }

    fn find_clear_checkbox(&self, input: &P::Node) -> Option<P::Node> {
        let widget = self
            .page
            .closest(input, &Selector::class(&self.config.widget_wrapper_class))?;
        self.page
            .query_first(&widget, &Selector::tag("input").with_attr("type", "checkbox"))
    }
}
