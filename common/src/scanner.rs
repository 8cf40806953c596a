//! 対象要素の探索
//!
//! 指定した部分木から、まだ拡張されていない対象コントロールを集める。
//! 読み取りのみで副作用はない。

use crate::page::Page;
use crate::selector::Selector;

/// セレクトの初期化済みマーカー
pub const SELECT_MARKER: &str = "data-select2-initialized";
/// 他のスクリプトが select2 化した要素に付くクラス
pub const SELECT_ENHANCED_CLASS: &str = "select2-hidden-accessible";
/// プレビュー対象であることを示す属性
pub const PREVIEW_OPT_IN: &str = "data-image-preview";
/// プレビューの初期化済みマーカー
pub const PREVIEW_MARKER: &str = "data-image-preview-initialised";

/// フォームセットの雛形行で使われる名前の断片
const TEMPLATE_PREFIX: &str = "__prefix__";

/// 拡張対象の条件
#[derive(Debug, Clone)]
pub struct Predicate {
    selector: Selector,
    marker: &'static str,
    enhanced_class: Option<&'static str>,
    skip_disabled: bool,
}

impl Predicate {
    /// 無効化されていない未初期化の select
    pub fn select() -> Self {
        Self {
            selector: Selector::tag("select"),
            marker: SELECT_MARKER,
            enhanced_class: Some(SELECT_ENHANCED_CLASS),
            skip_disabled: true,
        }
    }

    /// プレビュー指定のある未初期化のファイル入力
    pub fn preview_input() -> Self {
        Self {
            selector: Selector::tag("input")
                .with_attr("type", "file")
                .with_attr(PREVIEW_OPT_IN, "true"),
            marker: PREVIEW_MARKER,
            enhanced_class: None,
            skip_disabled: false,
        }
    }
}

/// マーカーが付いているか
pub fn is_marked<P: Page>(page: &P, node: &P::Node, marker: &str) -> bool {
    page.attr(node, marker).as_deref() == Some("true")
}

/// マーカーの確認と設定を一度に行う
///
/// 初めて取得した場合のみ true。設定できなかった要素は拡張しない。
pub fn claim<P: Page>(page: &P, node: &P::Node, marker: &str) -> bool {
    if is_marked(page, node, marker) {
        return false;
    }
    match page.set_attr(node, marker, "true") {
        Ok(()) => true,
        Err(e) => {
            log::warn!("could not set {}: {}", marker, e);
            false
        }
    }
}

/// 部分木から対象要素を探す
#[derive(Debug, Clone)]
pub struct DomScanner {
    template_row: Selector,
}

impl DomScanner {
    pub fn new(template_row_class: &str) -> Self {
        Self {
            template_row: Selector::class(template_row_class),
        }
    }

    /// `root` 配下の対象要素を文書順に返す
    pub fn find_eligible<P: Page>(
        &self,
        page: &P,
        root: &P::Node,
        predicate: &Predicate,
    ) -> Vec<P::Node> {
        page.query_all(root, &predicate.selector)
            .into_iter()
            .filter(|node| !is_marked(page, node, predicate.marker))
            .filter(|node| match predicate.enhanced_class {
                Some(class) => !page.has_class(node, class),
                None => true,
            })
            .filter(|node| !(predicate.skip_disabled && page.is_disabled(node)))
            .filter(|node| !self.is_template(page, node))
            .collect()
    }

    /// 雛形行の中の要素（複製元なので拡張してはいけない）
    fn is_template<P: Page>(&self, page: &P, node: &P::Node) -> bool {
        let prefixed = page
            .attr(node, "name")
            .map(|name| name.contains(TEMPLATE_PREFIX))
            .unwrap_or(false);
        prefixed || page.closest(node, &self.template_row).is_some()
    }
}
