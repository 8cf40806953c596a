//! Apiary Forms Common Library
//!
//! 管理画面フォームの拡張レイヤ（検索可能セレクト・画像プレビュー・フィールドセット切替）。
//! DOMは `Page` トレイト越しに扱うため、ブラウザ外でもテストできる。

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod page;
pub mod preview;
pub mod scanner;
pub mod select;
pub mod selector;
pub mod visibility;

#[cfg(test)]
mod fake_page;

pub use config::{EnhancementConfig, PreviewConfig, SelectConfig};
pub use dispatcher::{EnhancementDispatcher, ScanReport};
pub use error::{Error, Result};
pub use page::{ChangeHandler, Page};
pub use preview::{ImageDecoder, ImagePreviewController, PreviewState, PreviewView};
pub use scanner::{DomScanner, Predicate};
pub use select::{SearchableSelect, SearchableSelectBinder};
pub use selector::Selector;
pub use visibility::{FieldsetVisibilityWatcher, VisibilityRule, VisibilityRules};
