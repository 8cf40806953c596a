//! 画像プレビュー
//!
//! 保存済みの値・新しく選んだファイル・クリア指定を1つの表示にまとめる。

mod controller;
mod state;

pub use controller::{
    ImageDecoder, ImagePreviewController, INITIAL_URL_ATTR, LABEL_ATTR, OPEN_LABEL_ATTR,
};
pub use state::{PreviewState, PreviewView, ReadOutcome, ReadTicket, Selection};
