//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// どのエラーも検出地点で処理され、フォーム送信には伝播しない。
#[derive(Error, Debug)]
pub enum Error {
    #[error("searchable select capability is unavailable")]
    CapabilityUnavailable,

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
