//! 設定モジュール
//!
//! 既定値はレビュー管理画面向け。ページ側からJSONで一部を上書きできるが、
//! 表示切替の表は固定でありJSONからは変更できない。

use crate::error::Result;
use crate::visibility::VisibilityRules;
use serde::{Deserialize, Serialize};

/// 拡張レイヤ全体の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnhancementConfig {
    /// ログレベル（"off" / "error" / "warn" / "info" / "debug" / "trace"）
    pub log_level: String,
    pub select: SelectConfig,
    pub preview: PreviewConfig,
    /// 動的フォームセットの雛形行に付くクラス
    pub template_row_class: String,
    #[serde(skip)]
    pub visibility: VisibilityRules,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            select: SelectConfig::default(),
            preview: PreviewConfig::default(),
            template_row_class: "empty-form".into(),
            visibility: VisibilityRules::review_type(),
        }
    }
}

impl EnhancementConfig {
    /// JSON文字列から読み込み（省略した項目は既定値）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// ログレベルを解釈（不明な値は warn）
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}

/// 検索可能セレクトに渡すオプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectConfig {
    pub width: String,
    pub allow_clear: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub dropdown_auto_width: bool,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            width: "100%".into(),
            allow_clear: false,
            placeholder: None,
            dropdown_auto_width: false,
        }
    }
}

/// 画像プレビューの表示設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewConfig {
    pub default_label: String,
    pub default_open_label: String,
    /// クリア用チェックボックスを含むウィジェットのクラス
    pub widget_wrapper_class: String,
    pub row_class: String,
    pub image_class: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            default_label: "Prévia".into(),
            default_open_label: "Abrir em nova aba".into(),
            widget_wrapper_class: "clearable-file-input".into(),
            row_class: "form-row".into(),
            image_class: "thumb-150".into(),
        }
    }
}
