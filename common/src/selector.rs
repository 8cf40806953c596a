//! 構造化セレクタ
//!
//! ブラウザ側ではCSS文字列に変換し、メモリ上のページでは直接照合する。

use std::fmt;

/// 単純セレクタ（タグ・クラス・属性の完全一致のみ）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
}

impl Selector {
    /// タグ名で絞り込むセレクタ
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_lowercase()),
            ..Default::default()
        }
    }

    /// クラス名で絞り込むセレクタ
    pub fn class(class: &str) -> Self {
        Self::default().with_class(class)
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// 要素がセレクタに一致するか
    ///
    /// `attr` は属性名から値を引く関数。`class` 属性もこれ経由で読む。
    pub fn matches<F>(&self, tag: &str, attr: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = attr("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }

        self.attrs
            .iter()
            .all(|(name, value)| attr(name).as_deref() == Some(value.as_str()))
    }

    /// CSSセレクタ文字列に変換
    pub fn to_css(&self) -> String {
        let mut css = self.tag.clone().unwrap_or_default();
        for class in &self.classes {
            css.push('.');
            css.push_str(class);
        }
        for (name, value) in &self.attrs {
            css.push_str(&format!("[{}=\"{}\"]", name, value.replace('"', "\\\"")));
        }
        if css.is_empty() {
            css.push('*');
        }
        css
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
