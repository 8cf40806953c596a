//! 検索可能セレクトの適用

use crate::config::SelectConfig;
use crate::error::Result;
use crate::page::Page;
use crate::scanner::{claim, SELECT_MARKER};

/// 通常の select を検索・ページング可能なドロップダウンに変える外部機能
pub trait SearchableSelect {
    type Node;

    fn activate(&self, node: &Self::Node, config: &SelectConfig) -> Result<()>;
}

/// select 要素ごとに一度だけ機能を適用する
pub struct SearchableSelectBinder<S> {
    capability: S,
    config: SelectConfig,
}

impl<S: SearchableSelect> SearchableSelectBinder<S> {
    pub fn new(capability: S, config: SelectConfig) -> Self {
        Self { capability, config }
    }

    /// 機能を適用する。既に適用済みなら何もせず false を返す
    ///
    /// 適用に失敗した場合はマーカーを外し、次の走査で再試行できるようにする。
    pub fn bind<P>(&self, page: &P, node: &P::Node) -> Result<bool>
    where
        P: Page,
        S: SearchableSelect<Node = P::Node>,
    {
        if !claim(page, node, SELECT_MARKER) {
            return Ok(false);
        }
        if let Err(e) = self.capability.activate(node, &self.config) {
            if let Err(release) = page.remove_attr(node, SELECT_MARKER) {
                log::warn!("could not release {}: {}", SELECT_MARKER, release);
            }
            return Err(e);
        }
        Ok(true)
    }
}
