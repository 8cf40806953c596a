//! 拡張処理の振り分け
//!
//! ページ読込時に文書全体を一度走査し、その後は「行追加」で届いた部分木だけを走査する。
//! 検索セレクト機能がなければレイヤ全体が何もしない。
//! ここで発生したエラーはすべてログに残して握りつぶす。

use crate::config::EnhancementConfig;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::preview::{ImageDecoder, ImagePreviewController};
use crate::scanner::{DomScanner, Predicate};
use crate::select::{SearchableSelect, SearchableSelectBinder};
use crate::visibility::FieldsetVisibilityWatcher;

/// 1回の走査で拡張した要素数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub selects_bound: usize,
    pub previews_initialised: usize,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.selects_bound == 0 && self.previews_initialised == 0
    }
}

/// 拡張レイヤの入口
pub struct EnhancementDispatcher<P: Page, S, D: ImageDecoder> {
    page: P,
    scanner: DomScanner,
    selects: Option<SearchableSelectBinder<S>>,
    previews: ImagePreviewController<P, D>,
    visibility: FieldsetVisibilityWatcher<P>,
}

impl<P, S, D> EnhancementDispatcher<P, S, D>
where
    P: Page,
    S: SearchableSelect<Node = P::Node>,
    D: ImageDecoder<File = P::File>,
{
    /// `capability` の有無はここで一度だけ判定する
    pub fn new(page: P, capability: Option<S>, decoder: D, config: EnhancementConfig) -> Self {
        if capability.is_none() {
            log::info!("{}; form enhancement disabled", Error::CapabilityUnavailable);
        }
        let EnhancementConfig {
            select,
            preview,
            template_row_class,
            visibility,
            ..
        } = config;

        Self {
            scanner: DomScanner::new(&template_row_class),
            selects: capability.map(|c| SearchableSelectBinder::new(c, select)),
            previews: ImagePreviewController::new(page.clone(), decoder, preview),
            visibility: FieldsetVisibilityWatcher::new(page.clone(), visibility),
            page,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.selects.is_some()
    }

    fn binder(&self) -> Result<&SearchableSelectBinder<S>> {
        self.selects.as_ref().ok_or(Error::CapabilityUnavailable)
    }

    /// 文書全体を走査し、表示切替を結び付ける
    pub fn start(&self) -> ScanReport {
        if !self.is_enabled() {
            return ScanReport::default();
        }
        let report = self.run(&self.page.root());
        if let Err(e) = self.visibility.bind() {
            log::debug!("visibility watcher skipped: {}", e);
        }
        report
    }

    /// 行追加で挿入された部分木だけを走査
    pub fn on_subtree_inserted(&self, root: &P::Node) -> ScanReport {
        self.run(root)
    }

    /// 行削除の後に呼ぶ。文書から外れた入力のプレビューを破棄する
    pub fn on_subtree_removed(&self) -> usize {
        self.previews.release_detached()
    }

    /// `root` 配下の対象要素を拡張する（対象がなければ何もしない）
    pub fn run(&self, root: &P::Node) -> ScanReport {
        let mut report = ScanReport::default();
        let binder = match self.binder() {
            Ok(binder) => binder,
            Err(e) => {
                log::debug!("scan skipped: {}", e);
                return report;
            }
        };
        self.previews.release_detached();

        for node in self.scanner.find_eligible(&self.page, root, &Predicate::select()) {
            match binder.bind(&self.page, &node) {
                Ok(true) => report.selects_bound += 1,
                Ok(false) => {}
                Err(e) => log::warn!("searchable select failed: {}", e),
            }
        }

        let inputs = self
            .scanner
            .find_eligible(&self.page, root, &Predicate::preview_input());
        for input in inputs {
            match self.previews.initialise(&input) {
                Ok(true) => report.previews_initialised += 1,
                Ok(false) => {}
                Err(e) => log::warn!("image preview failed: {}", e),
            }
        }

        if report.is_empty() {
            log::debug!("scan: nothing to enhance");
        } else {
            log::info!(
                "scan: {} selects, {} previews",
                report.selects_bound,
                report.previews_initialised
            );
        }
        report
    }
}
