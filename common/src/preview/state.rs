//! プレビュー状態
//!
//! 初期URL・ローカル選択・クリア指定の3つから表示内容を導出する。
//! 表示内容は保持せず、イベントごとに `view()` で再計算する。

/// ファイル読込1回ごとの通し番号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTicket(u64);

/// ローカルで選択されたファイルの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    /// 読込済み（data URL）
    Decoded(String),
    /// 読込に失敗した
    Undecodable,
}

/// 描画すべき内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewView {
    pub image_url: Option<String>,
    pub link_url: Option<String>,
}

impl PreviewView {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.image_url.is_none()
    }
}

/// 読込完了の扱い
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// 最新の読込が成功した（クリア指定は解除済み）
    Applied,
    /// 最新の読込が失敗した
    Failed,
    /// より新しい操作があったため破棄
    Stale,
}

/// ファイル入力1つ分のプレビュー状態
#[derive(Debug, Clone)]
pub struct PreviewState {
    initial_url: Option<String>,
    selection: Selection,
    clear_requested: bool,
    issued: u64,
}

impl PreviewState {
    pub fn new(initial_url: Option<String>, clear_requested: bool) -> Self {
        Self {
            initial_url: initial_url.filter(|url| !url.is_empty()),
            selection: Selection::None,
            clear_requested,
            issued: 0,
        }
    }

    pub fn initial_url(&self) -> Option<&str> {
        self.initial_url.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clear_requested(&self) -> bool {
        self.clear_requested
    }

    /// 現在の状態から表示内容を導出
    pub fn view(&self) -> PreviewView {
        if self.clear_requested {
            return PreviewView::empty();
        }
        match &self.selection {
            Selection::Decoded(data_url) => PreviewView {
                image_url: Some(data_url.clone()),
                link_url: None,
            },
            Selection::Undecodable => PreviewView::empty(),
            Selection::None => PreviewView {
                image_url: self.initial_url.clone(),
                link_url: self.initial_url.clone(),
            },
        }
    }

    /// クリア用チェックボックスの変更
    ///
    /// チェック時はローカル選択と未完了の読込を捨てる。
    pub fn set_clear(&mut self, checked: bool) {
        self.clear_requested = checked;
        if checked {
            self.selection = Selection::None;
            self.invalidate_reads();
        }
    }

    /// ファイル選択が空になった
    pub fn discard_selection(&mut self) {
        self.selection = Selection::None;
        self.invalidate_reads();
    }

    /// 新しい読込を開始し、その番号を返す（以前の番号はすべて無効になる）
    pub fn begin_read(&mut self) -> ReadTicket {
        self.issued += 1;
        ReadTicket(self.issued)
    }

    pub fn is_current(&self, ticket: ReadTicket) -> bool {
        ticket.0 == self.issued
    }

    /// 読込完了を反映
    pub fn complete_read(&mut self, ticket: ReadTicket, decoded: Option<String>) -> ReadOutcome {
        if !self.is_current(ticket) {
            return ReadOutcome::Stale;
        }
        match decoded {
            Some(data_url) => {
                self.selection = Selection::Decoded(data_url);
                self.clear_requested = false;
                ReadOutcome::Applied
            }
            None => {
                self.selection = Selection::Undecodable;
                ReadOutcome::Failed
            }
        }
    }

    fn invalidate_reads(&mut self) {
        self.issued += 1;
    }
}
