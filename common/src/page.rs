//! DOM抽象化
//!
//! ブラウザ（web-sys）とテスト用のメモリ上ページの両方がこのトレイトを実装する。
//! すべての呼び出しはUIスレッド上で同期的に行われる。

use crate::error::Result;
use crate::selector::Selector;

/// 変更イベントハンドラ
pub type ChangeHandler = Box<dyn FnMut()>;

/// フォームを含むページ
pub trait Page: Clone + 'static {
    /// 要素ハンドル（複製は同一要素を指す）
    type Node: Clone + PartialEq + 'static;
    /// ユーザーが選択したローカルファイル
    type File: 'static;

    /// 文書全体を表すルート要素
    fn root(&self) -> Self::Node;

    fn by_id(&self, id: &str) -> Option<Self::Node>;

    /// `root` 配下（root自身は含まない）で一致する要素を文書順に返す
    fn query_all(&self, root: &Self::Node, selector: &Selector) -> Vec<Self::Node>;

    fn query_first(&self, root: &Self::Node, selector: &Selector) -> Option<Self::Node> {
        self.query_all(root, selector).into_iter().next()
    }

    /// 自身を含む最も近い祖先で一致する要素
    fn closest(&self, node: &Self::Node, selector: &Selector) -> Option<Self::Node>;

    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attr(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    fn remove_attr(&self, node: &Self::Node, name: &str) -> Result<()>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool {
        self.attr(node, "class")
            .map(|c| c.split_whitespace().any(|item| item == class))
            .unwrap_or(false)
    }

    fn is_disabled(&self, node: &Self::Node) -> bool;

    fn is_checked(&self, node: &Self::Node) -> bool;

    fn set_checked(&self, node: &Self::Node, checked: bool);

    fn value(&self, node: &Self::Node) -> String;

    fn set_value(&self, node: &Self::Node, value: &str);

    fn set_hidden(&self, node: &Self::Node, hidden: bool);

    fn set_text(&self, node: &Self::Node, text: &str);

    fn create_element(&self, tag: &str) -> Result<Self::Node>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    /// `anchor` の直後の兄弟として挿入
    fn insert_after(&self, anchor: &Self::Node, node: &Self::Node) -> Result<()>;

    /// 文書に接続されているか（削除された行の中なら false）
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// 変更イベントを購読する（購読は要素の寿命まで続く）
    fn on_change(&self, node: &Self::Node, handler: ChangeHandler);

    /// ファイル入力で現在選択されている先頭ファイル
    fn selected_file(&self, input: &Self::Node) -> Option<Self::File>;
}
