//! テスト用のメモリ上ページ
//!
//! アリーナに要素を保持し、変更イベント・ファイル読込・検索セレクトを手動で駆動できる。

use crate::config::SelectConfig;
use crate::error::{Error, Result};
use crate::page::{ChangeHandler, Page};
use crate::preview::ImageDecoder;
use crate::select::SearchableSelect;
use crate::selector::Selector;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct FakeFile {
    pub name: String,
}

#[derive(Default)]
struct FakeNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    checked: bool,
    value: String,
    hidden: bool,
    text: String,
    file: Option<FakeFile>,
    listeners: Vec<Rc<RefCell<ChangeHandler>>>,
}

#[derive(Default)]
struct Arena {
    nodes: Vec<FakeNode>,
}

impl Arena {
    fn node(&self, id: NodeId) -> &FakeNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut FakeNode {
        &mut self.nodes[id.0]
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let node = self.node(id);
        selector.matches(&node.tag, |name| node.attrs.get(name).cloned())
    }

    fn descendants(&self, root: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.node(root).children {
            out.push(*child);
            self.descendants(*child, out);
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }
}

#[derive(Clone)]
pub struct FakePage {
    arena: Rc<RefCell<Arena>>,
}

impl FakePage {
    pub fn new() -> Self {
        let mut arena = Arena::default();
        arena.nodes.push(FakeNode {
            tag: "html".into(),
            ..Default::default()
        });
        Self {
            arena: Rc::new(RefCell::new(arena)),
        }
    }

    /// 子要素を作って `parent` の末尾に追加
    pub fn element(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        let id = NodeId(arena.nodes.len());
        arena.nodes.push(FakeNode {
            tag: tag.to_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            parent: Some(parent),
            ..Default::default()
        });
        arena.node_mut(parent).children.push(id);
        id
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.arena.borrow().node(node).hidden
    }

    pub fn text_of(&self, node: NodeId) -> String {
        self.arena.borrow().node(node).text.clone()
    }

    pub fn tag_of(&self, node: NodeId) -> String {
        self.arena.borrow().node(node).tag.clone()
    }

    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.arena.borrow().node(node).children.clone()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let parent = arena.node(node).parent?;
        let siblings = &arena.node(parent).children;
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.arena.borrow().node(node).listeners.len()
    }

    /// 行の削除（要素ごと切り離す）
    pub fn detach(&self, node: NodeId) {
        self.arena.borrow_mut().detach(node);
    }

    /// ユーザーがファイルを選択（None は選択解除）して change を発火
    pub fn choose_file(&self, input: NodeId, name: Option<&str>) {
        {
            let mut arena = self.arena.borrow_mut();
            let node = arena.node_mut(input);
            node.file = name.map(|n| FakeFile { name: n.to_string() });
            node.value = name.map(|n| format!("C:\\fakepath\\{}", n)).unwrap_or_default();
        }
        self.fire_change(input);
    }

    /// ユーザーがチェックボックスを操作して change を発火
    pub fn click_checkbox(&self, checkbox: NodeId, checked: bool) {
        self.arena.borrow_mut().node_mut(checkbox).checked = checked;
        self.fire_change(checkbox);
    }

    /// ユーザーが値を選んで change を発火
    pub fn choose_value(&self, node: NodeId, value: &str) {
        self.arena.borrow_mut().node_mut(node).value = value.to_string();
        self.fire_change(node);
    }

    pub fn fire_change(&self, node: NodeId) {
        // ハンドラ内でページを操作するため借用を解放してから呼ぶ
        let listeners = self.arena.borrow().node(node).listeners.clone();
        for listener in listeners {
            (listener.borrow_mut())();
        }
    }
}

impl Page for FakePage {
    type Node = NodeId;
    type File = FakeFile;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let mut all = Vec::new();
        arena.descendants(NodeId(0), &mut all);
        all.into_iter()
            .find(|n| arena.node(*n).attrs.get("id").map(String::as_str) == Some(id))
    }

    fn query_all(&self, root: &NodeId, selector: &Selector) -> Vec<NodeId> {
        let arena = self.arena.borrow();
        let mut all = Vec::new();
        arena.descendants(*root, &mut all);
        all.into_iter().filter(|n| arena.matches(*n, selector)).collect()
    }

    fn closest(&self, node: &NodeId, selector: &Selector) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let mut current = Some(*node);
        while let Some(id) = current {
            if arena.matches(id, selector) {
                return Some(id);
            }
            current = arena.node(id).parent;
        }
        None
    }

    fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.arena.borrow().node(*node).attrs.get(name).cloned()
    }

    fn set_attr(&self, node: &NodeId, name: &str, value: &str) -> Result<()> {
        self.arena
            .borrow_mut()
            .node_mut(*node)
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attr(&self, node: &NodeId, name: &str) -> Result<()> {
        self.arena.borrow_mut().node_mut(*node).attrs.remove(name);
        Ok(())
    }

    fn is_disabled(&self, node: &NodeId) -> bool {
        self.arena.borrow().node(*node).attrs.contains_key("disabled")
    }

    fn is_checked(&self, node: &NodeId) -> bool {
        self.arena.borrow().node(*node).checked
    }

    fn set_checked(&self, node: &NodeId, checked: bool) {
        self.arena.borrow_mut().node_mut(*node).checked = checked;
    }

    fn value(&self, node: &NodeId) -> String {
        self.arena.borrow().node(*node).value.clone()
    }

    fn set_value(&self, node: &NodeId, value: &str) {
        let mut arena = self.arena.borrow_mut();
        let node = arena.node_mut(*node);
        node.value = value.to_string();
        if value.is_empty() {
            node.file = None;
        }
    }

    fn set_hidden(&self, node: &NodeId, hidden: bool) {
        self.arena.borrow_mut().node_mut(*node).hidden = hidden;
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.arena.borrow_mut().node_mut(*node).text = text.to_string();
    }

    fn create_element(&self, tag: &str) -> Result<NodeId> {
        let mut arena = self.arena.borrow_mut();
        let id = NodeId(arena.nodes.len());
        arena.nodes.push(FakeNode {
            tag: tag.to_lowercase(),
            ..Default::default()
        });
        Ok(id)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        arena.detach(*child);
        arena.node_mut(*child).parent = Some(*parent);
        arena.node_mut(*parent).children.push(*child);
        Ok(())
    }

    fn insert_after(&self, anchor: &NodeId, node: &NodeId) -> Result<()> {
        let mut arena = self.arena.borrow_mut();
        let parent = arena
            .node(*anchor)
            .parent
            .ok_or_else(|| Error::Dom("anchor has no parent".into()))?;
        arena.detach(*node);
        let index = arena
            .node(parent)
            .children
            .iter()
            .position(|c| c == anchor)
            .ok_or_else(|| Error::Dom("anchor is not a child of its parent".into()))?;
        arena.node_mut(parent).children.insert(index + 1, *node);
        arena.node_mut(*node).parent = Some(parent);
        Ok(())
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        let arena = self.arena.borrow();
        let mut current = *node;
        while let Some(parent) = arena.node(current).parent {
            current = parent;
        }
        current == NodeId(0)
    }

    fn on_change(&self, node: &NodeId, handler: ChangeHandler) {
        self.arena
            .borrow_mut()
            .node_mut(*node)
            .listeners
            .push(Rc::new(RefCell::new(handler)));
    }

    fn selected_file(&self, input: &NodeId) -> Option<FakeFile> {
        self.arena.borrow().node(*input).file.clone()
    }
}

type DecodeCallback = Box<dyn FnOnce(Result<String>)>;

struct PendingRead {
    file: FakeFile,
    done: Option<DecodeCallback>,
    finished: Rc<Cell<bool>>,
    cancelled: Rc<Cell<bool>>,
}

/// 読込中のハンドル（完了前に破棄されると中止扱い）
pub struct FakeReadHandle {
    finished: Rc<Cell<bool>>,
    cancelled: Rc<Cell<bool>>,
}

impl Drop for FakeReadHandle {
    fn drop(&mut self) {
        if !self.finished.get() {
            self.cancelled.set(true);
        }
    }
}

/// 完了を手動で（任意の順序で）通知できるデコーダ
#[derive(Clone, Default)]
pub struct FakeDecoder {
    reads: Rc<RefCell<Vec<PendingRead>>>,
}

impl FakeDecoder {
    /// これまでに発行された読込の数
    pub fn issued(&self) -> usize {
        self.reads.borrow().len()
    }

    /// `index` 番目の読込が完了前に中止されたか
    pub fn cancelled(&self, index: usize) -> bool {
        self.reads.borrow()[index].cancelled.get()
    }

    pub fn data_url(name: &str) -> String {
        format!("data:image/png;base64,{}", name)
    }

    /// `index` 番目の読込を成功させる
    pub fn succeed(&self, index: usize) {
        let (file, done) = self.take(index);
        done(Ok(Self::data_url(&file.name)));
    }

    /// `index` 番目の読込を失敗させる
    pub fn fail(&self, index: usize) {
        let (file, done) = self.take(index);
        done(Err(Error::DecodeFailure(file.name)));
    }

    fn take(&self, index: usize) -> (FakeFile, DecodeCallback) {
        let mut reads = self.reads.borrow_mut();
        let read = &mut reads[index];
        read.finished.set(true);
        let done = read.done.take().expect("read already completed");
        (read.file.clone(), done)
    }
}

impl ImageDecoder for FakeDecoder {
    type File = FakeFile;
    type Pending = FakeReadHandle;

    fn decode(&self, file: FakeFile, done: Box<dyn FnOnce(Result<String>)>) -> FakeReadHandle {
        let finished = Rc::new(Cell::new(false));
        let cancelled = Rc::new(Cell::new(false));
        self.reads.borrow_mut().push(PendingRead {
            file,
            done: Some(done),
            finished: finished.clone(),
            cancelled: cancelled.clone(),
        });
        FakeReadHandle {
            finished,
            cancelled,
        }
    }
}

/// 有効化された要素を記録する検索セレクト
#[derive(Clone, Default)]
pub struct RecordingSelect {
    activated: Rc<RefCell<Vec<(NodeId, SelectConfig)>>>,
    failing: bool,
}

impl RecordingSelect {
    /// 適用のたびに例外を返す（記録はする）
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn activations(&self) -> Vec<NodeId> {
        self.activated.borrow().iter().map(|(n, _)| *n).collect()
    }

    pub fn last_config(&self) -> Option<SelectConfig> {
        self.activated.borrow().last().map(|(_, c)| c.clone())
    }
}

impl SearchableSelect for RecordingSelect {
    type Node = NodeId;

    fn activate(&self, node: &NodeId, config: &SelectConfig) -> Result<()> {
        self.activated.borrow_mut().push((*node, config.clone()));
        if self.failing {
            return Err(Error::Dom("select2 threw".into()));
        }
        Ok(())
    }
}
