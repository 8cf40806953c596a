//! 依存フィールドセットの表示切替
//!
//! 起点コントロールの値に応じて、対応するコンテナだけを表示し他は隠す。

use crate::error::{Error, Result};
use crate::page::Page;
use crate::selector::Selector;
use std::rc::Rc;

/// 値 → 表示するコンテナ（クラス名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRule {
    pub value: String,
    pub containers: Vec<String>,
}

impl VisibilityRule {
    pub fn new(value: &str, containers: &[&str]) -> Self {
        Self {
            value: value.to_string(),
            containers: containers.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// 起点コントロールと表示規則の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRules {
    driver_id: String,
    rules: Vec<VisibilityRule>,
}

impl Default for VisibilityRules {
    fn default() -> Self {
        Self::review_type()
    }
}

impl VisibilityRules {
    pub fn new(driver_id: &str, rules: Vec<VisibilityRule>) -> Self {
        Self {
            driver_id: driver_id.to_string(),
            rules,
        }
    }

    /// レビュー種別による収穫・給餌欄の切替
    pub fn review_type() -> Self {
        Self::new(
            "id_review_type",
            vec![
                VisibilityRule::new("colheita", &["harvest-group"]),
                VisibilityRule::new("alimentacao", &["feeding-group"]),
            ],
        )
    }

    pub fn driver_id(&self) -> &str {
        &self.driver_id
    }

    /// 管理対象のコンテナ（重複なし、定義順）
    pub fn managed(&self) -> Vec<&str> {
        let mut managed: Vec<&str> = Vec::new();
        for container in self.rules.iter().flat_map(|r| r.containers.iter()) {
            if !managed.contains(&container.as_str()) {
                managed.push(container.as_str());
            }
        }
        managed
    }

    /// 値に対する各コンテナの表示可否
    pub fn evaluate(&self, value: &str) -> Vec<(&str, bool)> {
        let visible: Vec<&str> = self
            .rules
            .iter()
            .filter(|rule| rule.value == value)
            .flat_map(|rule| rule.containers.iter().map(String::as_str))
            .collect();

        self.managed()
            .into_iter()
            .map(|container| (container, visible.contains(&container)))
            .collect()
    }
}

/// 起点コントロールを監視して表示を切り替える
pub struct FieldsetVisibilityWatcher<P> {
    page: P,
    rules: Rc<VisibilityRules>,
}

impl<P: Page> FieldsetVisibilityWatcher<P> {
    pub fn new(page: P, rules: VisibilityRules) -> Self {
        Self {
            page,
            rules: Rc::new(rules),
        }
    }

    /// 現在値で一度評価してから変更を購読する
    pub fn bind(&self) -> Result<()> {
        let driver = self
            .page
            .by_id(self.rules.driver_id())
            .ok_or_else(|| Error::ElementNotFound(format!("#{}", self.rules.driver_id())))?;

        apply(&self.page, &self.rules, &self.page.value(&driver));

        let page = self.page.clone();
        let rules = Rc::clone(&self.rules);
        let watched = driver.clone();
        self.page.on_change(
            &driver,
            Box::new(move || {
                let value = page.value(&watched);
                apply(&page, &rules, &value);
            }),
        );
        Ok(())
    }
}

fn apply<P: Page>(page: &P, rules: &VisibilityRules, value: &str) {
    let root = page.root();
    for (container, visible) in rules.evaluate(value) {
        for node in page.query_all(&root, &Selector::class(container)) {
            page.set_hidden(&node, !visible);
        }
    }
    log::debug!("visibility: {} = {:?}", rules.driver_id(), value);
}
