//! In-memory board used by the unit tests

use std::cell::RefCell;
use std::collections::HashSet;

use async_trait::async_trait;

use crate::column::BoardDom;
use crate::controller::{MoveBackend, MoveFeedback, MoveRejected};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FakeNode {
    Card(String),
    Column(String),
}

#[derive(Debug)]
struct FakeColumn {
    id: String,
    cards: Vec<String>,
    placeholder: bool,
}

#[derive(Debug, Default)]
pub struct FakeBoard {
    columns: RefCell<Vec<FakeColumn>>,
    dragging: RefCell<HashSet<String>>,
    hovered: RefCell<HashSet<String>>,
    without_id: RefCell<HashSet<FakeNode>>,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column holding `cards`, without touching its placeholder
    pub fn with_column(self, id: &str, cards: &[&str]) -> Self {
        self.columns.borrow_mut().push(FakeColumn {
            id: id.to_string(),
            cards: cards.iter().map(|c| c.to_string()).collect(),
            placeholder: false,
        });
        self
    }

    /// Render placeholders the way the server does
    pub fn rendered(self) -> Self {
        for col in self.columns.borrow_mut().iter_mut() {
            col.placeholder = col.cards.is_empty();
        }
        self
    }

    pub fn list(&self, id: &str) -> FakeNode {
        FakeNode::Column(id.to_string())
    }

    pub fn card(&self, id: &str) -> FakeNode {
        FakeNode::Card(id.to_string())
    }

    pub fn strip_id(&self, node: &FakeNode) {
        self.without_id.borrow_mut().insert(node.clone());
    }

    pub fn cards_in(&self, column: &str) -> Vec<String> {
        self.columns
            .borrow()
            .iter()
            .find(|c| c.id == column)
            .map(|c| c.cards.clone())
            .unwrap_or_default()
    }

    pub fn is_dragging(&self, card: &str) -> bool {
        self.dragging.borrow().contains(card)
    }

    pub fn is_hovered(&self, column: &str) -> bool {
        self.hovered.borrow().contains(column)
    }

    /// Every column satisfies "placeholder iff empty"
    pub fn placeholders_consistent(&self) -> bool {
        self.columns
            .borrow()
            .iter()
            .all(|c| c.placeholder == c.cards.is_empty())
    }

    fn with_col<R>(&self, node: &FakeNode, f: impl FnOnce(&mut FakeColumn) -> R) -> Option<R> {
        let FakeNode::Column(id) = node else { return None };
        self.columns.borrow_mut().iter_mut().find(|c| &c.id == id).map(f)
    }
}

impl BoardDom for FakeBoard {
    type Node = FakeNode;

    fn task_id(&self, card: &FakeNode) -> Option<String> {
        if self.without_id.borrow().contains(card) {
            return None;
        }
        match card {
            FakeNode::Card(id) => Some(id.clone()),
            FakeNode::Column(_) => None,
        }
    }

    fn column_id(&self, zone: &FakeNode) -> Option<String> {
        if self.without_id.borrow().contains(zone) {
            return None;
        }
        match zone {
            FakeNode::Column(id) => Some(id.clone()),
            FakeNode::Card(_) => None,
        }
    }

    fn parent_list(&self, card: &FakeNode) -> Option<FakeNode> {
        let FakeNode::Card(id) = card else { return None };
        self.columns
            .borrow()
            .iter()
            .find(|c| c.cards.contains(id))
            .map(|c| FakeNode::Column(c.id.clone()))
    }

    fn next_card(&self, card: &FakeNode) -> Option<FakeNode> {
        let FakeNode::Card(id) = card else { return None };
        let columns = self.columns.borrow();
        let col = columns.iter().find(|c| c.cards.contains(id))?;
        let idx = col.cards.iter().position(|c| c == id)?;
        col.cards.get(idx + 1).map(|c| FakeNode::Card(c.clone()))
    }

    fn insert_card(&self, list: &FakeNode, card: &FakeNode, before: Option<&FakeNode>) {
        let FakeNode::Card(id) = card else { return };
        for col in self.columns.borrow_mut().iter_mut() {
            col.cards.retain(|c| c != id);
        }
        let id = id.clone();
        self.with_col(list, |col| {
            let at = match before {
                Some(FakeNode::Card(b)) => col.cards.iter().position(|c| c == b),
                _ => None,
            };
            match at {
                Some(idx) => col.cards.insert(idx, id),
                None => col.cards.push(id),
            }
        });
    }

    fn task_count(&self, list: &FakeNode) -> usize {
        self.with_col(list, |c| c.cards.len()).unwrap_or(0)
    }

    fn has_placeholder(&self, list: &FakeNode) -> bool {
        self.with_col(list, |c| c.placeholder).unwrap_or(false)
    }

    fn add_placeholder(&self, list: &FakeNode) {
        self.with_col(list, |c| c.placeholder = true);
    }

    fn remove_placeholder(&self, list: &FakeNode) {
        self.with_col(list, |c| c.placeholder = false);
    }

    fn set_dragging(&self, card: &FakeNode, on: bool) {
        let FakeNode::Card(id) = card else { return };
        if on {
            self.dragging.borrow_mut().insert(id.clone());
        } else {
            self.dragging.borrow_mut().remove(id);
        }
    }

    fn set_drop_hover(&self, zone: &FakeNode, on: bool) {
        let FakeNode::Column(id) = zone else { return };
        if on {
            self.hovered.borrow_mut().insert(id.clone());
        } else {
            self.hovered.borrow_mut().remove(id);
        }
    }
}

/// Backend answering every move the same way until told otherwise
pub struct FakeBackend {
    answer: RefCell<Result<(), MoveRejected>>,
    calls: RefCell<Vec<(String, String)>>,
}

impl FakeBackend {
    pub fn accepting() -> Self {
        Self { answer: RefCell::new(Ok(())), calls: RefCell::default() }
    }

    pub fn rejecting(status: u16) -> Self {
        Self { answer: RefCell::new(Err(MoveRejected::Status(status))), calls: RefCell::default() }
    }

    pub fn unreachable() -> Self {
        Self {
            answer: RefCell::new(Err(MoveRejected::Transport("connection refused".into()))),
            calls: RefCell::default(),
        }
    }

    /// Change the answer for every following call
    pub fn answer_with(&self, answer: Result<(), MoveRejected>) {
        *self.answer.borrow_mut() = answer;
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl MoveBackend for FakeBackend {
    async fn move_task(&self, task_id: &str, column_id: &str) -> Result<(), MoveRejected> {
        self.calls.borrow_mut().push((task_id.to_string(), column_id.to_string()));
        self.answer.borrow().clone()
    }
}

#[derive(Default)]
pub struct FeedbackLog {
    pub moved: RefCell<Vec<(String, String)>>,
    pub failed: RefCell<Vec<(String, MoveRejected)>>,
}

impl MoveFeedback for FeedbackLog {
    fn moved(&self, task_id: &str, column_id: &str) {
        self.moved.borrow_mut().push((task_id.to_string(), column_id.to_string()));
    }

    fn move_failed(&self, task_id: &str, error: &MoveRejected) {
        self.failed.borrow_mut().push((task_id.to_string(), error.clone()));
    }
}
