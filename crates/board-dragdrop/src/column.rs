//! Column Access
//!
//! The operations the move protocol needs from the rendered board.

/// View of the board markup.
///
/// A column is a dropzone list holding task cards and, when it has no
/// cards, a single "empty" placeholder item. DOM parentage is the source of
/// truth for which column a card is in.
pub trait BoardDom {
    /// Handle to a card or column element
    type Node: Clone + PartialEq;

    /// `data-task-id` of a card
    fn task_id(&self, card: &Self::Node) -> Option<String>;
    /// `data-column-id` of a dropzone
    fn column_id(&self, zone: &Self::Node) -> Option<String>;

    /// The list a card currently sits in
    fn parent_list(&self, card: &Self::Node) -> Option<Self::Node>;
    /// The card that directly follows `card` in its list
    fn next_card(&self, card: &Self::Node) -> Option<Self::Node>;
    /// Move `card` into `list`, before `before` when given, otherwise at the end
    fn insert_card(&self, list: &Self::Node, card: &Self::Node, before: Option<&Self::Node>);

    fn task_count(&self, list: &Self::Node) -> usize;
    fn has_placeholder(&self, list: &Self::Node) -> bool;
    fn add_placeholder(&self, list: &Self::Node);
    fn remove_placeholder(&self, list: &Self::Node);

    /// Toggle the `dragging` style flag on a card
    fn set_dragging(&self, card: &Self::Node, on: bool);
    /// Toggle the `drop-hover` cue on a dropzone
    fn set_drop_hover(&self, zone: &Self::Node, on: bool);
}

/// Re-establish "placeholder present iff no cards" for one list
pub fn ensure_placeholder<D: BoardDom>(dom: &D, list: &D::Node) {
    let cards = dom.task_count(list);
    let has_placeholder = dom.has_placeholder(list);
    if cards > 0 && has_placeholder {
        dom.remove_placeholder(list);
    } else if cards == 0 && !has_placeholder {
        dom.add_placeholder(list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBoard;

    #[test]
    fn test_empty_column_gets_placeholder() {
        let board = FakeBoard::new().with_column("A", &[]);
        let a = board.list("A");
        assert!(!board.has_placeholder(&a));

        ensure_placeholder(&board, &a);
        assert!(board.has_placeholder(&a));

        // Idempotent
        ensure_placeholder(&board, &a);
        assert!(board.has_placeholder(&a));
    }

    #[test]
    fn test_non_empty_column_loses_placeholder() {
        let board = FakeBoard::new().with_column("A", &["T1"]);
        let a = board.list("A");
        board.add_placeholder(&a);

        ensure_placeholder(&board, &a);
        assert!(!board.has_placeholder(&a));
        assert_eq!(board.task_count(&a), 1);
    }
}
