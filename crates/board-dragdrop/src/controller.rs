//! Drag Move Controller
//!
//! `Idle -> Dragging -> (Dropped | Cancelled) -> Idle`
//!
//! A drop relocates the card first and asks the server second. The DOM work
//! happens synchronously in [`DragMoveController::begin_drop`]; the network
//! round trip and any rollback happen in [`DragMoveController::complete`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;

use crate::column::{ensure_placeholder, BoardDom};
use crate::session::{DragSessionSlot, SessionError};

/// Why the server did not accept a move
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejected {
    #[error("move rejected with status {0}")]
    Status(u16),
    #[error("move request failed: {0}")]
    Transport(String),
}

/// Persists a move. Never retried: a refused move is rolled back instead.
#[async_trait(?Send)]
pub trait MoveBackend {
    async fn move_task(&self, task_id: &str, column_id: &str) -> Result<(), MoveRejected>;
}

#[async_trait(?Send)]
impl<B: MoveBackend + ?Sized> MoveBackend for Rc<B> {
    async fn move_task(&self, task_id: &str, column_id: &str) -> Result<(), MoveRejected> {
        (**self).move_task(task_id, column_id).await
    }
}

/// User-facing side effects of a settled move
pub trait MoveFeedback {
    /// Server confirmed the move
    fn moved(&self, task_id: &str, column_id: &str);
    /// Server refused and the card went back to where it was
    fn move_failed(&self, task_id: &str, error: &MoveRejected);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Drop without a live drag session
    Ignored,
    /// Card or column carried no id; nothing was touched
    Aborted,
    Confirmed { column_id: String },
    RolledBack(MoveRejected),
    /// Refused, but a later drag had already taken the card elsewhere.
    /// The card stays put until that later move settles.
    Superseded(MoveRejected),
}

/// An optimistic move waiting for the server
#[derive(Debug, Clone)]
pub struct PendingMove<N> {
    pub task_id: String,
    pub column_id: String,
    card: N,
    source: N,
    destination: N,
}

/// Where the server last agreed a card lives
#[derive(Debug, Clone)]
struct Anchor<N> {
    list: N,
    next: Option<N>,
}

/// Per-card bookkeeping while moves of that card are unsettled
#[derive(Debug)]
struct Track<N> {
    accepted: Anchor<N>,
    in_flight: usize,
}

pub struct DragMoveController<D: BoardDom, B, F> {
    dom: D,
    backend: B,
    feedback: F,
    session: DragSessionSlot<D::Node>,
    tracks: RefCell<HashMap<String, Track<D::Node>>>,
}

impl<D, B, F> DragMoveController<D, B, F>
where
    D: BoardDom,
    B: MoveBackend,
    F: MoveFeedback,
{
    pub fn new(dom: D, backend: B, feedback: F) -> Self {
        Self {
            dom,
            backend,
            feedback,
            session: DragSessionSlot::new(),
            tracks: RefCell::new(HashMap::new()),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_active()
    }

    /// `dragstart` on a draggable card.
    ///
    /// Returns the drag payload (the task id, possibly empty).
    pub fn drag_start(&self, card: D::Node) -> Result<String, SessionError> {
        self.session.start(card.clone())?;
        self.dom.set_dragging(&card, true);
        Ok(self.dom.task_id(&card).unwrap_or_default())
    }

    /// `dragover` on a dropzone. The caller must always cancel the event.
    pub fn drag_over(&self, zone: &D::Node) {
        self.dom.set_drop_hover(zone, true);
    }

    pub fn drag_leave(&self, zone: &D::Node) {
        self.dom.set_drop_hover(zone, false);
    }

    /// `dragend`: the one unconditional cleanup hook
    pub fn drag_end(&self, card: Option<&D::Node>) {
        if let Some(dragged) = self.session.clear() {
            self.dom.set_dragging(&dragged, false);
        }
        if let Some(card) = card {
            self.dom.set_dragging(card, false);
        }
    }

    /// `drop` on a dropzone: consume the session and relocate the card.
    ///
    /// On `Ok` the DOM already shows the card in `zone` and the placeholder
    /// invariant holds for both lists. `Err` carries the final outcome when
    /// there is nothing to send.
    pub fn begin_drop(&self, zone: &D::Node) -> Result<PendingMove<D::Node>, MoveOutcome> {
        self.dom.set_drop_hover(zone, false);

        let Some(session) = self.session.consume() else {
            log::debug!("[DND] drop without an active drag, ignoring");
            return Err(MoveOutcome::Ignored);
        };
        let card = session.dragged;
        self.dom.set_dragging(&card, false);

        let (Some(task_id), Some(column_id)) = (self.dom.task_id(&card), self.dom.column_id(zone)) else {
            log::warn!("[DND] drop is missing a task or column id, aborting");
            return Err(MoveOutcome::Aborted);
        };
        let Some(source) = self.dom.parent_list(&card) else {
            log::warn!("[DND] dragged task {} is detached, aborting", task_id);
            return Err(MoveOutcome::Aborted);
        };
        let source_next = self.dom.next_card(&card);

        // The first unsettled move of a card remembers where it came from
        self.tracks
            .borrow_mut()
            .entry(task_id.clone())
            .or_insert_with(|| Track {
                accepted: Anchor { list: source.clone(), next: source_next },
                in_flight: 0,
            })
            .in_flight += 1;

        self.dom.insert_card(zone, &card, None);
        ensure_placeholder(&self.dom, &source);
        ensure_placeholder(&self.dom, zone);
        log::debug!("[DND] optimistically moved task {} to column {}", task_id, column_id);

        Ok(PendingMove {
            task_id,
            column_id,
            card,
            source,
            destination: zone.clone(),
        })
    }

    /// Ask the server to persist `pending`, rolling back on refusal.
    ///
    /// A rollback returns the card to the last position the server accepted
    /// for it, which is the drop's source unless an earlier move of the same
    /// card is still unsettled or was refused.
    pub async fn complete(&self, pending: PendingMove<D::Node>) -> MoveOutcome {
        let outcome = match self.backend.move_task(&pending.task_id, &pending.column_id).await {
            Ok(()) => {
                log::info!("[DND] task {} moved to column {}", pending.task_id, pending.column_id);
                self.accept(&pending);
                self.feedback.moved(&pending.task_id, &pending.column_id);
                MoveOutcome::Confirmed { column_id: pending.column_id.clone() }
            }
            Err(err) => self.roll_back(&pending, err),
        };
        self.settle(&pending);
        outcome
    }

    /// `begin_drop` followed by `complete`
    pub async fn drop_on(&self, zone: &D::Node) -> MoveOutcome {
        match self.begin_drop(zone) {
            Ok(pending) => self.complete(pending).await,
            Err(outcome) => outcome,
        }
    }

    fn accept(&self, pending: &PendingMove<D::Node>) {
        if let Some(track) = self.tracks.borrow_mut().get_mut(&pending.task_id) {
            track.accepted = Anchor {
                list: pending.destination.clone(),
                next: None,
            };
        }
    }

    fn roll_back(&self, pending: &PendingMove<D::Node>, err: MoveRejected) -> MoveOutcome {
        log::error!("[DND] move of task {} failed: {}", pending.task_id, err);
        self.feedback.move_failed(&pending.task_id, &err);

        if self.dom.parent_list(&pending.card).as_ref() != Some(&pending.destination) {
            log::warn!("[DND] task {} was moved again before the failure arrived, keeping it", pending.task_id);
            return MoveOutcome::Superseded(err);
        }

        let accepted = self.tracks.borrow().get(&pending.task_id).map(|t| t.accepted.clone());
        let anchor = accepted.unwrap_or_else(|| Anchor {
            list: pending.source.clone(),
            next: None,
        });
        self.place(&pending.card, &anchor);
        ensure_placeholder(&self.dom, &pending.destination);
        MoveOutcome::RolledBack(err)
    }

    /// Once the last unsettled move of a card resolves, the card must sit
    /// where the server last accepted it
    fn settle(&self, pending: &PendingMove<D::Node>) {
        let anchor = {
            let mut tracks = self.tracks.borrow_mut();
            let Some(track) = tracks.get_mut(&pending.task_id) else { return };
            track.in_flight = track.in_flight.saturating_sub(1);
            if track.in_flight > 0 {
                return;
            }
            match tracks.remove(&pending.task_id) {
                Some(track) => track.accepted,
                None => return,
            }
        };

        if self.session.current().as_ref() == Some(&pending.card) {
            return;
        }
        let current = self.dom.parent_list(&pending.card);
        if current.as_ref() != Some(&anchor.list) {
            log::warn!("[DND] task {} restored to its last accepted column", pending.task_id);
            self.place(&pending.card, &anchor);
            if let Some(list) = current {
                ensure_placeholder(&self.dom, &list);
            }
        }
    }

    fn place(&self, card: &D::Node, anchor: &Anchor<D::Node>) {
        let before = anchor
            .next
            .as_ref()
            .filter(|next| *next != card && self.dom.parent_list(next).as_ref() == Some(&anchor.list));
        self.dom.insert_card(&anchor.list, card, before);
        ensure_placeholder(&self.dom, &anchor.list);
    }
}
