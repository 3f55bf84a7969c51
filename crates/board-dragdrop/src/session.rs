//! Drag Session Slot
//!
//! Holds the one card being dragged, if any.

use std::cell::RefCell;

/// A live drag gesture
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession<N> {
    /// The card under the pointer
    pub dragged: N,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a drag session is already active")]
    AlreadyActive,
}

/// Single-field holder for the active drag session.
///
/// Only `start`, `consume`, `clear` and `current` touch the slot, so there
/// can never be two sessions at once.
#[derive(Debug)]
pub struct DragSessionSlot<N> {
    slot: RefCell<Option<DragSession<N>>>,
}

impl<N> Default for DragSessionSlot<N> {
    fn default() -> Self {
        Self { slot: RefCell::new(None) }
    }
}

impl<N: Clone> DragSessionSlot<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session for `dragged`. Fails if one is already live.
    pub fn start(&self, dragged: N) -> Result<(), SessionError> {
        let mut slot = self.slot.borrow_mut();
        if slot.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        *slot = Some(DragSession { dragged });
        Ok(())
    }

    /// Take the session out of the slot, leaving it empty
    pub fn consume(&self) -> Option<DragSession<N>> {
        self.slot.borrow_mut().take()
    }

    /// Drop whatever session is held
    pub fn clear(&self) -> Option<N> {
        self.consume().map(|s| s.dragged)
    }

    pub fn current(&self) -> Option<N> {
        self.slot.borrow().as_ref().map(|s| s.dragged.clone())
    }

    pub fn is_active(&self) -> bool {
        self.slot.borrow().is_some()
    }
}
