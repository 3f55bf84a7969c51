//! Board DragDrop
//!
//! Optimistic drag-and-drop of task cards between board columns.
//! The card is relocated immediately, the server is asked to confirm,
//! and the relocation is reversed if it refuses.
//!
//! Nothing here touches the browser directly. The page is reached through
//! [`BoardDom`], the server through [`MoveBackend`], and the user through
//! [`MoveFeedback`], so the whole protocol runs against in-memory fakes.

mod column;
mod controller;
mod session;

pub use column::{ensure_placeholder, BoardDom};
pub use controller::{DragMoveController, MoveBackend, MoveFeedback, MoveOutcome, MoveRejected, PendingMove};
pub use session::{DragSession, DragSessionSlot, SessionError};

#[cfg(test)]
pub(crate) mod testing;
