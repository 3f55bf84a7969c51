#![allow(warnings)]
//! Board UI Entry Point
//!
//! Progressive enhancement for a server-rendered kanban board: drag-and-drop
//! task moves, modal fragments with in-place form submission, hotkeys.

mod analytics;
mod config;
mod csrf;
mod dom;
mod gateway;
mod host;
mod hotkeys;
mod modal;
mod moves;

fn main() {
    console_error_panic_hook::set_once();
    dom::boot();
}
