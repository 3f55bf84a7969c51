//! Delegated Event Wiring
//!
//! Listeners sit on the document (or the modal body) and route events to
//! the controllers. Closures live as long as the page, so they are leaked.

use std::rc::Rc;

use board_dragdrop::{DragMoveController, MoveFeedback};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, DragEvent, Element, Event, EventTarget, HtmlDialogElement, HtmlElement, HtmlFormElement, KeyboardEvent};

use crate::gateway::{HttpTransport, RequestGateway};
use crate::hotkeys::resolve_hotkey;
use crate::host::PageHost;
use crate::modal::{ModalController, ModalSurface};

use super::board::WebBoard;
use super::{closest, CARD, DRAGGABLE_CARD, DROPZONE, FILTER_FORM, MODAL_CLOSE, MODAL_OPEN};

pub type BoardController<T, F> = DragMoveController<WebBoard, Rc<RequestGateway<T>>, F>;

fn listen<F>(target: &EventTarget, name: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let cb = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(name, cb.as_ref().unchecked_ref()) {
        log::error!("[EVENTS] could not listen for {}: {:?}", name, e);
    }
    cb.forget();
}

pub fn bind_drag_and_drop<T, F>(document: &Document, board: Rc<BoardController<T, F>>)
where
    T: HttpTransport + 'static,
    F: MoveFeedback + 'static,
{
    let ctrl = board.clone();
    listen(document, "dragstart", move |ev| {
        let Some(card) = closest(&ev, DRAGGABLE_CARD) else { return };
        match ctrl.drag_start(card) {
            Ok(payload) => {
                if let Some(dt) = ev.dyn_ref::<DragEvent>().and_then(|d| d.data_transfer()) {
                    dt.set_effect_allowed("move");
                    if let Err(e) = dt.set_data("text/plain", &payload) {
                        log::warn!("[DND] could not set drag payload: {:?}", e);
                    }
                }
            }
            Err(e) => log::warn!("[DND] {}", e),
        }
    });

    let ctrl = board.clone();
    listen(document, "dragend", move |ev| {
        ctrl.drag_end(closest(&ev, CARD).as_ref());
    });

    let ctrl = board.clone();
    listen(document, "dragover", move |ev| {
        let Some(zone) = closest(&ev, DROPZONE) else { return };
        // Without this the zone never accepts a drop
        ev.prevent_default();
        if let Some(dt) = ev.dyn_ref::<DragEvent>().and_then(|d| d.data_transfer()) {
            dt.set_drop_effect("move");
        }
        ctrl.drag_over(&zone);
    });

    let ctrl = board.clone();
    listen(document, "dragleave", move |ev| {
        if let Some(zone) = closest(&ev, DROPZONE) {
            ctrl.drag_leave(&zone);
        }
    });

    let ctrl = board;
    listen(document, "drop", move |ev| {
        let Some(zone) = closest(&ev, DROPZONE) else { return };
        ev.prevent_default();
        match ctrl.begin_drop(&zone) {
            Ok(pending) => {
                let ctrl = ctrl.clone();
                spawn_local(async move {
                    let outcome = ctrl.complete(pending).await;
                    log::debug!("[DND] move settled: {:?}", outcome);
                });
            }
            Err(outcome) => log::debug!("[DND] drop not sent: {:?}", outcome),
        }
    });
}

pub fn bind_modal<S, T, H>(document: &Document, dialog: &HtmlDialogElement, body: &Element, modal: Rc<ModalController<S, T, H>>)
where
    S: ModalSurface + 'static,
    T: HttpTransport + 'static,
    H: PageHost + 'static,
{
    let ctrl = modal.clone();
    listen(document, "click", move |ev| {
        let Some(trigger) = closest(&ev, MODAL_OPEN) else { return };
        ev.prevent_default();
        let Some(href) = trigger.get_attribute("href") else {
            log::warn!("[MODAL] trigger without href");
            return;
        };
        let ctrl = ctrl.clone();
        spawn_local(async move {
            if let Err(e) = ctrl.open(&href).await {
                log::warn!("[MODAL] {} not opened: {}", href, e);
            }
        });
    });

    let ctrl = modal.clone();
    listen(body, "click", move |ev| {
        ctrl.body_click(closest(&ev, MODAL_CLOSE).is_some());
    });

    let ctrl = modal.clone();
    listen(body, "submit", move |ev| {
        if !ctrl.intercepts_submit() {
            return;
        }
        ev.prevent_default();
        let Some(submission) = ctrl.begin_submit() else {
            log::debug!("[MODAL] submit already in flight");
            return;
        };
        let ctrl = ctrl.clone();
        spawn_local(async move {
            let outcome = ctrl.complete_submit(submission).await;
            log::debug!("[MODAL] submit settled: {:?}", outcome);
        });
    });

    let ctrl = modal.clone();
    listen(document, "keydown", move |ev| {
        if let Some(key) = ev.dyn_ref::<KeyboardEvent>() {
            ctrl.key_down(&key.key());
        }
    });

    // Native closes (form method="dialog", browser Escape) keep state in sync
    let ctrl = modal;
    let dlg = dialog.clone();
    listen(dialog, "close", move |_ev| {
        if !dlg.open() && ctrl.state().is_open() {
            ctrl.close();
        }
    });
}

pub fn bind_hotkeys(document: &Document) {
    let doc = document.clone();
    listen(document, "keydown", move |ev| {
        let Some(key) = ev.dyn_ref::<KeyboardEvent>() else { return };
        let tag = ev.target().and_then(|t| t.dyn_into::<Element>().ok()).map(|el| el.tag_name());
        let Some(target) = resolve_hotkey(&key.key(), tag.as_deref()) else { return };

        let link = doc
            .get_element_by_id(target.element_id)
            .or_else(|| doc.query_selector(&target.selector()).ok().flatten())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(link) = link {
            ev.prevent_default();
            link.click();
        }
    });
}

/// Filter forms apply as soon as a field changes
pub fn bind_filters(document: &Document) {
    let Some(form) = document
        .query_selector(FILTER_FORM)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        return;
    };
    let target = form.clone();
    listen(&form, "change", move |_ev| {
        if let Err(e) = target.submit() {
            log::error!("[FILTERS] submit failed: {:?}", e);
        }
    });
}
