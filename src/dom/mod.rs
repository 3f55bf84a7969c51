//! Browser Bindings
//!
//! web-sys implementations of the controller seams, and the boot sequence
//! that wires them to a server-rendered board page.

mod board;
mod events;
mod host;
mod http;
mod modal;

use std::rc::Rc;

use board_dragdrop::DragMoveController;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlDialogElement, HtmlDocument};

use crate::analytics::{EventSink, NoopSink};
use crate::config::{BoardConfig, CONFIG_ELEMENT_ID};
use crate::csrf::CsrfToken;
use crate::gateway::RequestGateway;
use crate::modal::ModalController;
use crate::moves::BoardFeedback;

pub use board::WebBoard;
pub use host::{BrowserHost, PlausibleSink};
pub use http::FetchTransport;
pub use modal::WebModal;

pub(crate) const CARD: &str = ".task-card";
pub(crate) const DRAGGABLE_CARD: &str = r#".task-card[draggable="true"]"#;
pub(crate) const DROPZONE: &str = ".dropzone";
pub(crate) const PLACEHOLDER: &str = ".empty";
pub(crate) const MODAL_OPEN: &str = "[data-modal-open]";
pub(crate) const MODAL_CLOSE: &str = "[data-modal-close]";
pub(crate) const FILTER_FORM: &str = "form.filters";

/// Nearest ancestor-or-self of the event target matching `selector`
pub(crate) fn closest(ev: &Event, selector: &str) -> Option<Element> {
    ev.target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

fn read_config(document: &Document) -> BoardConfig {
    let raw = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content());
    BoardConfig::from_embedded(raw.as_deref())
}

fn read_token(document: &Document, cookie: &str) -> CsrfToken {
    let raw = document
        .dyn_ref::<HtmlDocument>()
        .and_then(|d| d.cookie().ok())
        .unwrap_or_default();
    CsrfToken::from_cookie_string(&raw, cookie)
}

/// `window.trackEvent(name, props)` for inline scripts on the page
fn expose_track_event(window: &web_sys::Window, sink: Rc<dyn EventSink>) {
    let track = Closure::<dyn Fn(String, JsValue)>::new(move |name: String, props: JsValue| {
        let props = if props.is_undefined() || props.is_null() {
            Value::Object(Default::default())
        } else {
            serde_wasm_bindgen::from_value(props).unwrap_or_default()
        };
        sink.track(&name, props);
    });
    if let Err(e) = js_sys::Reflect::set(window, &JsValue::from_str("trackEvent"), track.as_ref()) {
        log::warn!("[BOOT] could not expose trackEvent: {:?}", e);
    }
    track.forget();
}

pub fn boot() {
    let Some(window) = web_sys::window() else { return };
    let Some(document) = window.document() else { return };

    let config = read_config(&document);
    if let Err(e) = console_logger::init(console_logger::parse_level(&config.log_level), config.log_capacity) {
        web_sys::console::warn_1(&format!("logger already installed: {}", e).into());
    }

    // Read once; a rotated cookie is picked up on the next page load
    let token = read_token(&document, &config.csrf_cookie);
    if token.is_empty() {
        log::warn!("[BOOT] no {} cookie, state-changing requests will be refused", config.csrf_cookie);
    }
    let gateway = Rc::new(RequestGateway::new(FetchTransport, token, config.requested_with.clone()));

    let sink: Rc<dyn EventSink> = if config.analytics { Rc::new(PlausibleSink) } else { Rc::new(NoopSink) };
    expose_track_event(&window, sink.clone());

    let feedback = BoardFeedback::new(BrowserHost, sink, config.move_failed_message.clone());
    let board = DragMoveController::new(
        WebBoard::new(document.clone(), config.placeholder_text.clone()),
        gateway.clone(),
        feedback,
    );
    events::bind_drag_and_drop(&document, Rc::new(board));

    let dialog = document
        .get_element_by_id(&config.dialog_id)
        .and_then(|el| el.dyn_into::<HtmlDialogElement>().ok());
    let body = document.get_element_by_id(&config.modal_body_id);
    match (dialog, body) {
        (Some(dialog), Some(body)) => {
            let base_url = window.location().origin().unwrap_or_default();
            let modal = ModalController::new(
                WebModal::new(document.clone(), dialog.clone(), body.clone()),
                gateway,
                BrowserHost,
                base_url,
                config.submit_failure_policy,
            );
            events::bind_modal(&document, &dialog, &body, Rc::new(modal));
        }
        _ => log::info!("[BOOT] no modal on this page"),
    }

    events::bind_hotkeys(&document);
    events::bind_filters(&document);
    log::info!("[BOOT] board ui ready");
}
