//! Dialog element behind [`ModalSurface`]

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, FormData, HtmlDialogElement, HtmlElement, HtmlFormElement, HtmlInputElement};

use crate::gateway::{FormFields, FormValue, Method};
use crate::modal::ModalSurface;

use super::MODAL_CLOSE;

const COLOR_INPUT: &str = r#"input[type="color"][name$="color"]"#;
const COLUMN_HEAD: &str = ".column-head";

pub struct WebModal {
    document: Document,
    dialog: HtmlDialogElement,
    body: Element,
}

impl WebModal {
    pub fn new(document: Document, dialog: HtmlDialogElement, body: Element) -> Self {
        Self { document, dialog, body }
    }

    fn form(&self) -> Option<HtmlFormElement> {
        self.body
            .query_selector("form")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    }

    fn find(&self, selector: &str) -> Option<Element> {
        self.body
            .query_selector(selector)
            .ok()
            .flatten()
            .or_else(|| self.document.query_selector(selector).ok().flatten())
    }
}

fn apply_color(node: &HtmlElement, value: &str) {
    if value.is_empty() {
        return;
    }
    if let Err(e) = node.style().set_property("--col-color", value) {
        log::warn!("[MODAL] could not preview color {}: {:?}", value, e);
    }
}

impl ModalSurface for WebModal {
    fn replace_body(&self, html: &str) {
        self.body.set_inner_html(html);
    }

    fn has_form(&self) -> bool {
        self.form().is_some()
    }

    fn retarget_form(&self, action: &str, default_method: Method) -> Method {
        let Some(form) = self.form() else { return default_method };
        if let Err(e) = form.set_attribute("action", action) {
            log::warn!("[MODAL] could not retarget form to {}: {:?}", action, e);
        }
        match form.get_attribute("method").filter(|m| !m.trim().is_empty()) {
            Some(method) => Method::from_attr(&method),
            None => {
                if let Err(e) = form.set_attribute("method", default_method.as_str()) {
                    log::warn!("[MODAL] could not set form method: {:?}", e);
                }
                default_method
            }
        }
    }

    fn normalize_close_buttons(&self) {
        let Ok(buttons) = self.body.query_selector_all(MODAL_CLOSE) else { return };
        for i in 0..buttons.length() {
            let Some(button) = buttons.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else { continue };
            if button.has_attribute("type") {
                continue;
            }
            if let Err(e) = button.set_attribute("type", "button") {
                log::warn!("[MODAL] could not normalize close button: {:?}", e);
            }
        }
    }

    /// Live preview of a column color while it is being picked
    fn enhance_form(&self) {
        let Some(input) = self
            .body
            .query_selector(COLOR_INPUT)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let preview: HtmlElement = self
            .find(COLUMN_HEAD)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .unwrap_or_else(|| self.dialog.clone().into());

        apply_color(&preview, &input.value());
        let on_input = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            if let Some(input) = ev.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) {
                apply_color(&preview, &input.value());
            }
        });
        if let Err(e) = input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref()) {
            log::warn!("[MODAL] color preview unavailable: {:?}", e);
        }
        on_input.forget();
    }

    fn form_fields(&self) -> FormFields {
        let Some(form) = self.form() else { return Vec::new() };
        let data = match FormData::new_with_form(&form) {
            Ok(data) => data,
            Err(e) => {
                log::error!("[MODAL] could not read form data: {:?}", e);
                return Vec::new();
            }
        };
        let Ok(Some(entries)) = js_sys::try_iter(&data) else { return Vec::new() };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let pair = js_sys::Array::from(&entry);
                let name = pair.get(0).as_string()?;
                let value = pair.get(1);
                let value = match value.as_string() {
                    Some(text) => FormValue::Text(text),
                    None => FormValue::Blob(value),
                };
                Some((name, value))
            })
            .collect()
    }

    fn show(&self) {
        if self.dialog.open() {
            return;
        }
        if let Err(e) = self.dialog.show_modal() {
            log::error!("[MODAL] showModal failed: {:?}", e);
        }
    }

    fn close(&self) {
        self.dialog.close();
    }
}
