//! Window-level effects: alerts, reloads, analytics

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};

use crate::analytics::EventSink;
use crate::host::PageHost;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHost;

impl PageHost for BrowserHost {
    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.alert_with_message(message) {
                log::error!("[PAGE] alert failed: {:?}", e);
            }
        }
    }

    fn reload(&self) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().reload() {
                log::error!("[PAGE] reload failed: {:?}", e);
            }
        }
    }
}

/// Forwards to `window.plausible(name, { props })` when the page has it
#[derive(Debug, Clone, Copy, Default)]
pub struct PlausibleSink;

impl EventSink for PlausibleSink {
    fn track(&self, name: &str, props: Value) {
        let Some(window) = web_sys::window() else { return };
        let Ok(hook) = js_sys::Reflect::get(&window, &JsValue::from_str("plausible")) else { return };
        let Some(hook) = hook.dyn_ref::<js_sys::Function>() else {
            log::debug!("[TRACK] no analytics hook, dropping {}", name);
            return;
        };

        let options = serde_json::json!({ "props": props });
        let options = match options.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("[TRACK] could not encode props for {}: {}", name, e);
                return;
            }
        };
        if let Err(e) = hook.call2(&JsValue::NULL, &JsValue::from_str(name), &options) {
            log::warn!("[TRACK] {} failed: {:?}", name, e);
        }
    }
}
