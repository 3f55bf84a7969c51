//! Hotkeys
//!
//! Single-letter shortcuts that click a link on the board, which usually
//! opens a modal.

/// Where a hotkey's link is looked up: by id first, then by `data-hotkey`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyTarget {
    pub element_id: &'static str,
    pub data_hotkey: String,
}

impl HotkeyTarget {
    pub fn selector(&self) -> String {
        format!(r#"[data-hotkey="{}"]"#, self.data_hotkey)
    }
}

/// Typing into these never triggers a hotkey
const EDITABLE_TAGS: &[&str] = &["input", "textarea", "select", "button"];

pub fn resolve_hotkey(key: &str, target_tag: Option<&str>) -> Option<HotkeyTarget> {
    if let Some(tag) = target_tag {
        if EDITABLE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            return None;
        }
    }
    let key = key.to_lowercase();
    let element_id = match key.as_str() {
        "c" => "link-add-column",
        "n" => "link-add-task",
        _ => return None,
    };
    Some(HotkeyTarget {
        element_id,
        data_hotkey: key,
    })
}
