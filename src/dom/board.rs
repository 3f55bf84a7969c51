//! Board markup behind [`BoardDom`]

use board_dragdrop::BoardDom;
use web_sys::{Document, Element, Node};

use super::{CARD, PLACEHOLDER};

pub struct WebBoard {
    document: Document,
    placeholder_text: String,
}

impl WebBoard {
    pub fn new(document: Document, placeholder_text: impl Into<String>) -> Self {
        Self {
            document,
            placeholder_text: placeholder_text.into(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl BoardDom for WebBoard {
    type Node = Element;

    fn task_id(&self, card: &Element) -> Option<String> {
        non_empty(card.get_attribute("data-task-id"))
    }

    fn column_id(&self, zone: &Element) -> Option<String> {
        non_empty(zone.get_attribute("data-column-id"))
    }

    fn parent_list(&self, card: &Element) -> Option<Element> {
        card.parent_element()
    }

    fn next_card(&self, card: &Element) -> Option<Element> {
        let mut next = card.next_element_sibling();
        while let Some(el) = next {
            if el.matches(CARD).unwrap_or(false) {
                return Some(el);
            }
            next = el.next_element_sibling();
        }
        None
    }

    fn insert_card(&self, list: &Element, card: &Element, before: Option<&Element>) {
        let before: Option<&Node> = before.map(|b| b.as_ref());
        if let Err(e) = list.insert_before(card, before) {
            log::error!("[DND] could not insert card: {:?}", e);
        }
    }

    fn task_count(&self, list: &Element) -> usize {
        list.query_selector_all(CARD).map(|l| l.length() as usize).unwrap_or(0)
    }

    fn has_placeholder(&self, list: &Element) -> bool {
        matches!(list.query_selector(PLACEHOLDER), Ok(Some(_)))
    }

    fn add_placeholder(&self, list: &Element) {
        let item = match self.document.create_element("li") {
            Ok(item) => item,
            Err(e) => {
                log::error!("[DND] could not create placeholder: {:?}", e);
                return;
            }
        };
        item.set_class_name("empty");
        if let Err(e) = item.set_attribute("style", "padding:8px 10px; opacity:.7;") {
            log::warn!("[DND] could not style placeholder: {:?}", e);
        }
        match self.document.create_element("em") {
            Ok(em) => {
                em.set_text_content(Some(&self.placeholder_text));
                if let Err(e) = item.append_child(&em) {
                    log::warn!("[DND] could not fill placeholder: {:?}", e);
                }
            }
            Err(e) => log::warn!("[DND] could not create placeholder text: {:?}", e),
        }
        if let Err(e) = list.append_child(&item) {
            log::error!("[DND] could not add placeholder: {:?}", e);
        }
    }

    fn remove_placeholder(&self, list: &Element) {
        if let Ok(Some(empty)) = list.query_selector(PLACEHOLDER) {
            empty.remove();
        }
    }

    fn set_dragging(&self, card: &Element, on: bool) {
        if let Err(e) = card.class_list().toggle_with_force("dragging", on) {
            log::warn!("[DND] could not toggle dragging class: {:?}", e);
        }
    }

    fn set_drop_hover(&self, zone: &Element, on: bool) {
        if let Err(e) = zone.class_list().toggle_with_force("drop-hover", on) {
            log::warn!("[DND] could not toggle drop-hover class: {:?}", e);
        }
    }
}
