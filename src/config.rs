//! Board UI Configuration
//!
//! Optional JSON embedded by the server as
//! `<script type="application/json" id="board-ui-config">`.
//! Every field has a default, so an empty object (or no script at all)
//! gives the stock behaviour.

use serde::{Deserialize, Serialize};

/// Id of the `<script>` element carrying the config
pub const CONFIG_ELEMENT_ID: &str = "board-ui-config";

/// What to do with a modal form whose submission never reached the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmitFailurePolicy {
    /// Restore the submit binding so the user can try again
    #[default]
    Rebind,
    /// Leave the form unbound; a second submit falls through to the browser
    LeaveUnbound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub csrf_cookie: String,
    /// Value of the `X-Requested-With` marker header
    pub requested_with: String,
    pub dialog_id: String,
    pub modal_body_id: String,
    pub move_failed_message: String,
    pub placeholder_text: String,
    pub submit_failure_policy: SubmitFailurePolicy,
    pub log_level: String,
    pub log_capacity: usize,
    pub analytics: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            csrf_cookie: "csrftoken".to_string(),
            requested_with: "XMLHttpRequest".to_string(),
            dialog_id: "app-modal".to_string(),
            modal_body_id: "modal-body".to_string(),
            move_failed_message: "Could not move task. Please try again.".to_string(),
            placeholder_text: "No tasks".to_string(),
            submit_failure_policy: SubmitFailurePolicy::Rebind,
            log_level: "info".to_string(),
            log_capacity: 200,
            analytics: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid board-ui config: {0}")]
pub struct ConfigError(#[from] serde_json::Error);

impl BoardConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Config from the embedded script text, defaults when absent or broken
    pub fn from_embedded(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::default(),
            Some(raw) => Self::from_json(raw).unwrap_or_else(|e| {
                log::warn!("[CONFIG] {}, using defaults", e);
                Self::default()
            }),
        }
    }
}
