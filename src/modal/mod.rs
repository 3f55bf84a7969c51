//! Modal Controller
//!
//! Owns the single dialog on the page: loads a fragment into it, shows it,
//! and closes it on Escape or a close marker. Forms inside the fragment are
//! handed to [`ModalFormController`].

mod form;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use url::Url;

use crate::config::SubmitFailurePolicy;
use crate::gateway::{FormFields, GatewayError, HttpTransport, Method, RequestGateway};
use crate::host::PageHost;

pub use form::{classify_submit_response, FormBinding, FormSubmission, ModalFormController, SubmitClass, SubmitOutcome};

const PARTIAL_PARAM: &str = "partial";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalDialogState {
    #[default]
    Closed,
    Loading,
    /// Fragment shown, no form in it
    Open,
    OpenWithForm,
    OpenWithValidationErrors,
}

impl ModalDialogState {
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            ModalDialogState::Open | ModalDialogState::OpenWithForm | ModalDialogState::OpenWithValidationErrors
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModalError {
    #[error("bad modal href {0:?}: {1}")]
    BadHref(String, String),
    #[error("fragment fetch failed: {0}")]
    Fetch(#[from] GatewayError),
    #[error("fragment rejected with status {0}")]
    Rejected(u16),
    #[error("a newer modal load replaced this one")]
    Superseded,
}

/// The dialog element and its body container
pub trait ModalSurface {
    /// Replace everything inside the modal body
    fn replace_body(&self, html: &str);
    fn has_form(&self) -> bool;
    /// Point the body's form at `action`. Keeps the markup's own method when
    /// it has one, otherwise sets `default_method`. Returns the method in use.
    fn retarget_form(&self, action: &str, default_method: Method) -> Method;
    /// Give close markers without a `type` attribute `type="button"`
    fn normalize_close_buttons(&self);
    /// Extra behaviour for the fresh form, such as live color preview
    fn enhance_form(&self) {}
    fn form_fields(&self) -> FormFields;
    fn show(&self);
    /// Idempotent
    fn close(&self);
}

/// `href` resolved against `base` with `partial=1` set
pub fn fragment_url(base: &str, href: &str) -> Result<String, ModalError> {
    let mut url = resolve(base, href)?;
    let kept = pairs_without_partial(&url);
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(PARTIAL_PARAM, "1");
    Ok(url.to_string())
}

/// `href` resolved against `base` with any `partial` marker removed
pub fn canonical_url(base: &str, href: &str) -> Result<String, ModalError> {
    let mut url = resolve(base, href)?;
    let kept = pairs_without_partial(&url);
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Ok(url.to_string())
}

fn resolve(base: &str, href: &str) -> Result<Url, ModalError> {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map_err(|e| ModalError::BadHref(href.to_string(), e.to_string()))
}

fn pairs_without_partial(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(k, _)| k != PARTIAL_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

pub struct ModalController<S, T, H> {
    surface: S,
    gateway: Rc<RequestGateway<T>>,
    host: H,
    /// Base for resolving trigger hrefs, normally the page origin
    base_url: String,
    failure_policy: SubmitFailurePolicy,
    state: Cell<ModalDialogState>,
    /// State to fall back to when the newest load fails
    resting: Cell<ModalDialogState>,
    /// Bumped by every `open` and `close`; only the newest load may land
    loads: Cell<u64>,
    /// Bumped every time the body markup is replaced
    fragment: Cell<u64>,
    form: RefCell<Option<ModalFormController>>,
    submitting: Cell<bool>,
    close_armed: Cell<bool>,
}

impl<S, T, H> ModalController<S, T, H>
where
    S: ModalSurface,
    T: HttpTransport,
    H: PageHost,
{
    pub fn new(
        surface: S,
        gateway: Rc<RequestGateway<T>>,
        host: H,
        base_url: impl Into<String>,
        failure_policy: SubmitFailurePolicy,
    ) -> Self {
        Self {
            surface,
            gateway,
            host,
            base_url: base_url.into(),
            failure_policy,
            state: Cell::new(ModalDialogState::Closed),
            resting: Cell::new(ModalDialogState::Closed),
            loads: Cell::new(0),
            fragment: Cell::new(0),
            form: RefCell::new(None),
            submitting: Cell::new(false),
            close_armed: Cell::new(false),
        }
    }

    pub fn state(&self) -> ModalDialogState {
        self.state.get()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Binding of the form currently in the body, if there is one
    pub fn form_binding(&self) -> Option<FormBinding> {
        self.form.borrow().as_ref().map(|f| f.binding())
    }

    /// Click on a modal trigger: fetch `href` as a fragment and show it.
    ///
    /// On failure nothing is shown, the previous state is restored and the
    /// trigger stays usable, so clicking it again retries. When several loads
    /// overlap only the newest one is applied; older answers are dropped.
    pub async fn open(&self, href: &str) -> Result<ModalDialogState, ModalError> {
        let fetch_url = fragment_url(&self.base_url, href)?;
        let action = canonical_url(&self.base_url, href)?;

        let load = self.loads.get() + 1;
        self.loads.set(load);
        let previous = self.state.replace(ModalDialogState::Loading);
        if previous != ModalDialogState::Loading {
            self.resting.set(previous);
        }

        let result = self.gateway.fetch_fragment(&fetch_url).await;
        if self.loads.get() != load {
            log::debug!("[MODAL] dropping stale answer for {}", fetch_url);
            return Err(ModalError::Superseded);
        }

        let response = match result {
            Ok(r) if r.is_success() => r,
            Ok(r) => {
                log::error!("[MODAL] fragment {} answered {}", fetch_url, r.status);
                self.state.set(self.resting.get());
                return Err(ModalError::Rejected(r.status));
            }
            Err(e) => {
                log::error!("[MODAL] fragment {} failed: {}", fetch_url, e);
                self.state.set(self.resting.get());
                return Err(e.into());
            }
        };

        let state = self.install(&response.body, &action, Method::Post, ModalDialogState::OpenWithForm);
        self.surface.show();
        log::debug!("[MODAL] opened {} ({:?})", action, state);
        Ok(state)
    }

    /// Click somewhere inside the modal body. Closes when the click hit a
    /// close marker and the close binding for the current markup is armed.
    pub fn body_click(&self, on_close_marker: bool) -> bool {
        if on_close_marker && self.close_armed.get() {
            self.close();
            return true;
        }
        false
    }

    /// Global keydown. Escape always closes.
    pub fn key_down(&self, key: &str) -> bool {
        if key == "Escape" {
            self.close();
            return true;
        }
        false
    }

    /// Close the dialog. A load still in flight will not reopen it.
    pub fn close(&self) {
        self.loads.set(self.loads.get() + 1);
        self.surface.close();
        self.state.set(ModalDialogState::Closed);
        self.close_armed.set(false);
        self.form.borrow_mut().take();
    }

    /// Put `html` into the body and bind a fresh form controller to it
    fn install(&self, html: &str, action: &str, default_method: Method, with_form: ModalDialogState) -> ModalDialogState {
        let fragment = self.fragment.get() + 1;
        self.fragment.set(fragment);

        self.surface.replace_body(html);
        self.close_armed.set(true);

        let state = if self.surface.has_form() {
            let method = self.surface.retarget_form(action, default_method);
            self.surface.normalize_close_buttons();
            self.surface.enhance_form();
            *self.form.borrow_mut() = Some(ModalFormController::bind(fragment, action, method));
            with_form
        } else {
            self.form.borrow_mut().take();
            ModalDialogState::Open
        };
        self.state.set(state);
        state
    }
}
