//! Modal Form Controller
//!
//! `Bound -> Submitting -> (Closed | ReRendered | ClosedViaFallback)`
//!
//! Each rendered form gets exactly one binding, and a binding fires at most
//! once. A validation re-render replaces the markup and binds a brand-new
//! controller to it, so handlers never stack.

use crate::config::SubmitFailurePolicy;
use crate::gateway::{FormFields, HttpResponse, HttpTransport, Method};
use crate::host::PageHost;

use super::{ModalController, ModalDialogState, ModalSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormBinding {
    Bound,
    Unbound,
}

/// How a submit response is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitClass {
    /// 204, or the fetch was redirected
    Success,
    /// 200 whose body contains a form: the server re-rendered it with errors
    ValidationFailed,
    /// Anything else. Treated as success so the UI never sticks on a
    /// submitted form.
    Unrecognized,
}

pub fn classify_submit_response(response: &HttpResponse) -> SubmitClass {
    if response.status == 204 || response.redirected {
        SubmitClass::Success
    } else if response.status == 200 && response.body.contains("<form") {
        SubmitClass::ValidationFailed
    } else {
        SubmitClass::Unrecognized
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No bound form; the event is not ours to handle
    NotBound,
    Closed,
    ReRendered,
    ClosedViaFallback,
    /// The request never got an answer
    TransportFailed { rebound: bool },
    /// Validation markup for a form that is no longer shown
    Discarded,
}

/// One firing of a form binding
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub fragment: u64,
    pub action: String,
    pub method: Method,
    pub fields: FormFields,
}

/// Submit binding for one rendered form fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalFormController {
    fragment: u64,
    action: String,
    method: Method,
    binding: FormBinding,
}

impl ModalFormController {
    pub fn bind(fragment: u64, action: impl Into<String>, method: Method) -> Self {
        Self {
            fragment,
            action: action.into(),
            method,
            binding: FormBinding::Bound,
        }
    }

    pub fn binding(&self) -> FormBinding {
        self.binding
    }

    pub fn fragment(&self) -> u64 {
        self.fragment
    }

    /// Consume the binding. `None` if it already fired.
    pub fn fire(&mut self, fields: FormFields) -> Option<FormSubmission> {
        if self.binding == FormBinding::Unbound {
            return None;
        }
        self.binding = FormBinding::Unbound;
        Some(FormSubmission {
            fragment: self.fragment,
            action: self.action.clone(),
            method: self.method,
            fields,
        })
    }

    fn rebind(&mut self) {
        self.binding = FormBinding::Bound;
    }
}

impl<S, T, H> ModalController<S, T, H>
where
    S: ModalSurface,
    T: HttpTransport,
    H: PageHost,
{
    /// Whether a `submit` event inside the modal should be cancelled and
    /// handled here. False lets the browser submit natively.
    pub fn intercepts_submit(&self) -> bool {
        self.submitting.get() || self.form_binding() == Some(FormBinding::Bound)
    }

    /// Fire the current binding, capturing the form fields.
    pub fn begin_submit(&self) -> Option<FormSubmission> {
        let mut slot = self.form.borrow_mut();
        let form = slot.as_mut()?;
        if form.binding() == FormBinding::Unbound {
            return None;
        }
        let submission = form.fire(self.surface.form_fields())?;
        self.submitting.set(true);
        Some(submission)
    }

    /// Send a fired submission and act on the response
    pub async fn complete_submit(&self, submission: FormSubmission) -> SubmitOutcome {
        let FormSubmission {
            fragment,
            action,
            method,
            fields,
        } = submission;
        let result = self.gateway.submit_form(method, &action, fields).await;
        self.submitting.set(false);

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::error!("[MODAL] submit failed: {}", e);
                return self.after_transport_failure(fragment);
            }
        };

        match classify_submit_response(&response) {
            SubmitClass::Success => {
                self.close();
                self.host.reload();
                SubmitOutcome::Closed
            }
            SubmitClass::Unrecognized => {
                log::warn!("[MODAL] unexpected submit response {}, closing", response.status);
                self.close();
                self.host.reload();
                SubmitOutcome::ClosedViaFallback
            }
            SubmitClass::ValidationFailed => {
                if !self.is_current(fragment) {
                    log::warn!("[MODAL] validation response for a replaced form, discarding");
                    return SubmitOutcome::Discarded;
                }
                self.install(
                    &response.body,
                    &action,
                    method,
                    ModalDialogState::OpenWithValidationErrors,
                );
                SubmitOutcome::ReRendered
            }
        }
    }

    /// `begin_submit` followed by `complete_submit`
    pub async fn submit(&self) -> SubmitOutcome {
        match self.begin_submit() {
            Some(submission) => self.complete_submit(submission).await,
            None => SubmitOutcome::NotBound,
        }
    }

    fn after_transport_failure(&self, fragment: u64) -> SubmitOutcome {
        if self.failure_policy == SubmitFailurePolicy::LeaveUnbound || !self.is_current(fragment) {
            return SubmitOutcome::TransportFailed { rebound: false };
        }
        let mut slot = self.form.borrow_mut();
        match slot.as_mut() {
            Some(form) if form.fragment() == fragment => {
                form.rebind();
                SubmitOutcome::TransportFailed { rebound: true }
            }
            _ => SubmitOutcome::TransportFailed { rebound: false },
        }
    }

    fn is_current(&self, fragment: u64) -> bool {
        self.state.get().is_open() && self.fragment.get() == fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{RequestBody, CSRF_HEADER};
    use crate::modal::tests::{modal, transport};

    const FORM: &str = r#"<form><input name="name"><button data-modal-close>Cancel</button></form>"#;
    const INVALID: &str = r#"<form><ul class="errorlist"><li>This field is required.</li></ul><input name="name"><button data-modal-close>Cancel</button></form>"#;

    fn response(status: u16, redirected: bool, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            redirected,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_classify_submit_response() {
        assert_eq!(classify_submit_response(&response(204, false, "")), SubmitClass::Success);
        assert_eq!(classify_submit_response(&response(200, true, "<form>")), SubmitClass::Success);
        assert_eq!(classify_submit_response(&response(200, false, INVALID)), SubmitClass::ValidationFailed);
        assert_eq!(classify_submit_response(&response(200, false, "<p>done</p>")), SubmitClass::Unrecognized);
        assert_eq!(classify_submit_response(&response(400, false, INVALID)), SubmitClass::Unrecognized);
        assert_eq!(classify_submit_response(&response(500, false, "")), SubmitClass::Unrecognized);
    }

    #[test]
    fn test_binding_fires_once() {
        let mut form = ModalFormController::bind(1, "/x/", Method::Post);
        assert_eq!(form.binding(), FormBinding::Bound);
        assert!(form.fire(vec![]).is_some());
        assert_eq!(form.binding(), FormBinding::Unbound);
        assert!(form.fire(vec![]).is_none());
    }

    #[tokio::test]
    async fn test_success_closes_and_reloads_once() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, FORM).status(204, "");
        m.open("/projects/1/columns/new/").await.unwrap();
        m.surface().fields.borrow_mut().push(("name".into(), "Doing".into()));

        assert_eq!(m.submit().await, SubmitOutcome::Closed);
        assert_eq!(m.state(), ModalDialogState::Closed);
        assert!(!m.surface().open.get());
        assert_eq!(m.host.reloads.get(), 1);

        let sent = transport(&m).requests();
        assert_eq!(sent[1].method, Method::Post);
        assert_eq!(sent[1].url, "https://board.test/projects/1/columns/new/");
        assert_eq!(sent[1].header(CSRF_HEADER), Some("tok"));
        assert_eq!(sent[1].body, RequestBody::Form(vec![("name".into(), "Doing".into())]));
    }

    #[tokio::test]
    async fn test_redirect_counts_as_success() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, FORM).redirect();
        m.open("/tasks/3/edit/").await.unwrap();

        assert_eq!(m.submit().await, SubmitOutcome::Closed);
        assert_eq!(m.host.reloads.get(), 1);
    }

    #[tokio::test]
    async fn test_unexpected_response_closes_via_fallback() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, FORM).status(500, "Server Error");
        m.open("/tasks/3/edit/").await.unwrap();

        assert_eq!(m.submit().await, SubmitOutcome::ClosedViaFallback);
        assert_eq!(m.state(), ModalDialogState::Closed);
        assert_eq!(m.host.reloads.get(), 1);
    }

    #[tokio::test]
    async fn test_validation_rerender_rebinds_fresh_form() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, FORM).status(200, INVALID).status(204, "");
        m.open("/projects/1/columns/new/").await.unwrap();

        let submission = m.begin_submit().unwrap();
        // The old binding is spent while the request is in flight
        assert_eq!(m.form_binding(), Some(FormBinding::Unbound));
        assert!(m.intercepts_submit());
        assert!(m.begin_submit().is_none());

        assert_eq!(m.complete_submit(submission).await, SubmitOutcome::ReRendered);
        assert_eq!(m.state(), ModalDialogState::OpenWithValidationErrors);
        assert_eq!(*m.surface().body.borrow(), INVALID);
        assert_eq!(m.form_binding(), Some(FormBinding::Bound));
        assert_eq!(m.host.reloads.get(), 0);
        // Close buttons normalized again on the new markup, form retargeted
        assert_eq!(m.surface().normalized.get(), 2);
        assert_eq!(
            m.surface().action.borrow().as_deref(),
            Some("https://board.test/projects/1/columns/new/")
        );

        // The new form submits exactly once
        assert!(m.surface().open.get());
        assert_eq!(m.submit().await, SubmitOutcome::Closed);
        assert_eq!(transport(&m).requests().len(), 3);
        assert_eq!(m.host.reloads.get(), 1);
        assert_eq!(m.submit().await, SubmitOutcome::NotBound);
        assert_eq!(transport(&m).requests().len(), 3);
    }

    #[tokio::test]
    async fn test_rerendered_form_closes_via_marker() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, FORM).status(200, INVALID);
        m.open("/projects/1/columns/new/").await.unwrap();

        assert_eq!(m.submit().await, SubmitOutcome::ReRendered);
        assert!(m.body_click(true));
        assert_eq!(m.state(), ModalDialogState::Closed);
        assert_eq!(m.host.reloads.get(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_rebinds_by_default() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, FORM).fail().status(204, "");
        m.open("/columns/3/rename/").await.unwrap();

        assert_eq!(m.submit().await, SubmitOutcome::TransportFailed { rebound: true });
        assert_eq!(m.state(), ModalDialogState::OpenWithForm);
        assert!(m.surface().open.get());
        assert_eq!(m.form_binding(), Some(FormBinding::Bound));
        assert_eq!(m.host.reloads.get(), 0);

        // Retry works
        assert_eq!(m.submit().await, SubmitOutcome::Closed);
    }

    #[tokio::test]
    async fn test_transport_failure_can_leave_form_unbound() {
        let m = modal(SubmitFailurePolicy::LeaveUnbound);
        transport(&m).status(200, FORM).fail();
        m.open("/columns/3/rename/").await.unwrap();

        assert_eq!(m.submit().await, SubmitOutcome::TransportFailed { rebound: false });
        assert!(m.surface().open.get());
        assert_eq!(m.form_binding(), Some(FormBinding::Unbound));
        assert!(!m.intercepts_submit());
        assert_eq!(m.submit().await, SubmitOutcome::NotBound);
    }

    #[tokio::test]
    async fn test_stale_validation_response_is_discarded() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, FORM).status(200, "<p>other</p>").status(200, INVALID);
        m.open("/columns/new/").await.unwrap();

        let submission = m.begin_submit().unwrap();
        // User closes and opens something else before the answer arrives
        m.close();
        m.open("/tasks/9/").await.unwrap();

        assert_eq!(m.complete_submit(submission).await, SubmitOutcome::Discarded);
        assert_eq!(*m.surface().body.borrow(), "<p>other</p>");
        assert_eq!(m.state(), ModalDialogState::Open);
    }

    #[tokio::test]
    async fn test_get_form_keeps_its_method_and_csrf() {
        let m = modal(SubmitFailurePolicy::Rebind);
        transport(&m).status(200, r#"<form method="get"></form>"#).status(204, "");
        m.open("/search/").await.unwrap();
        m.surface().fields.borrow_mut().push(("q".into(), "urgent".into()));

        m.submit().await;
        let sent = transport(&m).requests();
        assert_eq!(sent[1].method, Method::Get);
        assert_eq!(sent[1].url, "https://board.test/search/?q=urgent");
        assert_eq!(sent[1].header(CSRF_HEADER), Some("tok"));
    }
}
