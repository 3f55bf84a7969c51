//! Request Gateway
//!
//! Every call to the board server goes through here so the marker header
//! and the CSRF header are always attached. Responses come back raw; the
//! callers decide what a status means. Nothing is retried.

use async_trait::async_trait;
use wasm_bindgen::JsValue;

use crate::csrf::CsrfToken;

pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Parse a form `method` attribute. Empty or unknown means POST.
    pub fn from_attr(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            _ => Method::Post,
        }
    }

    /// Whether the call changes server state and so needs the CSRF header
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

/// Value of one form entry
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    /// Non-string entry such as a `File`, handed to the transport untouched
    Blob(JsValue),
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

pub type FormFields = Vec<(String, FormValue)>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Form fields, sent as multipart form data
    Form(FormFields),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// The fetch followed at least one redirect
    pub redirected: bool,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("could not build request: {0}")]
    Request(String),
    #[error("could not read response body: {0}")]
    Body(String),
}

/// Performs one HTTP exchange
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError>;
}

/// Blob entries cannot travel in a query string and are left out
fn with_query(url: &str, fields: &[(String, FormValue)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (name, value) in fields {
        match value {
            FormValue::Text(text) => {
                query.append_pair(name, text);
                any = true;
            }
            FormValue::Blob(_) => log::warn!("[HTTP] file field {} dropped from a GET form", name),
        }
    }
    if !any {
        return url.to_string();
    }
    let query = query.finish();
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, sep, query)
}

pub struct RequestGateway<T> {
    transport: T,
    token: CsrfToken,
    requested_with: String,
}

impl<T: HttpTransport> RequestGateway<T> {
    pub fn new(transport: T, token: CsrfToken, requested_with: impl Into<String>) -> Self {
        Self {
            transport,
            token,
            requested_with: requested_with.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build(&self, method: Method, url: &str, body: RequestBody) -> HttpRequest {
        self.build_with(method, url, body, method.is_mutating())
    }

    /// GET forms carry their fields in the query string
    fn build_with(&self, method: Method, url: &str, body: RequestBody, with_csrf: bool) -> HttpRequest {
        let (url, body) = match body {
            RequestBody::Form(fields) if method == Method::Get => (with_query(url, &fields), RequestBody::Empty),
            body => (url.to_string(), body),
        };
        let mut headers = vec![(REQUESTED_WITH_HEADER.to_string(), self.requested_with.clone())];
        if with_csrf {
            headers.push((CSRF_HEADER.to_string(), self.token.as_str().to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    pub async fn send(&self, method: Method, url: &str, body: RequestBody) -> Result<HttpResponse, GatewayError> {
        let request = self.build(method, url, body);
        self.exchange(request).await
    }

    /// Submit a form. Carries the CSRF header whatever the method.
    pub async fn submit_form(&self, method: Method, url: &str, fields: FormFields) -> Result<HttpResponse, GatewayError> {
        let request = self.build_with(method, url, RequestBody::Form(fields), true);
        self.exchange(request).await
    }

    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let (method, url) = (request.method, request.url.clone());
        log::debug!("[HTTP] {} {}", method.as_str(), url);
        let result = self.transport.send(request).await;
        match &result {
            Ok(response) => log::debug!("[HTTP] {} {} -> {}", method.as_str(), url, response.status),
            Err(e) => log::warn!("[HTTP] {} {} failed: {}", method.as_str(), url, e),
        }
        result
    }

    /// GET an HTML fragment. Marker header only.
    pub async fn fetch_fragment(&self, url: &str) -> Result<HttpResponse, GatewayError> {
        self.send(Method::Get, url, RequestBody::Empty).await
    }
}
