//! `fetch` behind [`HttpTransport`]

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, Headers, Request, RequestCredentials, RequestInit, Response};

use crate::gateway::{FormValue, GatewayError, HttpRequest, HttpResponse, HttpTransport, RequestBody};

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn build_error(e: JsValue) -> GatewayError {
    GatewayError::Request(describe(&e))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    fn build(request: &HttpRequest) -> Result<Request, GatewayError> {
        let headers = Headers::new().map_err(build_error)?;
        for (name, value) in &request.headers {
            headers.set(name, value).map_err(build_error)?;
        }

        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_headers(&headers);
        init.set_credentials(RequestCredentials::SameOrigin);

        if let RequestBody::Form(fields) = &request.body {
            let data = FormData::new().map_err(build_error)?;
            for (name, value) in fields {
                match value {
                    FormValue::Text(text) => data.append_with_str(name, text),
                    FormValue::Blob(value) => match value.dyn_ref::<Blob>() {
                        Some(blob) => data.append_with_blob(name, blob),
                        None => data.append_with_str(name, &describe(value)),
                    },
                }
                .map_err(build_error)?;
            }
            init.set_body(&data);
        }

        Request::new_with_str_and_init(&request.url, &init).map_err(build_error)
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let window = web_sys::window().ok_or_else(|| GatewayError::Request("no window".to_string()))?;
        let fetch_request = Self::build(&request)?;

        let value = JsFuture::from(window.fetch_with_request(&fetch_request))
            .await
            .map_err(|e| GatewayError::Network(describe(&e)))?;
        let response: Response = value
            .dyn_into()
            .map_err(|e| GatewayError::Network(describe(&e)))?;

        let text = response.text().map_err(|e| GatewayError::Body(describe(&e)))?;
        let body = JsFuture::from(text)
            .await
            .map_err(|e| GatewayError::Body(describe(&e)))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse {
            status: response.status(),
            redirected: response.redirected(),
            body,
        })
    }
}
