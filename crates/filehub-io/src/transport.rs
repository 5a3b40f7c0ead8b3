//! [`Transport`] over the browser `fetch` API.
//!
//! Each request gets its own `AbortController`. The controller is held
//! by the response future, so dropping that future (for example when
//! the Dioxus task that owns it is cancelled) aborts the exchange.

use std::future::Future;

use filehub_intake::{MultipartRequest, Transport, TransportError, TransportResponse};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, BlobPropertyBag, FormData, Request, RequestInit, Response};

/// Errors raised while driving a `fetch` exchange.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A browser API call returned an error or rejected its promise.
    #[error("fetch error: {0}")]
    JsError(String),
}

impl From<JsValue> for FetchError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<FetchError> for TransportError {
    fn from(value: FetchError) -> Self {
        Self(value.to_string())
    }
}

/// Aborts the request when the owning future goes away.
struct AbortOnDrop(AbortController);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        // A no-op once the response has been read.
        self.0.abort();
    }
}

/// Sends multipart requests with `window.fetch`.
///
/// The response's `Content-Disposition` header is only visible when
/// the server lists it in `Access-Control-Expose-Headers`; without it
/// the dispatcher falls back to synthesized filenames.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    fn send(
        &self,
        request: MultipartRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> {
        async move { fetch(request).await.map_err(TransportError::from) }
    }
}

#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
async fn fetch(request: MultipartRequest) -> Result<TransportResponse, FetchError> {
    let window = web_sys::window().ok_or_else(|| FetchError::JsError("no global window".into()))?;

    let url = web_sys::Url::new(&request.url)?;
    for (name, value) in &request.query {
        url.search_params().append(name, value);
    }

    let form = FormData::new()?;
    for part in &request.files {
        let bytes = js_sys::Array::new();
        bytes.push(&js_sys::Uint8Array::from(&*part.content));
        let opts = BlobPropertyBag::new();
        opts.set_type(&part.content_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&bytes, &opts)?;
        form.append_with_blob_and_filename(&part.field, &blob, &part.filename)?;
    }
    for (name, value) in &request.fields {
        form.append_with_str(name, value)?;
    }

    let controller = AbortOnDrop(AbortController::new()?);
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);
    init.set_signal(Some(&controller.0.signal()));

    let href: String = url.href();
    let req = Request::new_with_str_and_init(&href, &init)?;
    tracing::debug!(url = %href, parts = request.files.len(), "fetch started");

    let response: Response = JsFuture::from(window.fetch_with_request(&req))
        .await?
        .dyn_into()
        .map_err(|e| FetchError::JsError(format!("not a Response: {e:?}")))?;

    let headers = response.headers();
    let content_type = headers.get("content-type")?;
    let content_disposition = headers.get("content-disposition")?;
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    let body = js_sys::Uint8Array::new(&buffer).to_vec();

    drop(controller);
    Ok(TransportResponse {
        status: response.status(),
        content_type,
        content_disposition,
        body,
    })
}
