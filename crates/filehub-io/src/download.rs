//! Saving a finished [`Download`] via Blob URLs.
//!
//! Dioxus has no built-in file download API. This module triggers
//! downloads by creating a `Blob`, generating an object URL, and
//! programmatically clicking a temporary `<a>` element.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use filehub_intake::Download;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when triggering a file download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// An object URL that is revoked when dropped.
///
/// Keeps the Blob alive only as long as something still needs the URL.
#[derive(Debug)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// Wrap `bytes` in a `Blob` of type `content_type` and create a URL
    /// for it.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::JsError`] if `Blob` creation or
    /// `URL.createObjectURL` fails.
    pub fn from_bytes(bytes: &[u8], content_type: &str) -> Result<Self, DownloadError> {
        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(bytes));

        let opts = BlobPropertyBag::new();
        opts.set_type(content_type);

        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;
        Ok(Self(web_sys::Url::create_object_url_with_blob(&blob)?))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        // The download has already been handed to the browser.
        let _ = web_sys::Url::revoke_object_url(&self.0);
    }
}

/// Save `download` under its filename.
///
/// The object URL is revoked as soon as the click has been dispatched,
/// whether or not the click succeeded.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails
/// (e.g., `Blob` creation, `URL.createObjectURL`, element creation).
pub fn save(download: &Download) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    let url = ObjectUrl::from_bytes(&download.bytes, &download.content_type)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(url.as_str());
    anchor.set_download(&download.filename);

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();
    let _ = body.remove_child(&anchor);

    tracing::info!(
        filename = %download.filename,
        bytes = download.bytes.len(),
        "download saved"
    );
    Ok(())
}
