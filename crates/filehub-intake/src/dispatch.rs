//! Submission of a queue to a remote endpoint.
//!
//! A [`Dispatcher`] packages either the selected item
//! ([`SubmitMode::SingleActive`]) or every item
//! ([`SubmitMode::Batch`]) into one multipart request, hands it to a
//! [`Transport`], and turns the response into a [`Download`] or a
//! [`SubmitError`].
//!
//! Submission is split in two phases. [`Dispatcher::submit`] runs
//! synchronously: it refuses a second submission while one is pending
//! and copies what it needs out of the queue. The returned future owns
//! that snapshot, so the queue can be edited freely while the request
//! is in flight. Dropping the future cancels the submission and frees
//! the dispatcher for the next one.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::ClientConfig;
use crate::file::{self, FileHandle};
use crate::queue::{QueueItem, UploadQueue};

/// Which queue items a feature sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Only the selected item, as a single file part.
    SingleActive,
    /// Every item in queue order, as repeated parts under one field name.
    Batch,
}

/// Where and how a feature submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Path appended to the configured API base URL.
    pub path: &'static str,
    pub mode: SubmitMode,
    /// Multipart field name for file parts.
    pub field: &'static str,
    /// Saved filename when neither the server nor the source file
    /// provides one.
    pub default_filename: &'static str,
    /// Prepended to synthesized filenames (`"compressed-"`), may be empty.
    pub output_prefix: &'static str,
    /// Shown when the server fails without a readable message.
    pub fallback_error: &'static str,
}

/// Plain string fields and query parameters sent alongside the files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    pub fields: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl FormParams {
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// One binary part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    /// Declared MIME type of the source file, possibly empty.
    pub content_type: String,
    pub content: Arc<[u8]>,
}

/// A fully resolved `multipart/form-data` POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub files: Vec<FilePart>,
    pub fields: Vec<(String, String)>,
}

/// What the transport received back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The exchange did not produce a response (DNS, refused connection,
/// CORS, aborted).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends a multipart request and collects the full response.
///
/// Implemented over `fetch` in the browser and `reqwest` natively.
pub trait Transport {
    fn send(
        &self,
        request: MultipartRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>>;
}

/// A result ready to be saved on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    /// Response content type, `application/octet-stream` when absent.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Generic message for exchanges that never reached the server.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Could not reach the server. Check your connection and try again.";

/// Why a submission produced no download.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Another submission from this dispatcher has not finished.
    #[error("a submission is already in progress")]
    InProgress,

    /// Empty queue, or no selection in single-active mode.
    #[error("add a file first")]
    NothingToSubmit,

    /// No response reached the client.
    #[error("{}", NETWORK_FAILURE_MESSAGE)]
    Network {
        /// Transport-level detail, for logs only.
        cause: String,
    },

    /// The server answered with a failure status.
    #[error("{message}")]
    Remote { status: u16, message: String },
}

/// Single-line error object returned by the conversion service.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    detail: String,
}

/// Extract a human-readable message from an error response body.
///
/// Accepts `{"detail": "..."}` or `{"message": "..."}`, returned as
/// sent. Blank messages and any other shape, including validation
/// error lists, yield `None`.
#[must_use]
pub fn parse_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.detail)
        .filter(|m| !m.trim().is_empty())
}

/// Split a header value into `key=value` parameters on `;`, leaving
/// quoted strings intact. Keys are lowercased; quoted values are
/// unquoted and unescaped.
fn header_params(header: &str) -> Vec<(String, String)> {
    let mut raw = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    for c in header.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                raw.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    raw.push(current);

    raw.iter()
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            Some((key.trim().to_ascii_lowercase(), unquote(value.trim())))
        })
        .collect()
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .map(|v| v.strip_suffix('"').unwrap_or(v))
    else {
        return value.to_owned();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Decode an RFC 5987 extended value: `charset'language'percent-encoded`.
fn decode_ext_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?.trim();
    let _language = parts.next()?;
    let encoded = parts.next()?;
    let decoded = percent_encoding::percent_decode_str(encoded);
    if charset.eq_ignore_ascii_case("utf-8") {
        decoded.decode_utf8().ok().map(std::borrow::Cow::into_owned)
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(decoded.map(char::from).collect())
    } else {
        None
    }
}

/// Filename from a `Content-Disposition` header value.
///
/// `filename*=` (RFC 5987) wins over `filename=`, which may be quoted
/// or bare. Any directory part is stripped so the server cannot choose
/// where the file lands.
#[must_use]
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let params = header_params(header);
    let extended = params
        .iter()
        .filter(|(key, _)| key == "filename*")
        .find_map(|(_, value)| decode_ext_value(value));
    let plain = || {
        params
            .iter()
            .find(|(key, _)| key == "filename")
            .map(|(_, value)| value.clone())
    };
    let value = extended.or_else(plain)?;
    let name = value.rsplit(['/', '\\']).next().unwrap_or(&value).trim();
    (!name.is_empty() && name != "." && name != "..").then(|| name.to_owned())
}

/// File extension for a response content type, ignoring parameters.
#[must_use]
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let ext = match mime.as_str() {
        "application/pdf" => "pdf",
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "application/zip" => "zip",
        _ => return None,
    };
    Some(ext)
}

/// Pick the saved filename for a successful response.
///
/// 1. The server's `Content-Disposition` hint.
/// 2. The source file's stem with an extension inferred from the
///    response content type, behind the endpoint's prefix.
/// 3. The endpoint's default filename.
#[must_use]
pub fn derive_filename(
    response: &TransportResponse,
    source: Option<&str>,
    endpoint: &Endpoint,
) -> String {
    if let Some(hint) = response
        .content_disposition
        .as_deref()
        .and_then(filename_from_disposition)
    {
        return hint;
    }
    let extension = response
        .content_type
        .as_deref()
        .and_then(extension_for_content_type);
    match (source, extension) {
        (Some(source), Some(ext)) => {
            format!("{}{}.{ext}", endpoint.output_prefix, file::file_stem(source))
        }
        _ => endpoint.default_filename.to_owned(),
    }
}

/// Clears the busy flag when the submission finishes or is dropped.
struct InFlightGuard(Rc<Cell<bool>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Sends queue contents through a [`Transport`], one submission at a time.
#[derive(Debug)]
pub struct Dispatcher<T> {
    transport: Rc<T>,
    config: ClientConfig,
    in_flight: Rc<Cell<bool>>,
}

impl<T> Clone for Dispatcher<T> {
    // Clones share the busy flag: a card that hands its dispatcher to
    // a spawned task still sees that task's submission as pending.
    fn clone(&self) -> Self {
        Self {
            transport: Rc::clone(&self.transport),
            config: self.config.clone(),
            in_flight: Rc::clone(&self.in_flight),
        }
    }
}

impl<T: Transport + 'static> Dispatcher<T> {
    #[must_use]
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport: Rc::new(transport),
            config,
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `true` while a submission is pending.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Start a submission of `queue` to `endpoint`.
    ///
    /// The queue is read once, here; later edits do not affect the
    /// request. The queue itself is never modified, whatever the
    /// outcome, and nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::InProgress`] immediately, without building
    /// a request, if a previous submission is still pending. Returns
    /// [`SubmitError::NothingToSubmit`] for an empty queue or a missing
    /// selection in single-active mode. The returned future resolves to
    /// [`SubmitError::Network`] or [`SubmitError::Remote`] on failure.
    pub fn submit(
        &self,
        queue: &UploadQueue,
        endpoint: &Endpoint,
        params: FormParams,
    ) -> Result<impl Future<Output = Result<Download, SubmitError>> + 'static, SubmitError> {
        if self.in_flight.get() {
            tracing::warn!(path = endpoint.path, "submission already in progress");
            return Err(SubmitError::InProgress);
        }

        let items: Vec<QueueItem> = match endpoint.mode {
            SubmitMode::SingleActive => queue.selected().cloned().into_iter().collect(),
            SubmitMode::Batch => queue.snapshot(),
        };
        if items.is_empty() {
            return Err(SubmitError::NothingToSubmit);
        }

        // Single-active results are named after their source; batch
        // results have no single source.
        let source = match endpoint.mode {
            SubmitMode::SingleActive => items.first().map(|i| i.handle().name().to_owned()),
            SubmitMode::Batch => None,
        };
        let request = build_request(&self.config, endpoint, &items, params);

        self.in_flight.set(true);
        let guard = InFlightGuard(Rc::clone(&self.in_flight));
        let transport = Rc::clone(&self.transport);
        let endpoint = endpoint.clone();

        tracing::info!(
            url = %request.url,
            parts = request.files.len(),
            mode = ?endpoint.mode,
            "submitting"
        );

        Ok(async move {
            let _guard = guard;
            let response = transport.send(request).await.map_err(|e| {
                tracing::warn!(error = %e, path = endpoint.path, "submission failed to reach server");
                SubmitError::Network { cause: e.0 }
            })?;
            interpret_response(response, source.as_deref(), &endpoint)
        })
    }
}

fn build_request(
    config: &ClientConfig,
    endpoint: &Endpoint,
    items: &[QueueItem],
    params: FormParams,
) -> MultipartRequest {
    let files = items
        .iter()
        .map(QueueItem::handle)
        .map(|handle: &FileHandle| FilePart {
            field: endpoint.field.to_owned(),
            filename: handle.name().to_owned(),
            content_type: handle.declared_type().to_owned(),
            content: handle.shared_content(),
        })
        .collect();
    MultipartRequest {
        url: config.build_url(endpoint.path),
        query: params.query,
        files,
        fields: params.fields,
    }
}

fn interpret_response(
    response: TransportResponse,
    source: Option<&str>,
    endpoint: &Endpoint,
) -> Result<Download, SubmitError> {
    if !response.is_success() {
        let message = parse_error_message(&response.body)
            .unwrap_or_else(|| endpoint.fallback_error.to_owned());
        tracing::warn!(status = response.status, %message, path = endpoint.path, "server rejected submission");
        return Err(SubmitError::Remote {
            status: response.status,
            message,
        });
    }
    let filename = derive_filename(&response, source, endpoint);
    let content_type = response
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_owned());
    tracing::info!(%filename, bytes = response.body.len(), "submission succeeded");
    Ok(Download {
        filename,
        content_type,
        bytes: response.body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ENDPOINT: Endpoint = Endpoint {
        path: "/convert-ico/",
        mode: SubmitMode::SingleActive,
        field: "file",
        default_filename: "converted.ico",
        output_prefix: "",
        fallback_error: "Failed to convert image.",
    };

    fn response(status: u16) -> TransportResponse {
        TransportResponse {
            status,
            ..TransportResponse::default()
        }
    }

    #[test]
    fn error_message_from_detail_or_message() {
        assert_eq!(
            parse_error_message(br#"{"detail":"Only PDF files allowed"}"#).as_deref(),
            Some("Only PDF files allowed")
        );
        assert_eq!(
            parse_error_message(br#"{"message":"bad webp"}"#).as_deref(),
            Some("bad webp")
        );
    }

    #[test]
    fn error_message_keeps_surrounding_whitespace() {
        assert_eq!(
            parse_error_message(br#"{"detail":"  Incorrect password\n"}"#).as_deref(),
            Some("  Incorrect password\n")
        );
    }

    #[test]
    fn unparseable_error_bodies_yield_none() {
        assert_eq!(parse_error_message(b"<html>502</html>"), None);
        assert_eq!(parse_error_message(br#"{"detail":[{"loc":["body"]}]}"#), None);
        assert_eq!(parse_error_message(br#"{"detail":"  "}"#), None);
        assert_eq!(parse_error_message(b""), None);
    }

    #[test]
    fn disposition_filename_quoted_and_bare() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="modified_a.pdf""#).as_deref(),
            Some("modified_a.pdf")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=converted.ico").as_deref(),
            Some("converted.ico")
        );
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn disposition_filename_keeps_quoted_separators() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="a;b.pdf"; size=10"#).as_deref(),
            Some("a;b.pdf")
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="say \"hi\".pdf""#).as_deref(),
            Some(r#"say "hi".pdf"#)
        );
    }

    #[test]
    fn disposition_extended_filename_wins() {
        assert_eq!(
            filename_from_disposition(
                "attachment; filename=\"naive.pdf\"; filename*=UTF-8''na%C3%AFve%20report.pdf"
            )
            .as_deref(),
            Some("naïve report.pdf")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=iso-8859-1'en'caf%E9.png").as_deref(),
            Some("café.png")
        );
        // Unknown charsets fall back to the plain parameter.
        assert_eq!(
            filename_from_disposition("attachment; filename*=koi8-r''x.pdf; filename=plain.pdf")
                .as_deref(),
            Some("plain.pdf")
        );
    }

    #[test]
    fn disposition_filename_strips_directories() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
    }

    #[test]
    fn content_type_extensions_ignore_parameters() {
        assert_eq!(extension_for_content_type("image/x-icon"), Some("ico"));
        assert_eq!(
            extension_for_content_type("application/pdf; charset=binary"),
            Some("pdf")
        );
        assert_eq!(extension_for_content_type("text/html"), None);
    }

    #[test]
    fn filename_prefers_server_hint() {
        let resp = TransportResponse {
            content_disposition: Some("attachment; filename=server.ico".into()),
            content_type: Some("image/x-icon".into()),
            ..response(200)
        };
        assert_eq!(derive_filename(&resp, Some("logo.png"), &ENDPOINT), "server.ico");
    }

    #[test]
    fn filename_synthesized_from_source_and_type() {
        let resp = TransportResponse {
            content_type: Some("image/x-icon".into()),
            ..response(200)
        };
        assert_eq!(derive_filename(&resp, Some("logo.png"), &ENDPOINT), "logo.ico");

        let prefixed = Endpoint {
            output_prefix: "compressed-",
            ..ENDPOINT
        };
        assert_eq!(
            derive_filename(&resp, Some("logo.png"), &prefixed),
            "compressed-logo.ico"
        );
    }

    #[test]
    fn filename_falls_back_to_default() {
        let untyped = response(200);
        assert_eq!(derive_filename(&untyped, Some("logo.png"), &ENDPOINT), "converted.ico");

        let typed = TransportResponse {
            content_type: Some("application/pdf".into()),
            ..response(200)
        };
        assert_eq!(derive_filename(&typed, None, &ENDPOINT), "converted.ico");
    }

    #[test]
    fn remote_error_uses_fallback_when_body_unreadable() {
        let err = interpret_response(
            TransportResponse {
                body: b"Internal Server Error".to_vec(),
                ..response(500)
            },
            None,
            &ENDPOINT,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Remote {
                status: 500,
                message: "Failed to convert image.".into()
            }
        );
    }

    #[test]
    fn remote_error_surfaces_message_verbatim() {
        let err = interpret_response(
            TransportResponse {
                body: br#"{"detail":"Incorrect password"}"#.to_vec(),
                ..response(400)
            },
            None,
            &ENDPOINT,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Incorrect password");
    }

    #[test]
    fn success_defaults_content_type() {
        let download = interpret_response(
            TransportResponse {
                body: vec![1, 2, 3],
                ..response(200)
            },
            Some("a.png"),
            &ENDPOINT,
        )
        .unwrap();
        assert_eq!(download.content_type, "application/octet-stream");
        assert_eq!(download.bytes, [1, 2, 3]);
    }

    #[test]
    fn network_error_shows_generic_message() {
        let err = SubmitError::Network {
            cause: "connection refused".into(),
        };
        assert_eq!(err.to_string(), NETWORK_FAILURE_MESSAGE);
    }
}
