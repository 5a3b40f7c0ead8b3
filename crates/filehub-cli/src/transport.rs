//! [`Transport`] over `reqwest`.

use std::future::Future;

use filehub_intake::{MultipartRequest, Transport, TransportError, TransportResponse};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderName};
use reqwest::multipart::{Form, Part};

/// Sends multipart requests with a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: MultipartRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> {
        let client = self.client.clone();
        async move {
            send(&client, request)
                .await
                .map_err(|e| TransportError(e.to_string()))
        }
    }
}

/// Build the multipart form. Parts keep request order.
fn build_form(request: MultipartRequest) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for file in request.files {
        let mut part = Part::bytes(file.content.to_vec()).file_name(file.filename);
        if !file.content_type.is_empty() {
            part = part.mime_str(&file.content_type)?;
        }
        form = form.part(file.field, part);
    }
    for (name, value) in request.fields {
        form = form.text(name, value);
    }
    Ok(form)
}

fn header(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn send(
    client: &reqwest::Client,
    request: MultipartRequest,
) -> Result<TransportResponse, reqwest::Error> {
    let url = request.url.clone();
    let query = request.query.clone();
    let form = build_form(request)?;

    let response = client
        .post(&url)
        .query(&query)
        .multipart(form)
        .send()
        .await?;

    let status = response.status().as_u16();
    let content_type = header(response.headers(), CONTENT_TYPE);
    let content_disposition = header(response.headers(), CONTENT_DISPOSITION);
    let body = response.bytes().await?.to_vec();
    tracing::debug!(status, bytes = body.len(), "response received");

    Ok(TransportResponse {
        status,
        content_type,
        content_disposition,
        body,
    })
}
