/// Document service client. The single point of entry for the document-generation service.
///
/// ARCHITECTURAL RULE: No other module may call the document service directly.
/// Uploads, layout saves, previews and PDF generation all go through `DocumentService`.
///
/// The service owns all durability (template, spreadsheet, saved layout, archives).
/// Nothing here retries: a failed call is reported and the caller's state is untouched.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, Response, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::SetPlaceholdersRequest;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Document service did not return an archive name")]
    MissingArchive,

    #[error("Invalid document service URL '{0}'")]
    InvalidBaseUrl(String),
}

/// A file handed through to the service unchanged. Type checks are the service's job.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content: Bytes,
}

/// Result of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArchive {
    pub zip: String,
    #[serde(default)]
    pub count: Option<u32>,
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Absolute URL of the current template image, if one has been uploaded.
    async fn template_url(&self) -> Result<Option<String>, DocumentError>;

    /// Raw bytes of the template image at `url`.
    async fn fetch_template_image(&self, url: &str) -> Result<Bytes, DocumentError>;

    /// Uploads a template. Returns its absolute URL when the service reports one.
    async fn upload_template(&self, upload: FileUpload) -> Result<Option<String>, DocumentError>;

    /// Registers the spreadsheet whose rows the generation step will stamp.
    async fn upload_excel(&self, upload: FileUpload) -> Result<(), DocumentError>;

    /// Replaces the saved layout as a whole.
    async fn set_placeholders(&self, request: &SetPlaceholdersRequest) -> Result<(), DocumentError>;

    /// Renders one data row against the last saved layout; returns PNG bytes.
    async fn preview(&self, row_index: u32) -> Result<Bytes, DocumentError>;

    /// Generates one PDF per row into `folder_name` and zips them.
    async fn generate(&self, folder_name: &str) -> Result<GeneratedArchive, DocumentError>;

    /// Where a generated archive can be downloaded from.
    fn download_url(&self, archive: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct UrlResponse {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    zip: Option<String>,
    #[serde(default)]
    count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    detail: serde_json::Value,
}

/// HTTP implementation of [`DocumentService`].
#[derive(Clone)]
pub struct HttpDocumentService {
    client: Client,
    base_url: String,
    base: Url,
}

impl HttpDocumentService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DocumentError> {
        let base = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| DocumentError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }

    async fn upload(&self, path: &str, upload: FileUpload) -> Result<Response, DocumentError> {
        let size = upload.content.len();
        let part = multipart::Part::bytes(upload.content.to_vec()).file_name(upload.file_name.clone());
        let form = multipart::Form::new().part("file", part);

        debug!(path, file = %upload.file_name, size, "uploading to document service");
        let response = self
            .client
            .post(self.endpoint(path))
            .multipart(form)
            .send()
            .await?;
        check_status(response).await
    }
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn template_url(&self) -> Result<Option<String>, DocumentError> {
        let response = self.client.get(self.endpoint("/template")).send().await?;
        let body: UrlResponse = check_status(response).await?.json().await?;
        Ok(body.url.map(|path| self.endpoint(&path)))
    }

    async fn fetch_template_image(&self, url: &str) -> Result<Bytes, DocumentError> {
        let response = self.client.get(url).send().await?;
        Ok(check_status(response).await?.bytes().await?)
    }

    async fn upload_template(&self, upload: FileUpload) -> Result<Option<String>, DocumentError> {
        let body: UrlResponse = self.upload("/upload-template", upload).await?.json().await?;
        Ok(body.url.map(|path| self.endpoint(&path)))
    }

    async fn upload_excel(&self, upload: FileUpload) -> Result<(), DocumentError> {
        self.upload("/upload-excel", upload).await?;
        Ok(())
    }

    async fn set_placeholders(&self, request: &SetPlaceholdersRequest) -> Result<(), DocumentError> {
        debug!(count = request.placeholders.len(), "saving layout");
        let response = self
            .client
            .post(self.endpoint("/set-placeholders"))
            .json(request)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn preview(&self, row_index: u32) -> Result<Bytes, DocumentError> {
        let form = multipart::Form::new().text("row_index", row_index.to_string());
        let response = self
            .client
            .post(self.endpoint("/preview"))
            .multipart(form)
            .send()
            .await?;
        Ok(check_status(response).await?.bytes().await?)
    }

    async fn generate(&self, folder_name: &str) -> Result<GeneratedArchive, DocumentError> {
        let form = multipart::Form::new().text("folder_name", folder_name.to_string());
        let response = self
            .client
            .post(self.endpoint("/generate"))
            .multipart(form)
            .send()
            .await?;
        let body: GenerateResponse = check_status(response).await?.json().await?;
        let zip = body.zip.ok_or(DocumentError::MissingArchive)?;
        Ok(GeneratedArchive {
            zip,
            count: body.count,
        })
    }

    /// The archive name is a single percent-encoded path segment.
    fn download_url(&self, archive: &str) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("download").push(archive);
        }
        url.into()
    }
}

/// Passes 2xx responses through; everything else becomes `DocumentError::Api`.
async fn check_status(response: Response) -> Result<Response, DocumentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Document service returned {}: {}", status, body);
    Err(DocumentError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pulls the service's `detail` out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ServiceErrorBody>(body) {
        Ok(ServiceErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ServiceErrorBody { detail }) => detail.to_string(),
        Err(_) => body.to_string(),
    }
}

/// Joins a service-relative path onto the base URL; absolute URLs pass through.
fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
