//! Editor actions that round-trip through the document service.
//!
//! The session lock is only taken for the synchronous part of each action and is
//! never held across a service call. A failed call returns before the session is
//! touched, so the in-memory layout survives any remote failure as it was.

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::document_client::{DocumentService, FileUpload};
use crate::editor::session::{EditorSession, Template};
use crate::editor::template::decode_dimensions;
use crate::errors::AppError;
use crate::layout::FontFamily;

/// Outcome of a successful generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub zip: String,
    pub count: Option<u32>,
    pub download_url: String,
}

/// Asks the service for the current template and loads it into the session.
///
/// No template on the service resets the session to the default canvas.
pub async fn reload_template(
    session: &Mutex<EditorSession>,
    docs: &dyn DocumentService,
) -> Result<Template, AppError> {
    match docs.template_url().await? {
        Some(url) => load_template_from(session, docs, url).await,
        None => {
            let mut session = session.lock().await;
            session.clear_template();
            Ok(session.template().clone())
        }
    }
}

/// Fetches and decodes the image at `url`, then installs it.
async fn load_template_from(
    session: &Mutex<EditorSession>,
    docs: &dyn DocumentService,
    url: String,
) -> Result<Template, AppError> {
    let bytes = docs.fetch_template_image(&url).await?;
    let size = decode_dimensions(&bytes)?;

    let mut session = session.lock().await;
    session.load_template(Some(url), size);
    Ok(session.template().clone())
}

/// Uploads a new template, then reloads it.
pub async fn upload_template(
    session: &Mutex<EditorSession>,
    docs: &dyn DocumentService,
    file_name: String,
    content: Bytes,
) -> Result<Template, AppError> {
    let upload = FileUpload { file_name, content };
    match docs.upload_template(upload).await? {
        Some(url) => load_template_from(session, docs, url).await,
        None => reload_template(session, docs).await,
    }
}

pub async fn upload_excel(
    docs: &dyn DocumentService,
    file_name: String,
    content: Bytes,
) -> Result<(), AppError> {
    docs.upload_excel(FileUpload { file_name, content }).await?;
    Ok(())
}

/// Validates and exports the layout, then saves it. Returns the number of placeholders saved.
///
/// Validation failures abort before anything is sent.
pub async fn save_layout(
    session: &Mutex<EditorSession>,
    docs: &dyn DocumentService,
    default_font: Option<FontFamily>,
) -> Result<usize, AppError> {
    let request = session.lock().await.export_layout(default_font)?;
    docs.set_placeholders(&request).await?;
    info!(
        count = request.placeholders.len(),
        default_font = default_font.map(FontFamily::file_name).unwrap_or("renderer default"),
        "layout saved"
    );
    Ok(request.placeholders.len())
}

/// Renders one row with the last *saved* layout. Unsaved edits do not show.
pub async fn preview(docs: &dyn DocumentService, row_index: u32) -> Result<Bytes, AppError> {
    Ok(docs.preview(row_index).await?)
}

/// Generates every row's PDF. A blank folder name becomes `job_<unix millis>`.
pub async fn generate(
    docs: &dyn DocumentService,
    folder_name: Option<String>,
) -> Result<GenerationResult, AppError> {
    let folder_name = folder_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(default_job_name);

    let archive = docs.generate(&folder_name).await?;
    info!(folder = %folder_name, zip = %archive.zip, "documents generated");
    Ok(GenerationResult {
        download_url: docs.download_url(&archive.zip),
        zip: archive.zip,
        count: archive.count,
    })
}

fn default_job_name() -> String {
    format!("job_{}", chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::document_client::{DocumentError, GeneratedArchive};
    use crate::editor::template::tests::png_bytes;
    use crate::layout::{NativeSize, PlaceholderPatch, SetPlaceholdersRequest};

    /// In-memory document service. Every call is recorded; `fail` makes every call error.
    #[derive(Default)]
    pub(crate) struct MockDocs {
        pub template: StdMutex<Option<(String, Vec<u8>)>>,
        pub saved: StdMutex<Vec<SetPlaceholdersRequest>>,
        pub excel: StdMutex<Vec<String>>,
        pub generated: StdMutex<Vec<String>>,
        pub fail: bool,
    }

    impl MockDocs {
        pub(crate) fn with_template(width: u32, height: u32) -> Self {
            let docs = Self::default();
            *docs.template.lock().unwrap() =
                Some(("http://docs/static/t.png".to_string(), png_bytes(width, height)));
            docs
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), DocumentError> {
            if self.fail {
                Err(DocumentError::Api {
                    status: 500,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DocumentService for MockDocs {
        async fn template_url(&self) -> Result<Option<String>, DocumentError> {
            self.check()?;
            Ok(self.template.lock().unwrap().as_ref().map(|(url, _)| url.clone()))
        }

        async fn fetch_template_image(&self, url: &str) -> Result<Bytes, DocumentError> {
            self.check()?;
            match self.template.lock().unwrap().as_ref() {
                Some((known, bytes)) if known == url => Ok(Bytes::from(bytes.clone())),
                _ => Err(DocumentError::Api {
                    status: 404,
                    message: "not found".to_string(),
                }),
            }
        }

        async fn upload_template(&self, upload: FileUpload) -> Result<Option<String>, DocumentError> {
            self.check()?;
            let url = format!("http://docs/static/{}", upload.file_name);
            *self.template.lock().unwrap() = Some((url, upload.content.to_vec()));
            Ok(None)
        }

        async fn upload_excel(&self, upload: FileUpload) -> Result<(), DocumentError> {
            self.check()?;
            self.excel.lock().unwrap().push(upload.file_name);
            Ok(())
        }

        async fn set_placeholders(
            &self,
            request: &SetPlaceholdersRequest,
        ) -> Result<(), DocumentError> {
            self.check()?;
            self.saved.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn preview(&self, row_index: u32) -> Result<Bytes, DocumentError> {
            self.check()?;
            Ok(Bytes::from(format!("png-row-{row_index}")))
        }

        async fn generate(&self, folder_name: &str) -> Result<GeneratedArchive, DocumentError> {
            self.check()?;
            self.generated.lock().unwrap().push(folder_name.to_string());
            Ok(GeneratedArchive {
                zip: format!("{folder_name}.zip"),
                count: Some(3),
            })
        }

        fn download_url(&self, archive: &str) -> String {
            format!("http://docs/download/{archive}")
        }
    }

    #[tokio::test]
    async fn test_reload_template_decodes_native_size() {
        let session = Mutex::new(EditorSession::new(Some(1020.0)));
        let docs = MockDocs::with_template(2000, 1000);

        let template = reload_template(&session, &docs).await.unwrap();
        assert_eq!(
            template.size,
            NativeSize {
                width: 2000,
                height: 1000
            }
        );
        let session = session.lock().await;
        assert!((session.scale().factor() - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_reload_without_template_uses_default_canvas() {
        let session = Mutex::new(EditorSession::new(None));
        let template = reload_template(&session, &MockDocs::default()).await.unwrap();
        assert_eq!(template, Template::default());
    }

    #[tokio::test]
    async fn test_upload_template_then_reload() {
        let session = Mutex::new(EditorSession::new(None));
        let docs = MockDocs::default();
        let template = upload_template(
            &session,
            &docs,
            "cert.png".to_string(),
            Bytes::from(png_bytes(300, 200)),
        )
        .await
        .unwrap();
        assert_eq!(template.url.as_deref(), Some("http://docs/static/cert.png"));
        assert_eq!(template.size.width, 300);
    }

    #[tokio::test]
    async fn test_undecodable_template_leaves_session_alone() {
        let session = Mutex::new(EditorSession::new(None));
        let docs = MockDocs::default();
        let result = upload_template(
            &session,
            &docs,
            "notes.txt".to_string(),
            Bytes::from_static(b"plain text"),
        )
        .await;
        assert!(matches!(result, Err(AppError::Template(_))));
        assert_eq!(session.lock().await.template(), &Template::default());
    }

    #[tokio::test]
    async fn test_save_layout_sends_export() {
        let session = Mutex::new(EditorSession::new(None));
        session.lock().await.add_placeholder();
        let docs = MockDocs::default();

        let count = save_layout(&session, &docs, Some(FontFamily::RobotoRegular))
            .await
            .unwrap();
        assert_eq!(count, 1);
        let saved = docs.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].default_font, Some(FontFamily::RobotoRegular));
        assert!(saved[0].placeholders.get("field_1").is_some());
    }

    #[tokio::test]
    async fn test_save_empty_layout_sends_nothing() {
        let session = Mutex::new(EditorSession::new(None));
        let docs = MockDocs::default();
        let result = save_layout(&session, &docs, None).await;
        assert!(matches!(result, Err(AppError::Layout(_))));
        assert!(docs.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_layout() {
        let session = Mutex::new(EditorSession::new(None));
        let id = session.lock().await.add_placeholder();
        session.lock().await.update_placeholder(
            id,
            &PlaceholderPatch {
                x: Some(7),
                ..Default::default()
            },
        );
        let before: Vec<_> = session.lock().await.store().iter().cloned().collect();

        let result = save_layout(&session, &MockDocs::failing(), None).await;
        assert!(matches!(result, Err(AppError::DocumentService(_))));
        let after: Vec<_> = session.lock().await.store().iter().cloned().collect();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_failed_template_reload_keeps_template() {
        let session = Mutex::new(EditorSession::new(None));
        session
            .lock()
            .await
            .load_template(Some("old".to_string()), NativeSize { width: 640, height: 480 });
        let result = reload_template(&session, &MockDocs::failing()).await;
        assert!(result.is_err());
        assert_eq!(session.lock().await.template().url.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_generate_uses_folder_name() {
        let docs = MockDocs::default();
        let result = generate(&docs, Some(" batch-7 ".to_string())).await.unwrap();
        assert_eq!(result.zip, "batch-7.zip");
        assert_eq!(result.download_url, "http://docs/download/batch-7.zip");
        assert_eq!(result.count, Some(3));
    }

    #[tokio::test]
    async fn test_generate_defaults_blank_folder_name() {
        let docs = MockDocs::default();
        generate(&docs, Some("   ".to_string())).await.unwrap();
        generate(&docs, None).await.unwrap();
        let generated = docs.generated.lock().unwrap();
        assert!(generated.iter().all(|name| name.starts_with("job_")));
    }

    #[tokio::test]
    async fn test_upload_excel_forwards_file() {
        let docs = MockDocs::default();
        upload_excel(&docs, "rows.xlsx".to_string(), Bytes::from_static(b"xlsx"))
            .await
            .unwrap();
        assert_eq!(*docs.excel.lock().unwrap(), ["rows.xlsx"]);
    }

    #[tokio::test]
    async fn test_preview_passes_row_through() {
        let bytes = preview(&MockDocs::default(), 4).await.unwrap();
        assert_eq!(&bytes[..], b"png-row-4");
    }
}
