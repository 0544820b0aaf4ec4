//! Streamed multipart/form-data uploads.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::error::{Error, ErrorKind, Result};
use crate::request::mime;

/// Chunk size for streaming file bodies.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Called after each chunk with `(field_name, file_name, bytes_written, total_bytes)`.
pub type ProgressCallback = Arc<dyn Fn(&str, &str, u64, u64) + Send + Sync>;

type BoxedReader = Box<dyn AsyncRead + Send + Sync + Unpin + 'static>;

/// One file plus optional text fields, sent as `multipart/form-data`.
///
/// The file is read in [`UPLOAD_CHUNK_SIZE`] chunks while the request is
/// written, so memory use does not grow with file size. The reader is
/// consumed by the first send.
pub struct MultipartUpload {
    pub field_name: String,
    pub file_name: String,
    pub size: u64,
    pub content_type: String,
    pub form_fields: Vec<(String, String)>,
    progress: Option<ProgressCallback>,
    reader: BoxedReader,
}

impl MultipartUpload {
    /// Upload `size` bytes from `reader` under `field_name`.
    pub fn new<R>(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        reader: R,
        size: u64,
    ) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            size,
            content_type: mime::OCTET_STREAM.to_string(),
            form_fields: Vec::new(),
            progress: None,
            reader: Box::new(reader),
        }
    }

    /// Open a file from disk, using its name and length.
    pub async fn from_path(field_name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::validation(format!("not a file path: {}", path.display())))?;
        Ok(Self::new(field_name, file_name, file, size))
    }

    /// Add a text field sent alongside the file.
    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_fields.push((name.into(), value.into()));
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Report progress as chunks are written.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &str, u64, u64) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub(crate) fn into_form(self) -> Result<reqwest::multipart::Form> {
        let Self {
            field_name,
            file_name,
            size,
            content_type,
            form_fields,
            progress,
            reader,
        } = self;

        let mut written = 0u64;
        let (progress_field, progress_file) = (field_name.clone(), file_name.clone());
        let stream = ReaderStream::with_capacity(reader, UPLOAD_CHUNK_SIZE).map(move |chunk| {
            if let (Ok(bytes), Some(callback)) = (&chunk, &progress) {
                written += bytes.len() as u64;
                callback(&progress_field, &progress_file, written, size);
            }
            chunk
        });

        let part = reqwest::multipart::Part::stream_with_length(
            reqwest::Body::wrap_stream(stream),
            size,
        )
        .file_name(file_name)
        .mime_str(&content_type)
        .map_err(|e| Error::with_source(ErrorKind::Validation(format!("invalid content type: {content_type}")), e))?;

        let form = form_fields
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
            .part(field_name, part);
        Ok(form)
    }
}

impl std::fmt::Debug for MultipartUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartUpload")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .field("form_fields", &self.form_fields)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_from_path_reads_name_and_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 1000]).unwrap();

        let upload = MultipartUpload::from_path("file", file.path()).await.unwrap();
        assert_eq!(upload.size, 1000);
        assert_eq!(upload.field_name, "file");
        assert!(!upload.file_name.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = MultipartUpload::from_path("file", "/nonexistent/package.pkg")
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io(_)));
    }

    #[test]
    fn test_builder_and_debug() {
        let upload = MultipartUpload::new("file", "tool.pkg", tokio::io::empty(), 0)
            .with_form_field("note", "nightly")
            .with_content_type("application/x-newton-compatible-pkg")
            .with_progress(|_, _, _, _| {});
        let debug = format!("{upload:?}");
        assert!(debug.contains("tool.pkg"));
        assert!(debug.contains("progress: true"));
        assert!(upload.into_form().is_ok());
    }

    #[test]
    fn test_bad_content_type_rejected() {
        let upload = MultipartUpload::new("file", "a.bin", tokio::io::empty(), 0)
            .with_content_type("not a mime type");
        assert!(upload.into_form().is_err());
    }
}
