use contentai_core::{AppError, AppResult};
use tracing::warn;

/// Largest accepted reference document.
pub const MAX_DOCUMENT_BYTES: usize = 50 * 1024;

/// Largest accepted combined size of all reference documents.
pub const MAX_TOTAL_DOCUMENT_BYTES: usize = 200 * 1024;

/// A reference document uploaded with a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    /// Client-supplied file name, used in error messages only.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Creates an upload from a file name and its contents.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Checks upload sizes and decodes the documents as UTF-8 text.
///
/// Size limits apply to every upload, including ones that are later skipped.
/// Uploads that are not valid UTF-8 are skipped with a warning; empty uploads
/// are dropped.
pub fn decode_documents(uploads: Vec<DocumentUpload>) -> AppResult<Vec<String>> {
    let mut total = 0_usize;
    for upload in &uploads {
        if upload.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(AppError::Validation(format!(
                "file {} exceeds maximum size of 50KB",
                upload.file_name
            )));
        }
        total += upload.bytes.len();
        if total > MAX_TOTAL_DOCUMENT_BYTES {
            return Err(AppError::Validation(
                "total size of all files exceeds 200KB".to_owned(),
            ));
        }
    }

    Ok(uploads
        .into_iter()
        .filter(|upload| !upload.bytes.is_empty())
        .filter_map(|upload| match String::from_utf8(upload.bytes) {
            Ok(text) => Some(text),
            Err(_) => {
                warn!(file = %upload.file_name, "could not decode file as UTF-8, skipping");
                None
            }
        })
        .collect())
}
