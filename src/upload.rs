//! Upload boundary: pulls the XML file out of a multipart body and enforces
//! the extension filter and size limit before any parsing happens.

use crate::errors::AppError;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

/// Multipart form field carrying the document.
pub const FILE_FIELD: &str = "file";

/// Slack added to the body limit for multipart framing and other form fields.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// An accepted upload, decoded to text.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub text: String,
}

/// Read the `file` field from `multipart` and validate it.
///
/// Other fields are skipped. Fails with `BadRequest` when the field is
/// missing or the extension is not `.xml`, and with `PayloadTooLarge` when the
/// file exceeds `max_size` bytes.
pub async fn read_upload(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        check_extension(&file_name)?;

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return accept_bytes(file_name, &bytes, max_size);
    }

    Err(AppError::BadRequest(
        "No file provided. Please upload an XML file.".to_string(),
    ))
}

/// Only `.xml` files (any letter case) are accepted.
pub fn check_extension(file_name: &str) -> Result<(), AppError> {
    let is_xml = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));

    if is_xml {
        Ok(())
    } else {
        tracing::warn!("Rejected upload with non-XML file name: {:?}", file_name);
        Err(AppError::BadRequest("Only XML files are allowed".to_string()))
    }
}

/// Enforce the size limit and decode the bytes as UTF-8 (lossy).
pub fn accept_bytes(
    file_name: String,
    bytes: &[u8],
    max_size: usize,
) -> Result<UploadedDocument, AppError> {
    if bytes.len() > max_size {
        tracing::warn!(
            "Rejected upload {}: {} bytes exceeds limit of {}",
            file_name,
            bytes.len(),
            max_size
        );
        return Err(AppError::PayloadTooLarge("File too large".to_string()));
    }

    Ok(UploadedDocument {
        file_name,
        text: String::from_utf8_lossy(bytes).into_owned(),
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File too large".to_string())
    } else {
        AppError::BadRequest(format!("Invalid multipart upload: {}", err.body_text()))
    }
}
