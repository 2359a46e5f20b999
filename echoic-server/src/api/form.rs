//! Multipart form collection shared by upload handlers

use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};

/// A file part: client filename (if any) and contents
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Text fields and file parts of one multipart request
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Drain a multipart stream
    ///
    /// A part counts as a file when it carries a filename; empty file parts
    /// are dropped so "no file selected" reads as absent.
    pub async fn collect(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field.file_name().map(str::to_string);

            if filename.is_some() {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                if !bytes.is_empty() {
                    form.files.insert(
                        name,
                        UploadedFile {
                            filename: filename.filter(|f| !f.is_empty()),
                            bytes: bytes.to_vec(),
                        },
                    );
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    /// Trimmed text field, `None` when missing or blank
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}
