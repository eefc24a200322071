//! Multipart form parsing for employee create/update requests

use std::collections::HashMap;
use axum::extract::Multipart;
use crate::Error;
use crate::employee::{DocumentField, EmployeeForm};
use crate::server::error::ApiError;
use crate::upload::{PendingUpload, is_pdf};

/// A parsed create/update request: the typed form plus the accepted files
#[derive(Debug)]
pub struct EmployeeSubmission {
    pub form: EmployeeForm,
    pub uploads: Vec<PendingUpload>,
}

/// Read every part of the request.
///
/// Text parts become form fields. File parts must use one of the four
/// document field names, at most once each, and declare `application/pdf`.
/// An empty file part with no filename is treated as "no file chosen".
pub async fn read_submission(mut multipart: Multipart) -> Result<EmployeeSubmission, ApiError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut uploads: Vec<PendingUpload> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            fields.insert(name, value);
            continue;
        };

        let document = DocumentField::from_name(&name)
            .ok_or_else(|| Error::Upload(format!("Unexpected file field: {}", name)))?;
        let content_type = field.content_type().map(str::to_string);
        let declared_pdf = is_pdf(content_type.as_deref());
        let unsupported = || Error::UnsupportedMediaType {
            field: name.clone(),
            content_type: content_type.clone().unwrap_or_default(),
        };

        if !file_name.is_empty() && !declared_pdf {
            return Err(unsupported().into());
        }

        let bytes = field.bytes().await?;
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }
        if !declared_pdf {
            return Err(unsupported().into());
        }
        if uploads.iter().any(|u| u.field == document) {
            return Err(Error::Upload(format!("Unexpected file field: {}", name)).into());
        }

        tracing::debug!(field = %document, file_name = %file_name, size = bytes.len(), "Received document");
        uploads.push(PendingUpload {
            field: document,
            original_name: file_name,
            bytes: bytes.to_vec(),
        });
    }

    let form = EmployeeForm::from_fields(&fields)?;
    Ok(EmployeeSubmission { form, uploads })
}
