use std::io::Read;

use uuid::Uuid;

use crate::chain;
use crate::domain::{EvidenceFile, ValidationWarning};

/// One file picked for upload. The reader supplies the raw bytes; name and
/// MIME type come from the picker.
pub struct EvidenceUpload<R> {
    pub name: String,
    pub mime_type: String,
    /// Inline renderable representation; honored for image/* uploads only.
    pub preview: Option<String>,
    pub reader: R,
}

/// Hash an upload batch into stored evidence records.
///
/// Failure semantics are per file, not per batch: an unreadable upload is
/// dropped with a warning and the remaining files are unaffected. Output
/// order always matches upload order, regardless of how long each file takes
/// to hash.
pub fn prepare_evidence<R: Read>(
    uploads: Vec<EvidenceUpload<R>>,
) -> (Vec<EvidenceFile>, Vec<ValidationWarning>) {
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for mut upload in uploads {
        let (content_hash, size_bytes) = match chain::hash_reader(&mut upload.reader) {
            Ok(v) => v,
            Err(e) => {
                warnings.push(
                    ValidationWarning::new(
                        "EVIDENCE_HASH_FAILED",
                        format!("Rejected {} from the upload batch", upload.name),
                    )
                    .with_details(e.to_string()),
                );
                continue;
            }
        };

        let preview = match upload.preview {
            Some(p) if upload.mime_type.starts_with("image/") => Some(p),
            Some(_) => {
                warnings.push(ValidationWarning::new(
                    "EVIDENCE_PREVIEW_DROPPED",
                    format!("Preview discarded for non-image upload {}", upload.name),
                ));
                None
            }
            None => None,
        };

        files.push(EvidenceFile {
            id: Uuid::new_v4().to_string(),
            name: upload.name,
            mime_type: upload.mime_type,
            size_bytes: size_bytes as i64,
            content_hash,
            preview,
        });
    }

    (files, warnings)
}
