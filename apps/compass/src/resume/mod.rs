//! Resume intake: read and validate a file, upload it, and request analysis.
//!
//! Upload and analysis errors are surfaced to the caller. Unlike
//! recommendations there is no built-in fallback; the user gets a retry.

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::gateway::decode::{decode_field, decode_inner, decode_outer};
use crate::gateway::GatewayClient;
use crate::models::resume::{Resume, ResumeAnalysis};
use crate::store::{ClientStore, StorageKey};

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

const ANALYSIS_PATH: &str = "/resume-analysis";

/// MIME type for an accepted resume extension.
pub fn mime_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "txt" => Some("text/plain"),
        "rtf" => Some("application/rtf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// A validated resume file ready for upload.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::validation("resume", "File name is not valid UTF-8"))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(file_name, bytes)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AppError> {
        let file_name = file_name.into();
        let mime_type = mime_type_for(&file_name).ok_or_else(|| {
            AppError::validation(
                "resume",
                "Unsupported file type. Upload a PDF, Word, text or image file",
            )
        })?;
        if bytes.is_empty() {
            return Err(AppError::validation("resume", "File is empty"));
        }
        if bytes.len() > MAX_RESUME_BYTES {
            return Err(AppError::validation("resume", "File is larger than 10 MB"));
        }
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn content_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Best-effort local text extraction for PDFs and plain text.
    pub fn extract_text(&self) -> Option<String> {
        let text = match self.mime_type {
            "application/pdf" => match pdf_extract::extract_text_from_mem(&self.bytes) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Local PDF text extraction failed for {}: {e}", self.file_name);
                    return None;
                }
            },
            "text/plain" => String::from_utf8_lossy(&self.bytes).into_owned(),
            _ => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    filename: &'a str,
    file_content: String,
    file_type: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UploadResponse {
    #[serde(alias = "key", alias = "location", alias = "path")]
    storage_path: Option<String>,
    #[serde(alias = "textract", alias = "extraction", alias = "ocr")]
    analysis: Option<ResumeAnalysis>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest<'a> {
    user_id: &'a str,
    file_name: &'a str,
    resume_text: &'a str,
}

/// Whole seconds, rounded up so sub-second timeouts never read as zero.
fn secs_rounded_up(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

#[derive(Clone)]
pub struct ResumeService {
    client: GatewayClient,
    store: ClientStore,
    upload_url: String,
    analysis_timeout: Duration,
}

impl ResumeService {
    pub fn new(
        client: GatewayClient,
        store: ClientStore,
        upload_url: impl Into<String>,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            client,
            store,
            upload_url: upload_url.into(),
            analysis_timeout,
        }
    }

    /// Uploads `file`, stores the resulting [`Resume`] for the user, and
    /// returns it. Text extraction from the upload service wins over local
    /// extraction.
    pub async fn upload(&self, user_id: &str, file: &ResumeFile) -> Result<Resume, AppError> {
        let request = UploadRequest {
            filename: &file.file_name,
            file_content: file.content_base64(),
            file_type: file.mime_type,
        };
        let text = self.client.post_json(&self.upload_url, &request, None).await?;

        let response = decode_outer(&text)
            .and_then(decode_inner)
            .ok()
            .and_then(|payload| serde_json::from_value::<UploadResponse>(payload).ok())
            .unwrap_or_default();

        let analysis = response
            .analysis
            .filter(|a| !a.extracted_text.trim().is_empty())
            .or_else(|| {
                file.extract_text().map(|extracted_text| ResumeAnalysis {
                    extracted_text,
                    ..Default::default()
                })
            });

        let resume = Resume {
            file_name: file.file_name.clone(),
            mime_type: file.mime_type.to_string(),
            content_base64: request.file_content,
            uploaded_at: Utc::now(),
            storage_path: response
                .storage_path
                .unwrap_or_else(|| format!("resumes/{user_id}/{}", file.file_name)),
            analysis,
        };

        self.store.set_for(StorageKey::Resume, user_id, &resume).await;
        info!(
            "Uploaded resume {} for user {} ({} bytes)",
            resume.file_name,
            user_id,
            file.bytes.len()
        );
        Ok(resume)
    }

    /// Requests scoring for an uploaded resume, bounded by the analysis
    /// timeout. The stored resume is updated with the result.
    pub async fn analyze(&self, user_id: &str, resume: &Resume) -> Result<Resume, AppError> {
        let resume_text = resume
            .analysis
            .as_ref()
            .map(|a| a.extracted_text.as_str())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::validation("resume", "No text could be read from this resume")
            })?;

        let request = AnalysisRequest {
            user_id,
            file_name: &resume.file_name,
            resume_text,
        };
        let text = self
            .client
            .post_envelope_with_timeout(ANALYSIS_PATH, &request, Some(self.analysis_timeout))
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::AnalysisTimeout(secs_rounded_up(self.analysis_timeout))
                } else {
                    e.into()
                }
            })?;

        let mut analysis: ResumeAnalysis = decode_field(&text, "analysis")
            .map_err(|e| AppError::Gateway(e.into()))?;
        if analysis.extracted_text.trim().is_empty() {
            analysis.extracted_text = resume_text.to_string();
        }

        let updated = Resume {
            analysis: Some(analysis),
            ..resume.clone()
        };
        self.store.set_for(StorageKey::Resume, user_id, &updated).await;
        Ok(updated)
    }

    pub async fn stored(&self, user_id: &str) -> Option<Resume> {
        self.store.get_for(StorageKey::Resume, user_id).await
    }
}
