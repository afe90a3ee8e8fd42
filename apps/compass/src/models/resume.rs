use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::lenient;

/// Text extraction / scoring result attached to an uploaded resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeAnalysis {
    #[serde(alias = "text")]
    pub extracted_text: String,
    #[serde(deserialize_with = "lenient::score")]
    pub score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub detected_skills: Vec<String>,
}

/// Resume metadata and content as persisted after upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub file_name: String,
    pub mime_type: String,
    pub content_base64: String,
    pub uploaded_at: DateTime<Utc>,
    pub storage_path: String,
    #[serde(default)]
    pub analysis: Option<ResumeAnalysis>,
}

impl Resume {
    pub fn has_text(&self) -> bool {
        self.analysis
            .as_ref()
            .map(|a| !a.extracted_text.trim().is_empty())
            .unwrap_or(false)
    }
}
