use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::career::CareerPath;
use crate::models::resume::Resume;

/// Answers from the onboarding questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub path_type: String,
    pub career_stage: String,
    pub primary_goal: String,
}

impl UserPreferences {
    /// Field-level form validation. Reports the first empty field.
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("pathType", &self.path_type),
            ("careerStage", &self.career_stage),
            ("primaryGoal", &self.primary_goal),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(field, "Please choose an option"));
            }
        }
        Ok(())
    }
}

/// The signed-in user as carried between stages.
/// Never mutated in place; stages produce a new record via [`CurrentUser::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub preferences: Option<UserPreferences>,
    pub skills: Vec<String>,
    pub career_path: Option<CareerPath>,
    pub resume: Option<Resume>,
}

/// Fields a stage wants to write into the current user.
/// `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub preferences: Option<UserPreferences>,
    pub skills: Option<Vec<String>>,
    pub career_path: Option<CareerPath>,
    pub resume: Option<Resume>,
}

impl UserPatch {
    pub fn preferences(preferences: UserPreferences) -> Self {
        Self {
            preferences: Some(preferences),
            ..Default::default()
        }
    }

    pub fn career_path(path: CareerPath) -> Self {
        Self {
            career_path: Some(path),
            ..Default::default()
        }
    }

    pub fn resume(resume: Resume) -> Self {
        Self {
            resume: Some(resume),
            ..Default::default()
        }
    }
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    /// Shallow merge: every field present in `patch` replaces the current
    /// value, everything else is carried over.
    pub fn merge(&self, patch: UserPatch) -> CurrentUser {
        CurrentUser {
            id: self.id.clone(),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            name: patch.name.or_else(|| self.name.clone()),
            preferences: patch.preferences.or_else(|| self.preferences.clone()),
            skills: patch.skills.unwrap_or_else(|| self.skills.clone()),
            career_path: patch.career_path.or_else(|| self.career_path.clone()),
            resume: patch.resume.or_else(|| self.resume.clone()),
        }
    }
}
