use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::career::CareerPathIdentity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningPath {
    pub title: String,
    pub provider: Option<String>,
    pub duration: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Opportunity {
    pub title: String,
    pub organization: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Goal {
    pub title: String,
    pub target_date: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub title: String,
    pub date: Option<String>,
    pub location: Option<String>,
}

/// Personalized dashboard content, bound to the career path it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub learning_paths: Vec<LearningPath>,
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub events: Vec<Event>,
    pub career_path: CareerPathIdentity,
    pub generated_at: DateTime<Utc>,
}

/// Dashboard sections as returned by the generation endpoint, before they
/// are bound to a career path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardContent {
    pub learning_paths: Vec<LearningPath>,
    pub opportunities: Vec<Opportunity>,
    pub goals: Vec<Goal>,
    pub events: Vec<Event>,
}

impl DashboardContent {
    pub fn into_snapshot(self, career_path: CareerPathIdentity) -> DashboardSnapshot {
        DashboardSnapshot {
            learning_paths: self.learning_paths,
            opportunities: self.opportunities,
            goals: self.goals,
            events: self.events,
            career_path,
            generated_at: Utc::now(),
        }
    }
}
