use serde::{Deserialize, Serialize};

use crate::models::lenient;

/// A single step on a career path roadmap.
/// The remote service sends either a bare string or an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRoadmapStep")]
pub struct RoadmapStep {
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoadmapStep {
    Text(String),
    Detailed {
        #[serde(default, alias = "step", alias = "name")]
        title: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, alias = "timeframe")]
        duration: Option<String>,
    },
}

impl From<RawRoadmapStep> for RoadmapStep {
    fn from(raw: RawRoadmapStep) -> Self {
        match raw {
            RawRoadmapStep::Text(title) => RoadmapStep {
                title,
                ..Default::default()
            },
            RawRoadmapStep::Detailed {
                title,
                description,
                duration,
            } => RoadmapStep {
                title,
                description,
                duration,
            },
        }
    }
}

/// A recommended career path, as returned by the recommendation service and
/// as stored once the user selects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareerPath {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u32,
    pub title: String,
    pub description: String,
    pub salary_range: Option<String>,
    #[serde(deserialize_with = "lenient::score")]
    pub match_score: f64,
    pub required_skills: Vec<String>,
    pub certifications: Vec<String>,
    pub roadmap: Vec<RoadmapStep>,
}

impl CareerPath {
    pub fn identity(&self) -> CareerPathIdentity {
        CareerPathIdentity {
            id: self.id,
            title: self.title.clone(),
        }
    }
}

/// The identity a dashboard snapshot is bound to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareerPathIdentity {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u32,
    pub title: String,
}

impl CareerPathIdentity {
    /// Same id and same title after normalization.
    pub fn matches(&self, other: &CareerPathIdentity) -> bool {
        self.id == other.id && normalize_title(&self.title) == normalize_title(&other.title)
    }
}

/// Lowercases and collapses runs of whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title_collapses_whitespace() {
        assert_eq!(
            normalize_title("  Software   ENGINEER\t"),
            "software engineer"
        );
    }

    #[test]
    fn test_identity_matches_ignores_case_and_spacing() {
        let a = CareerPathIdentity {
            id: 1,
            title: "Data Scientist".to_string(),
        };
        let b = CareerPathIdentity {
            id: 1,
            title: "data  scientist".to_string(),
        };
        assert!(a.matches(&b));
    }

    #[test]
    fn test_identity_differs_on_id() {
        let a = CareerPathIdentity {
            id: 1,
            title: "Data Scientist".to_string(),
        };
        let b = CareerPathIdentity {
            id: 2,
            title: "Data Scientist".to_string(),
        };
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_career_path_deserializes_camel_case_payload() {
        let json = r#"{
            "id": "2",
            "title": "Cloud Architect",
            "description": "Designs cloud platforms",
            "salaryRange": "$120k - $180k",
            "matchScore": "88%",
            "requiredSkills": ["AWS", "Terraform"],
            "certifications": ["AWS Solutions Architect"],
            "roadmap": [
                "Learn networking fundamentals",
                {"step": "Earn an associate certification", "timeframe": "3 months"}
            ]
        }"#;
        let path: CareerPath = serde_json::from_str(json).unwrap();
        assert_eq!(path.id, 2);
        assert!((path.match_score - 88.0).abs() < f64::EPSILON);
        assert_eq!(path.required_skills, vec!["AWS", "Terraform"]);
        assert_eq!(path.roadmap.len(), 2);
        assert_eq!(path.roadmap[0].title, "Learn networking fundamentals");
        assert_eq!(path.roadmap[1].duration.as_deref(), Some("3 months"));
    }

    #[test]
    fn test_career_path_missing_fields_default() {
        let path: CareerPath = serde_json::from_str(r#"{"title": "Analyst"}"#).unwrap();
        assert_eq!(path.id, 0);
        assert_eq!(path.match_score, 0.0);
        assert!(path.roadmap.is_empty());
    }
}
