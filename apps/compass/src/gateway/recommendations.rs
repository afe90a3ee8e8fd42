//! Career-path recommendations from the remote generation service.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::gateway::decode::{decode_field, DecodeError};
use crate::gateway::dedup::dedupe_career_paths;
use crate::gateway::fallback::default_recommendations;
use crate::gateway::{GatewayClient, GatewayError};
use crate::models::career::CareerPath;
use crate::models::user::{CurrentUser, UserPreferences};
use crate::store::{ClientStore, StorageKey};

const RECOMMENDATIONS_PATH: &str = "/recommendations";

/// The `recommendations` field of the response payload.
/// Accepts either the full object or a bare array of career paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRecommendations")]
pub struct Recommendations {
    pub career_paths: Vec<CareerPath>,
    pub summary: Option<String>,
    pub skill_gaps: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecommendations {
    Paths(Vec<CareerPath>),
    Full {
        #[serde(default, rename = "careerPaths", alias = "paths")]
        career_paths: Vec<CareerPath>,
        #[serde(default)]
        summary: Option<String>,
        #[serde(default, rename = "skillGaps")]
        skill_gaps: Vec<String>,
    },
}

impl From<RawRecommendations> for Recommendations {
    fn from(raw: RawRecommendations) -> Self {
        match raw {
            RawRecommendations::Paths(career_paths) => Recommendations {
                career_paths,
                ..Default::default()
            },
            RawRecommendations::Full {
                career_paths,
                summary,
                skill_gaps,
            } => Recommendations {
                career_paths,
                summary,
                skill_gaps,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationOutcome {
    pub recommendations: Recommendations,
    pub source: RecommendationSource,
}

/// Profile and career context sent to the service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload<'a> {
    pub user_id: &'a str,
    pub preferences: Option<&'a UserPreferences>,
    pub skills: &'a [String],
    pub resume_file_name: Option<&'a str>,
    pub resume_text: Option<&'a str>,
    pub current_career_path: Option<&'a str>,
}

impl<'a> ProfilePayload<'a> {
    pub fn from_user(user: &'a CurrentUser) -> Self {
        Self {
            user_id: &user.id,
            preferences: user.preferences.as_ref(),
            skills: &user.skills,
            resume_file_name: user.resume.as_ref().map(|r| r.file_name.as_str()),
            resume_text: user
                .resume
                .as_ref()
                .and_then(|r| r.analysis.as_ref())
                .map(|a| a.extracted_text.as_str())
                .filter(|t| !t.trim().is_empty()),
            current_career_path: user.career_path.as_ref().map(|p| p.title.as_str()),
        }
    }
}

async fn request_recommendations(
    client: &GatewayClient,
    user: &CurrentUser,
) -> Result<Recommendations, GatewayError> {
    let text = client
        .post_envelope(RECOMMENDATIONS_PATH, &ProfilePayload::from_user(user))
        .await?;
    let recommendations: Recommendations = decode_field(&text, "recommendations")?;
    if recommendations.career_paths.is_empty() {
        return Err(DecodeError::MissingField("careerPaths").into());
    }
    Ok(recommendations)
}

/// Fetches and deduplicates recommendations for `user`.
/// Never fails: any transport or decode problem yields the built-in set.
pub async fn fetch_recommendations(
    client: &GatewayClient,
    user: &CurrentUser,
) -> RecommendationOutcome {
    let (mut recommendations, source) = match request_recommendations(client, user).await {
        Ok(recommendations) => (recommendations, RecommendationSource::Remote),
        Err(e) => {
            warn!(
                "Recommendations for user {} unavailable, serving defaults: {e}",
                user.id
            );
            (default_recommendations(), RecommendationSource::Fallback)
        }
    };

    let before = recommendations.career_paths.len();
    recommendations.career_paths = dedupe_career_paths(recommendations.career_paths);
    info!(
        "Recommendations for user {}: {} paths ({} after dedup, {:?})",
        user.id,
        before,
        recommendations.career_paths.len(),
        source
    );

    RecommendationOutcome {
        recommendations,
        source,
    }
}

/// Fetches recommendations and caches them for the user. Last write wins
/// when several refreshes race.
pub async fn refresh_recommendations(
    client: &GatewayClient,
    store: &ClientStore,
    user: &CurrentUser,
) -> RecommendationOutcome {
    let outcome = fetch_recommendations(client, user).await;
    store
        .set_for(StorageKey::Recommendations, &user.id, &outcome.recommendations)
        .await;
    outcome
}

pub async fn cached_recommendations(store: &ClientStore, user_id: &str) -> Option<Recommendations> {
    store.get_for(StorageKey::Recommendations, user_id).await
}
