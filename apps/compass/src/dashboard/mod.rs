//! Dashboard snapshots, cached per user and bound to one career path.
//!
//! A snapshot is only served while its career-path identity matches the
//! user's current selection. Anything else is dropped on read and
//! regenerated on demand.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::gateway::decode::decode_field;
use crate::gateway::fallback::default_dashboard;
use crate::gateway::recommendations::ProfilePayload;
use crate::gateway::{GatewayClient, GatewayError};
use crate::models::career::{CareerPath, CareerPathIdentity};
use crate::models::dashboard::{DashboardContent, DashboardSnapshot};
use crate::models::user::CurrentUser;
use crate::store::{ClientStore, StorageKey};

const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardRequest<'a> {
    profile: ProfilePayload<'a>,
    career_path: &'a CareerPath,
}

#[derive(Clone)]
pub struct DashboardCache {
    store: ClientStore,
}

impl DashboardCache {
    pub fn new(store: ClientStore) -> Self {
        Self { store }
    }

    /// Returns the cached snapshot for `user_id` only if it was generated for
    /// `current`. A snapshot bound to any other path is removed.
    pub async fn load(
        &self,
        user_id: &str,
        current: &CareerPathIdentity,
    ) -> Option<DashboardSnapshot> {
        let snapshot: DashboardSnapshot = self.store.get_for(StorageKey::Dashboard, user_id).await?;
        if snapshot.career_path.matches(current) {
            debug!("Dashboard cache hit for user {user_id}");
            Some(snapshot)
        } else {
            info!(
                "Discarding dashboard for user {user_id}: built for '{}', selected '{}'",
                snapshot.career_path.title, current.title
            );
            self.store.remove_for(StorageKey::Dashboard, user_id).await;
            None
        }
    }

    pub async fn save(&self, user_id: &str, snapshot: &DashboardSnapshot) -> bool {
        self.store.set_for(StorageKey::Dashboard, user_id, snapshot).await
    }

    pub async fn clear(&self, user_id: &str) {
        self.store.remove_for(StorageKey::Dashboard, user_id).await
    }

    /// Stores `path` as the user's selection. Changing to a different path
    /// drops the dashboard bound to the old one.
    pub async fn select_career_path(&self, user_id: &str, path: &CareerPath) {
        let previous: Option<CareerPath> =
            self.store.get_for(StorageKey::CareerPath, user_id).await;
        let changed = previous
            .map(|p| !p.identity().matches(&path.identity()))
            .unwrap_or(true);
        if changed {
            self.clear(user_id).await;
        }
        self.store.set_for(StorageKey::CareerPath, user_id, path).await;
    }

    /// Serves the cached dashboard or generates, stores and returns a new one.
    /// Generation failures fall back to built-in content for the path.
    pub async fn load_or_generate(
        &self,
        client: &GatewayClient,
        user: &CurrentUser,
        path: &CareerPath,
    ) -> DashboardSnapshot {
        let identity = path.identity();
        if let Some(snapshot) = self.load(&user.id, &identity).await {
            return snapshot;
        }

        let content = match generate_dashboard(client, user, path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Dashboard generation for user {} failed, serving defaults: {e}",
                    user.id
                );
                default_dashboard(path)
            }
        };

        let snapshot = content.into_snapshot(identity);
        self.save(&user.id, &snapshot).await;
        snapshot
    }
}

/// Asks the generation service for dashboard content for `path`.
pub async fn generate_dashboard(
    client: &GatewayClient,
    user: &CurrentUser,
    path: &CareerPath,
) -> Result<DashboardContent, GatewayError> {
    let request = DashboardRequest {
        profile: ProfilePayload::from_user(user),
        career_path: path,
    };
    let text = client.post_envelope(DASHBOARD_PATH, &request).await?;
    Ok(decode_field(&text, "dashboard")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::test_server;
    use axum::{routing::post, Router};
    use chrono::Utc;
    use serde_json::json;

    fn path(id: u32, title: &str) -> CareerPath {
        CareerPath {
            id,
            title: title.to_string(),
            required_skills: vec!["SQL".to_string()],
            ..Default::default()
        }
    }

    fn snapshot_for(path: &CareerPath) -> DashboardSnapshot {
        DashboardSnapshot {
            learning_paths: vec![],
            opportunities: vec![],
            goals: vec![],
            events: vec![],
            career_path: path.identity(),
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_matching_identity_is_returned() {
        let cache = DashboardCache::new(ClientStore::in_memory());
        let analyst = path(1, "Data Analyst");
        cache.save("u1", &snapshot_for(&analyst)).await;

        let loaded = cache.load("u1", &analyst.identity()).await;
        assert_eq!(loaded.map(|s| s.career_path.title), Some("Data Analyst".to_string()));
    }

    #[tokio::test]
    async fn test_mismatched_identity_is_never_returned_and_is_dropped() {
        let store = ClientStore::in_memory();
        let cache = DashboardCache::new(store.clone());
        cache.save("u1", &snapshot_for(&path(1, "Data Analyst"))).await;

        assert!(cache.load("u1", &path(1, "Data Engineer").identity()).await.is_none());
        assert!(!store.has_for(StorageKey::Dashboard, "u1").await);
    }

    #[tokio::test]
    async fn test_same_title_different_id_is_a_mismatch() {
        let cache = DashboardCache::new(ClientStore::in_memory());
        cache.save("u1", &snapshot_for(&path(1, "Data Analyst"))).await;
        assert!(cache.load("u1", &path(2, "Data Analyst").identity()).await.is_none());
    }

    #[tokio::test]
    async fn test_selecting_new_path_drops_dashboard() {
        let store = ClientStore::in_memory();
        let cache = DashboardCache::new(store.clone());
        let first = path(1, "Data Analyst");
        cache.select_career_path("u1", &first).await;
        cache.save("u1", &snapshot_for(&first)).await;

        cache.select_career_path("u1", &first).await;
        assert!(store.has_for(StorageKey::Dashboard, "u1").await);

        cache.select_career_path("u1", &path(2, "UX Designer")).await;
        assert!(!store.has_for(StorageKey::Dashboard, "u1").await);
        let selected: Option<CareerPath> = store.get_for(StorageKey::CareerPath, "u1").await;
        assert_eq!(selected.map(|p| p.title), Some("UX Designer".to_string()));
    }

    #[tokio::test]
    async fn test_generates_on_miss_and_caches() {
        let body = json!({
            "body": json!({
                "dashboard": {
                    "learningPaths": [{"title": "Advanced SQL"}],
                    "goals": [{"title": "Finish portfolio", "completed": false}]
                }
            }).to_string()
        })
        .to_string();
        let app = Router::new().route("/", post(move || async move { body }));
        let client = test_server::client(&test_server::spawn(app).await);

        let store = ClientStore::in_memory();
        let cache = DashboardCache::new(store.clone());
        let user = CurrentUser::new("u1", "u1@example.com");
        let analyst = path(1, "Data Analyst");

        let snapshot = cache.load_or_generate(&client, &user, &analyst).await;
        assert_eq!(snapshot.learning_paths[0].title, "Advanced SQL");
        assert!(snapshot.career_path.matches(&analyst.identity()));
        assert!(cache.load("u1", &analyst.identity()).await.is_some());
    }

    #[tokio::test]
    async fn test_generation_failure_serves_defaults() {
        let client = test_server::client("http://127.0.0.1:9");
        let cache = DashboardCache::new(ClientStore::in_memory());
        let user = CurrentUser::new("u1", "u1@example.com");
        let analyst = path(1, "Data Analyst");

        let snapshot = cache.load_or_generate(&client, &user, &analyst).await;
        assert_eq!(snapshot.learning_paths[0].title, "SQL fundamentals");
    }
}
