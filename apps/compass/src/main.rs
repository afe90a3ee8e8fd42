use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use compass::analytics::{AnalyticsBatcher, AnalyticsHandle, HttpSink};
use compass::config::Config;
use compass::dashboard::DashboardCache;
use compass::gateway::recommendations::{cached_recommendations, refresh_recommendations};
use compass::gateway::GatewayClient;
use compass::models::user::UserPreferences;
use compass::navigation::{
    completion_level, determine_navigation_with_debug, RouterState, Stage, StoredStateFlags,
};
use compass::resume::{ResumeFile, ResumeService};
use compass::session::{clear_session, load_stored_user, save_preferences};
use compass::store::ClientStore;

#[derive(Parser)]
#[command(name = "compass", version, about = "Career Compass client engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show where a returning user lands and how far along they are
    Resume {
        #[arg(long)]
        user: String,
    },
    /// Submit the onboarding questionnaire
    Preferences {
        #[arg(long)]
        user: String,
        #[arg(long)]
        path_type: String,
        #[arg(long)]
        career_stage: String,
        #[arg(long)]
        primary_goal: String,
    },
    /// Fetch, dedupe and store career-path recommendations
    Recommend {
        #[arg(long)]
        user: String,
    },
    /// Select a recommended career path and print its dashboard
    Select {
        #[arg(long)]
        user: String,
        #[arg(long)]
        path_id: u32,
    },
    /// Upload a resume (PDF or plain text) and request analysis
    Upload {
        #[arg(long)]
        user: String,
        file: PathBuf,
        /// Skip the scoring request after upload
        #[arg(long)]
        no_analyze: bool,
    },
    /// Clear session-scoped state. Preferences and resume are kept.
    Logout {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Compass v{}", env!("CARGO_PKG_VERSION"));

    let store = ClientStore::open(&config.storage).await?;
    info!("Client store opened ({:?})", config.storage);

    let client = GatewayClient::new(config.api_url.clone())?;

    let analytics = config.analytics_url.as_ref().map(|url| {
        let sink = Arc::new(HttpSink::new(client.clone(), url.clone()));
        AnalyticsBatcher::new(sink).start(config.analytics_flush_interval)
    });

    let result = run(cli.command, &config, &store, &client, analytics.as_ref()).await;

    if let Some(handle) = analytics {
        let sent = handle.shutdown().await;
        info!("Flushed {sent} analytics events on exit");
    }
    result
}

async fn run(
    command: Command,
    config: &Config,
    store: &ClientStore,
    client: &GatewayClient,
    analytics: Option<&AnalyticsHandle>,
) -> Result<()> {
    match command {
        Command::Resume { user } => {
            let flags = StoredStateFlags::load(store, &user).await;
            let decision = determine_navigation_with_debug(&user, &flags);
            let stage = decision.stage.ordinal();
            track(analytics, "stage_view", &user, json!({ "stage": stage })).await;
            print_json(&json!({
                "userId": user,
                "decision": decision,
                "completionLevel": completion_level(&flags),
            }))
        }
        Command::Preferences {
            user,
            path_type,
            career_stage,
            primary_goal,
        } => {
            let current = load_stored_user(store, &user, "").await;
            let state = RouterState::new(current).advance(None, Stage::Preferences);
            let preferences = UserPreferences {
                path_type,
                career_stage,
                primary_goal,
            };
            let next = save_preferences(store, &state, preferences).await?;
            track(analytics, "preferences_saved", &user, json!({ "stage": next.stage().ordinal() }))
                .await;
            print_json(&json!({
                "userId": user,
                "stage": next.stage(),
                "preferences": next.user().preferences,
            }))
        }
        Command::Recommend { user } => {
            let current = load_stored_user(store, &user, "").await;
            let outcome = refresh_recommendations(client, store, &current).await;
            track(
                analytics,
                "recommendations_loaded",
                &user,
                json!({
                    "count": outcome.recommendations.career_paths.len(),
                    "source": outcome.source,
                }),
            )
            .await;
            print_json(&outcome.recommendations)
        }
        Command::Select { user, path_id } => {
            let recommendations = cached_recommendations(store, &user)
                .await
                .context("No stored recommendations; run `compass recommend` first")?;
            let path = recommendations
                .career_paths
                .into_iter()
                .find(|p| p.id == path_id)
                .with_context(|| format!("No recommended career path with id {path_id}"))?;

            let cache = DashboardCache::new(store.clone());
            cache.select_career_path(&user, &path).await;
            let current = load_stored_user(store, &user, "").await;
            let snapshot = cache.load_or_generate(client, &current, &path).await;
            track(analytics, "career_path_selected", &user, json!({ "title": path.title })).await;
            print_json(&snapshot)
        }
        Command::Upload {
            user,
            file,
            no_analyze,
        } => {
            let file = ResumeFile::from_path(&file).await?;
            let service = ResumeService::new(
                client.clone(),
                store.clone(),
                config.upload_url.clone(),
                config.resume_analysis_timeout,
            );
            let mut resume = service.upload(&user, &file).await?;
            if !no_analyze && resume.has_text() {
                resume = service.analyze(&user, &resume).await?;
            }
            track(analytics, "resume_uploaded", &user, json!({ "file": resume.file_name })).await;
            print_json(&json!({
                "fileName": resume.file_name,
                "storagePath": resume.storage_path,
                "uploadedAt": resume.uploaded_at,
                "analysis": resume.analysis,
            }))
        }
        Command::Logout { user } => {
            clear_session(store, &user).await;
            track(analytics, "logout", &user, json!({})).await;
            info!("Cleared session state for user {user}");
            Ok(())
        }
    }
}

async fn track(
    analytics: Option<&AnalyticsHandle>,
    event_type: &str,
    user_id: &str,
    properties: serde_json::Value,
) {
    if let Some(handle) = analytics {
        handle.batcher().track(event_type, Some(user_id), properties).await;
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
