//! Resumption decision table.
//!
//! Maps which of the four persisted entities exist to the stage a returning
//! user lands on. Rules are evaluated in order and the first match wins:
//!
//! 1. career path            → Dashboard (skip to end)
//! 2. preferences + resume   → CareerCompass
//! 3. preferences            → SkillsIntake
//! 4. otherwise              → AccountCreation
//!
//! Dashboard freshness is not checked here; the dashboard cache drops a
//! snapshot bound to another career path when it is loaded.

use serde::Serialize;
use tracing::debug;

use crate::navigation::Stage;
use crate::store::{ClientStore, StorageKey};

/// Presence of each persisted entity for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoredStateFlags {
    pub preferences: bool,
    pub career_path: bool,
    pub resume: bool,
    pub dashboard: bool,
}

impl StoredStateFlags {
    pub async fn load(store: &ClientStore, user_id: &str) -> Self {
        Self {
            preferences: store.has_for(StorageKey::Preferences, user_id).await,
            career_path: store.has_for(StorageKey::CareerPath, user_id).await,
            resume: store.has_for(StorageKey::Resume, user_id).await,
            dashboard: store.has_for(StorageKey::Dashboard, user_id).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationDecision {
    pub stage: Stage,
    pub skip_to_end: bool,
    pub reason: &'static str,
}

pub fn determine_navigation(flags: &StoredStateFlags) -> NavigationDecision {
    if flags.career_path {
        NavigationDecision {
            stage: Stage::Dashboard,
            skip_to_end: true,
            reason: "career path selected",
        }
    } else if flags.preferences && flags.resume {
        NavigationDecision {
            stage: Stage::CareerCompass,
            skip_to_end: false,
            reason: "preferences and resume on file",
        }
    } else if flags.preferences {
        NavigationDecision {
            stage: Stage::SkillsIntake,
            skip_to_end: false,
            reason: "preferences on file, resume missing",
        }
    } else {
        NavigationDecision {
            stage: Stage::AccountCreation,
            skip_to_end: false,
            reason: "no onboarding data",
        }
    }
}

/// Number of persisted entities present, 0–4. Diagnostics only.
pub fn completion_level(flags: &StoredStateFlags) -> u8 {
    [
        flags.preferences,
        flags.career_path,
        flags.resume,
        flags.dashboard,
    ]
    .iter()
    .filter(|present| **present)
    .count() as u8
}

/// [`determine_navigation`] plus a debug event with the inputs and completion level.
pub fn determine_navigation_with_debug(
    user_id: &str,
    flags: &StoredStateFlags,
) -> NavigationDecision {
    let decision = determine_navigation(flags);
    debug!(
        user_id,
        preferences = flags.preferences,
        career_path = flags.career_path,
        resume = flags.resume,
        dashboard = flags.dashboard,
        completion_level = completion_level(flags),
        stage = %decision.stage,
        skip_to_end = decision.skip_to_end,
        reason = decision.reason,
        "Resolved navigation"
    );
    decision
}
