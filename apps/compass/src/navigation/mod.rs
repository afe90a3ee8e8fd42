// Client navigation: where a user lands on startup and how stages advance.

use serde::{Deserialize, Serialize};

pub mod decision;
pub mod router;

pub use decision::{
    completion_level, determine_navigation, determine_navigation_with_debug, NavigationDecision,
    StoredStateFlags,
};
pub use router::{RouterState, Screen};

/// The screens of the onboarding flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AccountCreation,
    Preferences,
    SkillsIntake,
    CareerCompass,
    Dashboard,
}

impl Stage {
    /// Stable ordinal, used in logs and analytics.
    pub fn ordinal(&self) -> u8 {
        match self {
            Stage::AccountCreation => 0,
            Stage::Preferences => 1,
            Stage::SkillsIntake => 2,
            Stage::CareerCompass => 3,
            Stage::Dashboard => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::AccountCreation => "account_creation",
            Stage::Preferences => "preferences",
            Stage::SkillsIntake => "skills_intake",
            Stage::CareerCompass => "career_compass",
            Stage::Dashboard => "dashboard",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
