use tracing::info;

use crate::models::career::CareerPath;
use crate::models::resume::Resume;
use crate::models::user::{CurrentUser, UserPatch, UserPreferences};
use crate::navigation::decision::{determine_navigation, NavigationDecision, StoredStateFlags};
use crate::navigation::Stage;

/// What the current stage renders, with the sub-step already resolved from
/// the user record.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    AccountCreation,
    Preferences {
        existing: Option<&'a UserPreferences>,
    },
    SkillsIntake {
        resume_on_file: bool,
    },
    CareerCompass {
        resume: Option<&'a Resume>,
    },
    Dashboard {
        career_path: &'a CareerPath,
    },
}

/// Immutable router state: one stage and the user record it renders for.
/// Every transition returns a new state.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterState {
    stage: Stage,
    user: CurrentUser,
}

impl RouterState {
    pub fn new(user: CurrentUser) -> Self {
        Self {
            stage: Stage::AccountCreation,
            user,
        }
    }

    /// Positions a returning user according to a resumption decision.
    pub fn resume(user: CurrentUser, decision: &NavigationDecision) -> Self {
        info!(
            "Resuming user {} at stage {} ({})",
            user.id, decision.stage, decision.reason
        );
        Self {
            stage: decision.stage,
            user,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Merges `patch` into the user and moves to `next`.
    pub fn advance(&self, patch: Option<UserPatch>, next: Stage) -> RouterState {
        let user = match patch {
            Some(patch) => self.user.merge(patch),
            None => self.user.clone(),
        };
        info!(
            "Stage {} -> {} for user {}",
            self.stage.ordinal(),
            next.ordinal(),
            user.id
        );
        RouterState { stage: next, user }
    }

    /// Leaves account creation / sign-in. A user who already carries a
    /// selected career path skips intake entirely.
    pub fn complete_account_creation(&self, patch: UserPatch) -> RouterState {
        let user = self.user.merge(patch);
        let decision = determine_navigation(&flags_from_user(&user));
        let next = match decision.stage {
            Stage::AccountCreation => Stage::Preferences,
            stage => stage,
        };
        RouterState { stage: self.stage, user }.advance(None, next)
    }

    /// Resolves the screen for the current stage. A dashboard without a
    /// selected career path falls back to the compass.
    pub fn screen(&self) -> Screen<'_> {
        match self.stage {
            Stage::AccountCreation => Screen::AccountCreation,
            Stage::Preferences => Screen::Preferences {
                existing: self.user.preferences.as_ref(),
            },
            Stage::SkillsIntake => Screen::SkillsIntake {
                resume_on_file: self.user.resume.is_some(),
            },
            Stage::CareerCompass => Screen::CareerCompass {
                resume: self.user.resume.as_ref(),
            },
            Stage::Dashboard => match self.user.career_path.as_ref() {
                Some(career_path) => Screen::Dashboard { career_path },
                None => Screen::CareerCompass {
                    resume: self.user.resume.as_ref(),
                },
            },
        }
    }
}

/// Presence flags from the in-memory user record. The dashboard is never
/// carried on the user, so its flag is always false here.
pub fn flags_from_user(user: &CurrentUser) -> StoredStateFlags {
    StoredStateFlags {
        preferences: user.preferences.is_some(),
        career_path: user.career_path.is_some(),
        resume: user.resume.is_some(),
        dashboard: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn prefs() -> UserPreferences {
        UserPreferences {
            path_type: "advance".to_string(),
            career_stage: "senior".to_string(),
            primary_goal: "promotion".to_string(),
        }
    }

    fn resume() -> Resume {
        Resume {
            file_name: "cv.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            content_base64: "JVBERi0=".to_string(),
            uploaded_at: Utc::now(),
            storage_path: "resumes/u1/cv.pdf".to_string(),
            analysis: None,
        }
    }

    fn path() -> CareerPath {
        CareerPath {
            id: 1,
            title: "Product Manager".to_string(),
            match_score: 90.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_user_starts_at_account_creation() {
        let state = RouterState::new(CurrentUser::new("u1", "u1@example.com"));
        assert_eq!(state.stage(), Stage::AccountCreation);
        assert_eq!(state.screen(), Screen::AccountCreation);
    }

    #[test]
    fn test_advance_merges_rather_than_replaces() {
        let state = RouterState::new(CurrentUser::new("u1", "u1@example.com"))
            .advance(Some(UserPatch::preferences(prefs())), Stage::SkillsIntake)
            .advance(Some(UserPatch::resume(resume())), Stage::CareerCompass)
            .advance(Some(UserPatch::career_path(path())), Stage::Dashboard);

        assert_eq!(state.stage(), Stage::Dashboard);
        assert_eq!(state.user().preferences, Some(prefs()));
        assert!(state.user().resume.is_some());
        assert_eq!(state.user().email, "u1@example.com");
        assert_eq!(
            state.screen(),
            Screen::Dashboard {
                career_path: &path()
            }
        );
    }

    #[test]
    fn test_advance_leaves_previous_state_untouched() {
        let first = RouterState::new(CurrentUser::new("u1", "u1@example.com"));
        let second = first.advance(Some(UserPatch::preferences(prefs())), Stage::SkillsIntake);
        assert_eq!(first.stage(), Stage::AccountCreation);
        assert!(first.user().preferences.is_none());
        assert!(second.user().preferences.is_some());
    }

    #[test]
    fn test_sign_in_with_career_path_skips_intake() {
        let state = RouterState::new(CurrentUser::new("u1", "u1@example.com"))
            .complete_account_creation(UserPatch::career_path(path()));
        assert_eq!(state.stage(), Stage::Dashboard);
    }

    #[test]
    fn test_sign_in_fresh_user_goes_to_questionnaire() {
        let state = RouterState::new(CurrentUser::new("u1", "u1@example.com"))
            .complete_account_creation(UserPatch::default());
        assert_eq!(state.stage(), Stage::Preferences);
        assert_eq!(state.screen(), Screen::Preferences { existing: None });
    }

    #[test]
    fn test_sign_in_with_preferences_goes_to_intake() {
        let state = RouterState::new(CurrentUser::new("u1", "u1@example.com"))
            .complete_account_creation(UserPatch::preferences(prefs()));
        assert_eq!(state.stage(), Stage::SkillsIntake);
        assert_eq!(
            state.screen(),
            Screen::SkillsIntake {
                resume_on_file: false
            }
        );
    }

    #[test]
    fn test_dashboard_without_path_falls_back_to_compass() {
        let state = RouterState::new(CurrentUser::new("u1", "u1@example.com"))
            .advance(None, Stage::Dashboard);
        assert_eq!(state.screen(), Screen::CareerCompass { resume: None });
    }

    #[test]
    fn test_resume_uses_decision_stage() {
        let decision = determine_navigation(&StoredStateFlags {
            preferences: true,
            resume: true,
            ..Default::default()
        });
        let state = RouterState::resume(CurrentUser::new("u1", "u1@example.com"), &decision);
        assert_eq!(state.stage(), Stage::CareerCompass);
    }
}
