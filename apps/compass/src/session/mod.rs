//! Account session: the auth-provider port, user-facing auth messages, and
//! the sign-in → resumption flow.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::career::CareerPath;
use crate::models::resume::Resume;
use crate::models::user::{CurrentUser, UserPatch, UserPreferences};
use crate::navigation::{determine_navigation_with_debug, RouterState, Stage, StoredStateFlags};
use crate::store::{ClientStore, StorageKey, SESSION_KEYS};

const MIN_PASSWORD_LEN: usize = 8;

/// Error from the auth provider, discriminated by its `code`.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct AuthError {
    pub code: String,
    pub message: String,
}

impl AuthError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        auth_error_message(&self.code)
    }
}

/// Maps a provider error code to the message shown to the user.
pub fn auth_error_message(code: &str) -> &'static str {
    match code {
        "UserNotConfirmedException" => "Please verify your email before signing in",
        "UserNotFoundException" => "No account found with this email",
        "NotAuthorizedException" => "Incorrect email or password",
        "TooManyRequestsException" => "Too many attempts. Please try again later",
        _ => "Authentication failed",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

/// The external authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthUser, AuthError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError>;
    async fn fetch_attributes(&self) -> Result<HashMap<String, String>, AuthError>;
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("email", "Enter a valid email address"));
    }
    if password.is_empty() {
        return Err(AppError::validation("password", "Enter your password"));
    }
    Ok(())
}

pub struct SessionController<A: AuthProvider> {
    auth: A,
    store: ClientStore,
}

impl<A: AuthProvider> SessionController<A> {
    pub fn new(auth: A, store: ClientStore) -> Self {
        Self { auth, store }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthUser, AppError> {
        validate_credentials(email, password)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        let user = self.auth.sign_up(email.trim(), password, name).await?;
        info!("Signed up user {}", user.user_id);
        Ok(user)
    }

    /// Signs in and positions the user at the stage their stored state calls for.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<RouterState, AppError> {
        validate_credentials(email, password)?;
        let auth_user = self.auth.sign_in(email.trim(), password).await.map_err(|e| {
            warn!("Sign-in failed: {e}");
            AppError::Auth(e)
        })?;
        Ok(self.resume_session(auth_user).await)
    }

    /// Picks up an existing provider session, if any.
    pub async fn restore(&self) -> Result<Option<RouterState>, AppError> {
        match self.auth.current_user().await? {
            Some(auth_user) => Ok(Some(self.resume_session(auth_user).await)),
            None => Ok(None),
        }
    }

    /// Drops the session-scoped keys and signs out. Preferences and resume
    /// stay for the next sign-in.
    pub async fn sign_out(&self, user_id: &str) -> Result<(), AppError> {
        clear_session(&self.store, user_id).await;
        self.auth.sign_out().await?;
        info!("Signed out user {user_id}");
        Ok(())
    }

    async fn resume_session(&self, auth_user: AuthUser) -> RouterState {
        let user = self.hydrate(auth_user).await;
        let flags = StoredStateFlags::load(&self.store, &user.id).await;
        let decision = determine_navigation_with_debug(&user.id, &flags);
        RouterState::resume(user, &decision)
    }

    async fn hydrate(&self, auth_user: AuthUser) -> CurrentUser {
        let name = match self.auth.fetch_attributes().await {
            Ok(mut attributes) => attributes.remove("name"),
            Err(e) => {
                warn!("Could not fetch attributes for {}: {e}", auth_user.user_id);
                None
            }
        };
        CurrentUser {
            name,
            ..load_stored_user(&self.store, &auth_user.user_id, &auth_user.email).await
        }
    }
}

/// Rebuilds the user record from whatever is persisted for `user_id`.
pub async fn load_stored_user(store: &ClientStore, user_id: &str, email: &str) -> CurrentUser {
    CurrentUser {
        preferences: store
            .get_for::<UserPreferences>(StorageKey::Preferences, user_id)
            .await,
        career_path: store.get_for::<CareerPath>(StorageKey::CareerPath, user_id).await,
        resume: store.get_for::<Resume>(StorageKey::Resume, user_id).await,
        ..CurrentUser::new(user_id, email)
    }
}

/// Submits the onboarding questionnaire: validates each field, persists the
/// answers and moves the user on to skills intake. Nothing is stored when
/// validation fails.
pub async fn save_preferences(
    store: &ClientStore,
    state: &RouterState,
    preferences: UserPreferences,
) -> Result<RouterState, AppError> {
    preferences.validate()?;
    let user_id = &state.user().id;
    store
        .try_set_for(StorageKey::Preferences, user_id, &preferences)
        .await?;
    info!("Saved preferences for user {user_id}");
    Ok(state.advance(Some(UserPatch::preferences(preferences)), Stage::SkillsIntake))
}

pub async fn clear_session(store: &ClientStore, user_id: &str) {
    for key in SESSION_KEYS {
        store.remove_for(*key, user_id).await;
    }
}
