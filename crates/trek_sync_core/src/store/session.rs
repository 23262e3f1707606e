//! crates/trek_sync_core/src/store/session.rs
//!
//! The session store: the signed-in user, their token and the onboarding flag.
//! It is the only writer of the persisted session blob.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::{Credentials, PersistedSession, Registration, UserId, UserProfile};
use crate::error::SyncError;
use crate::payload::{normalize_user, AuthPayload};
use crate::ports::{AuthService, SessionStorage};

/// Observable state of the session store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
    pub has_completed_onboarding: bool,
}

impl SessionState {
    /// The user's survey answers, empty when signed out or not yet answered.
    pub fn interests(&self) -> &[String] {
        self.user
            .as_ref()
            .and_then(|u| u.interests.as_deref())
            .unwrap_or(&[])
    }

    fn sign_out(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        self.has_completed_onboarding = false;
    }
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthService>, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            auth,
            storage,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.state.borrow().user.as_ref().map(|u| u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.state.borrow().has_completed_onboarding
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    pub fn clear_success_message(&self) {
        self.state.send_modify(|s| s.success_message = None);
    }

    //=====================================================================================
    // Actions
    //=====================================================================================

    /// Signs in with a username and password.
    ///
    /// On failure the message is recorded in `error` and also returned, so the
    /// caller can show it in a modal.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SyncError> {
        self.begin();
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let result = match self.auth.login(&credentials).await {
            Ok(payload) => {
                let (token, mut user) = split_payload(payload);
                // A returning user always has an interest list, possibly empty.
                user.interests.get_or_insert_with(Vec::new);
                self.start_session(token, user, true, "Login successful!")
                    .await
            }
            Err(e) => Err(SyncError::from(e).into_auth()),
        };

        if let Err(err) = &result {
            error!("Login failed for {}: {}", username, err);
            self.fail(err);
        }
        result
    }

    /// Creates an account and signs into it. New accounts have not been onboarded.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<(), SyncError> {
        self.begin();
        let registration = Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
            photo_url: photo_url.map(str::to_string),
        };

        let result = match self.auth.signup(&registration).await {
            Ok(payload) => {
                let (token, mut user) = split_payload(payload);
                user.interests = None;
                self.start_session(token, user, false, "Registration successful!")
                    .await
            }
            Err(e) => Err(SyncError::from(e).into_auth()),
        };

        if let Err(err) = &result {
            error!("Registration failed for {}: {}", username, err);
            self.fail(err);
        }
        result
    }

    /// Forgets the session in memory and on disk. Calling it twice is harmless.
    ///
    /// Memory is always cleared; the error only reports a storage failure.
    pub async fn logout(&self) -> Result<(), SyncError> {
        let cleared = self.storage.clear().await.map_err(SyncError::from);
        self.state.send_modify(|s| {
            s.sign_out();
            s.is_loading = false;
            match &cleared {
                Ok(()) => {
                    s.error = None;
                    s.success_message = Some("Logged out successfully".to_string());
                }
                Err(err) => s.error = Some(err.to_string()),
            }
        });
        match &cleared {
            Ok(()) => info!("Logged out"),
            Err(err) => error!("Failed to clear persisted session: {}", err),
        }
        cleared
    }

    /// Asks the server whether the current token is still good.
    ///
    /// Any failure, including a network error, signs the user out.
    pub async fn check_token_validity(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        match self.auth.verify_token(&token).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Stored token rejected: {}", e);
                self.discard_session().await;
                false
            }
        }
    }

    /// Restores the persisted session at startup and re-validates its token.
    ///
    /// Returns whether a trusted session is active afterwards.
    pub async fn init_auth(&self) -> bool {
        match self.storage.load().await {
            Ok(Some(persisted)) if persisted.token.is_some() => {
                debug!(
                    "Restoring session saved at {}",
                    persisted.saved_at.to_rfc3339()
                );
                self.state.send_modify(|s| {
                    s.has_completed_onboarding = persisted
                        .user
                        .as_ref()
                        .is_some_and(|u| u.interests.is_some());
                    s.user = persisted.user;
                    s.token = persisted.token;
                    s.is_authenticated = persisted.is_authenticated;
                });
                let valid = self.check_token_validity().await;
                if !valid {
                    info!("Stored token is invalid, user needs to login again");
                }
                valid && self.is_authenticated()
            }
            Ok(_) => {
                debug!("No persisted session");
                false
            }
            Err(e) => {
                error!("Auth initialization error: {}", e);
                self.discard_session().await;
                false
            }
        }
    }

    /// Saves the onboarding survey answers.
    ///
    /// Onboarding is marked complete even when this fails, so the user is never
    /// trapped in the survey. Returns whether the server accepted the answers.
    pub async fn update_interests(&self, interests: &[String]) -> bool {
        let (user, token) = {
            let s = self.state.borrow();
            (s.user.clone(), s.token.clone())
        };
        let (Some(user), Some(token)) = (user, token) else {
            warn!("Cannot update interests: user not logged in");
            self.state.send_modify(|s| {
                s.has_completed_onboarding = true;
                s.error = Some(SyncError::NotAuthenticated.to_string());
            });
            return false;
        };

        match self.auth.update_interests(&token, user.id, interests).await {
            Ok(profile) => {
                let stored = profile.into_interests();
                info!("Saved {} interests for user {}", stored.len(), user.id);
                self.state.send_modify(|s| {
                    if let Some(current) = s.user.as_mut().filter(|u| u.id == user.id) {
                        current.interests = Some(stored);
                    }
                    s.has_completed_onboarding = true;
                });
                if let Err(e) = self.persist().await {
                    warn!("Failed to persist updated interests: {}", e);
                }
                true
            }
            Err(e) => {
                let err = SyncError::from(e);
                warn!("Error updating interests: {}", err);
                self.state.send_modify(|s| {
                    s.has_completed_onboarding = true;
                    s.error = Some(err.to_string());
                });
                false
            }
        }
    }

    //=====================================================================================
    // Internals
    //=====================================================================================

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
            s.success_message = None;
        });
    }

    fn fail(&self, err: &SyncError) {
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.error = Some(err.to_string());
        });
    }

    /// Persists first so a session is never active in memory but lost on restart.
    async fn start_session(
        &self,
        token: String,
        user: UserProfile,
        onboarded: bool,
        message: &str,
    ) -> Result<(), SyncError> {
        let persisted = PersistedSession {
            user: Some(user.clone()),
            token: Some(token.clone()),
            is_authenticated: true,
            saved_at: Utc::now(),
        };
        self.storage.save(&persisted).await?;

        info!("Session started for user {}", user.id);
        self.state.send_modify(|s| {
            s.user = Some(user);
            s.token = Some(token);
            s.is_authenticated = true;
            s.is_loading = false;
            s.success_message = Some(message.to_string());
            s.has_completed_onboarding = onboarded;
        });
        Ok(())
    }

    async fn persist(&self) -> Result<(), SyncError> {
        let persisted = {
            let s = self.state.borrow();
            PersistedSession {
                user: s.user.clone(),
                token: s.token.clone(),
                is_authenticated: s.is_authenticated,
                saved_at: Utc::now(),
            }
        };
        self.storage.save(&persisted).await?;
        Ok(())
    }

    async fn discard_session(&self) {
        if let Err(e) = self.storage.clear().await {
            error!("Failed to clear persisted session: {}", e);
        }
        self.state.send_modify(SessionState::sign_out);
    }
}

fn split_payload(payload: AuthPayload) -> (String, UserProfile) {
    (payload.token, normalize_user(payload.user))
}
