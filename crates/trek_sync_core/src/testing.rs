//! In-memory doubles for every port, shared by the store tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    Credentials, FavoriteId, PersistedSession, Registration, Trek, TrekId, UserId,
};
use crate::payload::{
    AccountFields, AuthPayload, FavoriteEntry, ProfileFields, ProfilePayload, TrekRef, UserPayload,
};
use crate::ports::{
    AuthService, CatalogService, FavoritesService, PortError, PortResult, SessionStorage,
};

pub fn sample_trek(id: TrekId) -> Trek {
    Trek {
        id,
        name: format!("Trek {id}"),
        region: "Gandaki".to_string(),
        difficulty: "Moderate".to_string(),
        ..Trek::default()
    }
}

pub fn sample_treks(count: u64) -> Vec<Trek> {
    (1..=count).map(sample_trek).collect()
}

struct Account {
    id: UserId,
    password: String,
    email: String,
    interests: Option<Vec<String>>,
}

#[derive(Default)]
struct FakeState {
    accounts: HashMap<String, Account>,
    valid_tokens: HashSet<String>,
    treks: Vec<Trek>,
    recommendations: Vec<Trek>,
    favorites: Vec<(FavoriteId, UserId, TrekId)>,
    favorites_as_treks: bool,
    next_id: u64,
    network_down: bool,
    failing: HashSet<&'static str>,
    calls: Vec<&'static str>,
    last_recommendation_token: Option<String>,
}

/// A fake backend that keeps its data in memory and records every call.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().next_id = 100;
        backend
    }

    pub fn with_treks(self, treks: Vec<Trek>) -> Self {
        self.state.lock().unwrap().treks = treks;
        self
    }

    pub fn with_recommendations(self, treks: Vec<Trek>) -> Self {
        self.state.lock().unwrap().recommendations = treks;
        self
    }

    pub fn with_account(
        self,
        id: UserId,
        username: &str,
        password: &str,
        interests: Option<Vec<String>>,
    ) -> Self {
        self.state.lock().unwrap().accounts.insert(
            username.to_string(),
            Account {
                id,
                password: password.to_string(),
                email: format!("{username}@example.com"),
                interests,
            },
        );
        self
    }

    /// Makes `list_favorites` return full trek objects instead of join records.
    pub fn with_favorites_as_treks(self) -> Self {
        self.state.lock().unwrap().favorites_as_treks = true;
        self
    }

    pub fn with_favorite(self, record_id: FavoriteId, user_id: UserId, trek_id: TrekId) -> Self {
        self.state
            .lock()
            .unwrap()
            .favorites
            .push((record_id, user_id, trek_id));
        self
    }

    pub fn set_treks(&self, treks: Vec<Trek>) {
        self.state.lock().unwrap().treks = treks;
    }

    pub fn accept_token(&self, token: &str) {
        self.state.lock().unwrap().valid_tokens.insert(token.to_string());
    }

    pub fn set_network_down(&self, down: bool) {
        self.state.lock().unwrap().network_down = down;
    }

    /// Makes the named operation answer HTTP 500 from now on.
    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    /// Adds a favorite record behind the client's back.
    pub fn push_favorite(&self, record_id: FavoriteId, user_id: UserId, trek_id: TrekId) {
        self.state
            .lock()
            .unwrap()
            .favorites
            .push((record_id, user_id, trek_id));
    }

    /// Removes a favorite behind the client's back.
    pub fn drop_favorite(&self, trek_id: TrekId) {
        self.state
            .lock()
            .unwrap()
            .favorites
            .retain(|(_, _, trek)| *trek != trek_id);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| **c == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn favorite_trek_ids(&self) -> Vec<TrekId> {
        self.state
            .lock()
            .unwrap()
            .favorites
            .iter()
            .map(|(_, _, trek)| *trek)
            .collect()
    }

    pub fn last_recommendation_token(&self) -> Option<String> {
        self.state.lock().unwrap().last_recommendation_token.clone()
    }

    pub fn stored_interests(&self, username: &str) -> Option<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(username)
            .and_then(|a| a.interests.clone())
    }

    fn enter(&self, op: &'static str) -> PortResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.network_down {
            return Err(PortError::Network("connection refused".to_string()));
        }
        if state.failing.contains(op) {
            return Err(PortError::Http {
                status: 500,
                message: "HTTP error! status: 500".to_string(),
            });
        }
        Ok(state)
    }
}

fn auth_payload(token: String, id: UserId, username: &str, email: &str, interests: Option<Vec<String>>) -> AuthPayload {
    AuthPayload {
        token,
        user: UserPayload::Nested {
            user: AccountFields {
                id,
                username: username.to_string(),
                email: email.to_string(),
            },
            display_name: Some(username.to_uppercase()),
            photo_url: None,
            profile: Some(ProfileFields { interests }),
        },
    }
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> PortResult<AuthPayload> {
        let mut state = self.enter("login")?;
        let (id, email, interests) = match state.accounts.get(&credentials.username) {
            Some(account) if account.password == credentials.password => {
                (account.id, account.email.clone(), account.interests.clone())
            }
            _ => {
                return Err(PortError::Http {
                    status: 401,
                    message: "Invalid credentials".to_string(),
                })
            }
        };
        let token = format!("token-{}", credentials.username);
        state.valid_tokens.insert(token.clone());
        Ok(auth_payload(token, id, &credentials.username, &email, interests))
    }

    async fn signup(&self, registration: &Registration) -> PortResult<AuthPayload> {
        let mut state = self.enter("signup")?;
        if state.accounts.contains_key(&registration.username) {
            return Err(PortError::Http {
                status: 400,
                message: "Username already taken".to_string(),
            });
        }
        state.next_id += 1;
        let id = state.next_id;
        state.accounts.insert(
            registration.username.clone(),
            Account {
                id,
                password: registration.password.clone(),
                email: registration.email.clone(),
                interests: None,
            },
        );
        let token = format!("token-{}", registration.username);
        state.valid_tokens.insert(token.clone());
        Ok(auth_payload(
            token,
            id,
            &registration.username,
            &registration.email,
            Some(Vec::new()),
        ))
    }

    async fn verify_token(&self, token: &str) -> PortResult<()> {
        let state = self.enter("verify_token")?;
        if state.valid_tokens.contains(token) {
            Ok(())
        } else {
            Err(PortError::Http {
                status: 401,
                message: "Invalid token".to_string(),
            })
        }
    }

    async fn update_interests(
        &self,
        token: &str,
        user_id: UserId,
        interests: &[String],
    ) -> PortResult<ProfilePayload> {
        let mut state = self.enter("update_interests")?;
        if !state.valid_tokens.contains(token) {
            return Err(PortError::Http {
                status: 401,
                message: "Invalid token".to_string(),
            });
        }
        let account = state
            .accounts
            .values_mut()
            .find(|a| a.id == user_id)
            .ok_or_else(|| PortError::Http {
                status: 404,
                message: "Not found".to_string(),
            })?;
        account.interests = Some(interests.to_vec());
        Ok(ProfilePayload {
            profile: Some(ProfileFields {
                interests: Some(interests.to_vec()),
            }),
        })
    }
}

#[async_trait]
impl CatalogService for FakeBackend {
    async fn list_treks(&self) -> PortResult<Vec<Trek>> {
        let state = self.enter("list_treks")?;
        Ok(state.treks.clone())
    }

    async fn get_trek(&self, id: TrekId) -> PortResult<Trek> {
        let state = self.enter("get_trek")?;
        state
            .treks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| PortError::Http {
                status: 404,
                message: "HTTP error! status: 404".to_string(),
            })
    }

    async fn list_recommendations(&self, token: Option<&str>) -> PortResult<Vec<Trek>> {
        let mut state = self.enter("list_recommendations")?;
        state.last_recommendation_token = token.map(str::to_string);
        Ok(state.recommendations.clone())
    }
}

#[async_trait]
impl FavoritesService for FakeBackend {
    async fn list_favorites(&self, _token: Option<&str>) -> PortResult<Vec<FavoriteEntry>> {
        let state = self.enter("list_favorites")?;
        let entries = state
            .favorites
            .iter()
            .map(|(record_id, user_id, trek_id)| {
                if state.favorites_as_treks {
                    let trek = state
                        .treks
                        .iter()
                        .find(|t| t.id == *trek_id)
                        .cloned()
                        .unwrap_or_else(|| sample_trek(*trek_id));
                    FavoriteEntry::Trek(trek)
                } else {
                    FavoriteEntry::Record {
                        id: *record_id,
                        user: Some(*user_id),
                        trek: TrekRef::Id(*trek_id),
                    }
                }
            })
            .collect();
        Ok(entries)
    }

    async fn create_favorite(
        &self,
        _token: Option<&str>,
        user_id: UserId,
        trek_id: TrekId,
    ) -> PortResult<()> {
        let mut state = self.enter("create_favorite")?;
        state.next_id += 1;
        let record_id = state.next_id;
        state.favorites.push((record_id, user_id, trek_id));
        Ok(())
    }

    async fn delete_favorite(&self, _token: Option<&str>, record_id: FavoriteId) -> PortResult<()> {
        let mut state = self.enter("delete_favorite")?;
        let by_trek = state.favorites_as_treks;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|(id, _, trek)| if by_trek { *trek != record_id } else { *id != record_id });
        if state.favorites.len() == before {
            return Err(PortError::Http {
                status: 404,
                message: "Not found".to_string(),
            });
        }
        Ok(())
    }
}

/// Session storage held in memory.
#[derive(Default)]
pub struct MemoryStorage {
    session: Mutex<Option<PersistedSession>>,
    failing: Mutex<bool>,
    corrupt: Mutex<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        let storage = Self::default();
        *storage.session.lock().unwrap() = Some(session);
        storage
    }

    /// Makes every write fail.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Makes `load` report an unreadable blob.
    pub fn set_corrupt(&self, corrupt: bool) {
        *self.corrupt.lock().unwrap() = corrupt;
    }

    pub fn stored(&self) -> Option<PersistedSession> {
        self.session.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> PortResult<Option<PersistedSession>> {
        if *self.corrupt.lock().unwrap() {
            return Err(PortError::Storage("expected value at line 1 column 1".to_string()));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn save(&self, session: &PersistedSession) -> PortResult<()> {
        if *self.failing.lock().unwrap() {
            return Err(PortError::Storage("disk full".to_string()));
        }
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        if *self.failing.lock().unwrap() {
            return Err(PortError::Storage("disk full".to_string()));
        }
        *self.session.lock().unwrap() = None;
        *self.corrupt.lock().unwrap() = false;
        Ok(())
    }
}
