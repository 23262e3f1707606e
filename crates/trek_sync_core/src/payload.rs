//! crates/trek_sync_core/src/payload.rs
//!
//! Response shapes emitted by the backend, and the functions that normalize
//! them into domain types. The backend is inconsistent about nesting, so each
//! ambiguous shape is an untagged union resolved here at the boundary.

use serde::Deserialize;

use crate::domain::{FavoriteId, Trek, TrekId, UserId, UserProfile};

//=========================================================================================
// Auth Payloads
//=========================================================================================

/// Body returned by the login and signup endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserPayload,
}

/// The user object of an auth response.
///
/// `Nested` is what the backend sends today: the account fields live under an
/// inner `user` key and the interests under `profile`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserPayload {
    Nested {
        user: AccountFields,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        photo_url: Option<String>,
        #[serde(default)]
        profile: Option<ProfileFields>,
    },
    Flat {
        #[serde(flatten)]
        account: AccountFields,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        photo_url: Option<String>,
        #[serde(default)]
        interests: Option<Vec<String>>,
        #[serde(default)]
        profile: Option<ProfileFields>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountFields {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub interests: Option<Vec<String>>,
}

/// Body returned by the profile PATCH endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePayload {
    #[serde(default)]
    pub profile: Option<ProfileFields>,
}

impl ProfilePayload {
    /// The interests the server stored, or an empty list if it echoed none.
    pub fn into_interests(self) -> Vec<String> {
        self.profile.and_then(|p| p.interests).unwrap_or_default()
    }
}

/// Converts either user shape into a `UserProfile`.
pub fn normalize_user(payload: UserPayload) -> UserProfile {
    let (account, display_name, photo_url, interests) = match payload {
        UserPayload::Nested {
            user,
            display_name,
            photo_url,
            profile,
        } => (user, display_name, photo_url, profile.and_then(|p| p.interests)),
        UserPayload::Flat {
            account,
            display_name,
            photo_url,
            interests,
            profile,
        } => {
            let interests = profile.and_then(|p| p.interests).or(interests);
            (account, display_name, photo_url, interests)
        }
    };

    UserProfile {
        id: account.id,
        display_name: display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| account.username.clone()),
        username: account.username,
        email: account.email,
        photo_url: photo_url.filter(|url| !url.is_empty()),
        interests,
    }
}

//=========================================================================================
// Favorite Payloads
//=========================================================================================

/// One element of the favorites collection.
///
/// `Record` must stay first: a trek object never has a `trek` key, but a
/// sparse join record could otherwise parse as a defaulted `Trek`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FavoriteEntry {
    Record {
        id: FavoriteId,
        #[serde(default)]
        user: Option<UserId>,
        trek: TrekRef,
    },
    Trek(Trek),
}

/// The `trek` foreign key of a join record, either bare or expanded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TrekRef {
    Id(TrekId),
    Object(Box<Trek>),
}

impl TrekRef {
    pub fn id(&self) -> TrekId {
        match self {
            TrekRef::Id(id) => *id,
            TrekRef::Object(trek) => trek.id,
        }
    }
}

impl FavoriteEntry {
    /// The id of the favorited trek.
    pub fn trek_id(&self) -> TrekId {
        match self {
            FavoriteEntry::Record { trek, .. } => trek.id(),
            FavoriteEntry::Trek(trek) => trek.id,
        }
    }

    /// The id to address this favorite by when deleting it.
    ///
    /// A bare trek entry means the server keys favorites by trek id.
    pub fn record_id(&self) -> FavoriteId {
        match self {
            FavoriteEntry::Record { id, .. } => *id,
            FavoriteEntry::Trek(trek) => trek.id,
        }
    }

    /// The full trek if the entry carries one, otherwise the id to resolve.
    pub fn into_trek(self) -> Result<Trek, TrekId> {
        match self {
            FavoriteEntry::Record {
                trek: TrekRef::Object(trek),
                ..
            } => Ok(*trek),
            FavoriteEntry::Record {
                trek: TrekRef::Id(id),
                ..
            } => Err(id),
            FavoriteEntry::Trek(trek) => Ok(trek),
        }
    }
}
