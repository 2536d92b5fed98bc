//! Session slice: who is logged in and with which token.

use todo_core::{AccessToken, DurableStorage, Rejection, StorageError, StorageKey, User};
use tracing::{debug, warn};

use crate::action::{Action, SessionAction};
use crate::status::{Phase, Status};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<AccessToken>,
    pub status: Status,
    pub error: Option<Rejection>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_empty())
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// Rebuilds the session persisted by an earlier login.
    ///
    /// Profile and token are only restored together. A lone or unreadable
    /// entry is removed so storage matches the logged-out state.
    pub fn restore(storage: &dyn DurableStorage) -> Self {
        match load(storage) {
            Ok(Some((user, token))) => {
                debug!("Restored session for {}", user.username);
                Self {
                    user: Some(user),
                    token: Some(token),
                    ..Self::default()
                }
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Discarding stored session: {}", e);
                clear(storage);
                Self::default()
            }
        }
    }
}

pub fn reduce(state: SessionState, action: &Action) -> SessionState {
    let Action::Session(action) = action else {
        return state;
    };

    match action {
        SessionAction::Login(phase) => match phase {
            Phase::Pending => SessionState {
                status: Status::Loading,
                error: None,
                ..state
            },
            Phase::Fulfilled(success) => SessionState {
                user: Some(success.user.clone()),
                token: Some(success.token.clone()),
                status: Status::Succeeded,
                error: None,
            },
            Phase::Rejected(rejection) => SessionState {
                user: None,
                token: None,
                status: Status::Failed,
                error: Some(rejection.clone()),
            },
        },
        SessionAction::Register(phase) => SessionState {
            status: phase.status(),
            error: match phase {
                Phase::Rejected(rejection) => Some(rejection.clone()),
                _ => None,
            },
            ..state
        },
        SessionAction::LoggedOut => SessionState::default(),
        SessionAction::ProfileUpdated(update) => {
            let mut state = state;
            if let Some(user) = state.user.as_mut() {
                user.apply(update);
            }
            state
        }
        SessionAction::ResetStatus => SessionState {
            status: Status::Idle,
            error: None,
            ..state
        },
    }
}

/// Writes profile and token together. If the profile cannot be written the
/// token is removed again.
pub(crate) fn persist(
    storage: &dyn DurableStorage,
    user: &User,
    token: &AccessToken,
) -> Result<(), StorageError> {
    let profile = serde_json::to_string(user).map_err(|e| StorageError::Corrupt {
        key: StorageKey::User.as_str(),
        reason: e.to_string(),
    })?;

    storage.set(StorageKey::Token, token.as_str())?;
    if let Err(e) = storage.set(StorageKey::User, &profile) {
        clear(storage);
        return Err(e);
    }
    Ok(())
}

/// Rewrites only the stored profile, e.g. after a name change.
pub(crate) fn persist_profile(storage: &dyn DurableStorage, user: &User) {
    match serde_json::to_string(user) {
        Ok(profile) => {
            if let Err(e) = storage.set(StorageKey::User, &profile) {
                warn!("Could not store updated profile: {}", e);
            }
        }
        Err(e) => warn!("Could not serialize profile: {}", e),
    }
}

/// Removes both session entries. Failures are logged, never returned, since
/// logout must always complete.
pub(crate) fn clear(storage: &dyn DurableStorage) {
    for key in [StorageKey::User, StorageKey::Token] {
        if let Err(e) = storage.remove(key) {
            warn!("Could not remove stored {}: {}", key.as_str(), e);
        }
    }
}

fn load(storage: &dyn DurableStorage) -> Result<Option<(User, AccessToken)>, StorageError> {
    let profile = storage.get(StorageKey::User)?;
    let token = storage
        .get(StorageKey::Token)?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    match (profile, token) {
        (None, None) => Ok(None),
        (Some(profile), Some(token)) => {
            let user = serde_json::from_str(&profile).map_err(|e| StorageError::Corrupt {
                key: StorageKey::User.as_str(),
                reason: e.to_string(),
            })?;
            Ok(Some((user, AccessToken::new(token))))
        }
        _ => Err(StorageError::Corrupt {
            key: StorageKey::Token.as_str(),
            reason: "profile and token must be stored together".to_string(),
        }),
    }
}
