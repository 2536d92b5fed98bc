//! Bearer token resolution.

use todo_core::{AccessToken, DurableStorage, StorageKey};
use tracing::{debug, warn};

/// In-memory view of the current session's access token.
///
/// The store implements this over its state container; the gateway only ever
/// reads through it.
pub trait TokenSource: Send + Sync + 'static {
    fn access_token(&self) -> Option<AccessToken>;
}

/// A source that never has a token. Useful for one-off unauthenticated clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

impl TokenSource for NoSession {
    fn access_token(&self) -> Option<AccessToken> {
        None
    }
}

/// Picks the token for the next request: memory first, then durable storage.
///
/// The storage fallback covers the window right after login where the token
/// is persisted but not yet in state. Empty tokens count as absent.
pub(crate) fn resolve_bearer(
    session: &dyn TokenSource,
    storage: &dyn DurableStorage,
) -> Option<AccessToken> {
    if let Some(token) = session.access_token().filter(|t| !t.is_empty()) {
        return Some(token);
    }

    match storage.get(StorageKey::Token) {
        Ok(Some(raw)) if !raw.trim().is_empty() => {
            debug!("Using access token from durable storage");
            Some(AccessToken::new(raw.trim()))
        }
        Ok(_) => None,
        Err(e) => {
            warn!("Could not read stored access token: {}", e);
            None
        }
    }
}
