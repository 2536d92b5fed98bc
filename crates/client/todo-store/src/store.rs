//! The state container and its asynchronous intents.

use std::sync::Arc;

use futures_signals::signal::{Mutable, MutableSignalCloned};
use todo_core::{
    AccessToken, Credentials, DurableStorage, NewTask, PasswordChange, ProfileUpdate,
    Registration, Rejection, StorageError, Task, TaskId, TaskPatch, TaskUpdate, User,
};
use todo_gateway::{ApiConfig, Gateway, GatewayError, GatewayResult, TokenSource};
use tracing::{debug, info, warn};

use crate::action::{Action, LoginSuccess, SessionAction, TasksAction};
use crate::session;
use crate::state::{AppState, reduce};
use crate::status::{Phase, Status};
use crate::theme::Theme;

/// Gives the gateway a read-only view of the in-memory token.
struct SessionTokens(Mutable<AppState>);

impl TokenSource for SessionTokens {
    fn access_token(&self) -> Option<AccessToken> {
        self.0.lock_ref().session.token.clone()
    }
}

/// Shared handle to the client state. Clones share the same state.
#[derive(Clone)]
pub struct Store {
    state: Mutable<AppState>,
    gateway: Gateway,
    storage: Arc<dyn DurableStorage>,
}

impl Store {
    /// Creates a store whose session is rehydrated from `storage`.
    pub fn new(config: ApiConfig, storage: Arc<dyn DurableStorage>) -> GatewayResult<Self> {
        let state = Mutable::new(AppState::restore(storage.as_ref()));
        let tokens = Arc::new(SessionTokens(state.clone()));
        let gateway = Gateway::new(config, tokens, storage.clone())?;

        Ok(Self {
            state,
            gateway,
            storage,
        })
    }

    /// Runs `action` through the root reducer. The lock is released before
    /// this returns.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        let mut state = self.state.lock_mut();
        let current = std::mem::take(&mut *state);
        *state = reduce(current, &action);
    }

    pub fn snapshot(&self) -> AppState {
        self.state.get_cloned()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.lock_ref())
    }

    /// Emits the current state, then every state after a dispatch.
    pub fn signal(&self) -> MutableSignalCloned<AppState> {
        self.state.signal_cloned()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn storage(&self) -> &Arc<dyn DurableStorage> {
        &self.storage
    }

    // Session

    /// Exchanges credentials for a token, then loads the profile with that
    /// token. Both are persisted before the session is marked logged in.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, Rejection> {
        self.dispatch(SessionAction::Login(Phase::Pending));

        let result = self
            .authenticate(&Credentials::new(username, password))
            .await;
        let outcome = match &result {
            Ok(success) => {
                info!("Logged in as {}", success.user.username);
                Ok(success.user.clone())
            }
            Err(rejection) => {
                warn!("Login failed: {}", rejection);
                session::clear(self.storage.as_ref());
                Err(rejection.clone())
            }
        };

        self.dispatch(SessionAction::Login(Phase::settle(result)));
        outcome
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginSuccess, Rejection> {
        const FALLBACK: &str = "Login failed";

        let pair = self
            .gateway
            .obtain_token(credentials)
            .await
            .map_err(|e| e.into_rejection(FALLBACK))?;

        let user = self
            .gateway
            .current_user(Some(&pair.access))
            .await
            .map_err(|e| e.into_rejection(FALLBACK))?;

        session::persist(self.storage.as_ref(), &user, &pair.access).map_err(|e| {
            warn!("Could not persist session: {}", e);
            Rejection::message(FALLBACK)
        })?;

        Ok(LoginSuccess {
            user,
            token: pair.access,
        })
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<User, Rejection> {
        self.dispatch(SessionAction::Register(Phase::Pending));

        let result = self
            .gateway
            .register(registration)
            .await
            .map_err(|e| e.into_rejection("Registration failed"));
        if let Ok(user) = &result {
            info!("Registered {}", user.username);
        }

        self.dispatch(SessionAction::Register(Phase::settle(result.clone())));
        result
    }

    pub fn logout(&self) {
        let username = self.read(|s| s.session.username().map(str::to_string));
        self.dispatch(SessionAction::LoggedOut);
        session::clear(self.storage.as_ref());
        info!("Logged out {}", username.as_deref().unwrap_or("anonymous session"));
    }

    /// Merges name fields the server already accepted into the session user
    /// and the stored profile.
    pub fn update_profile(&self, update: &ProfileUpdate) {
        self.dispatch(SessionAction::ProfileUpdated(update.clone()));
        if let Some(user) = self.read(|s| s.session.user.clone()) {
            session::persist_profile(self.storage.as_ref(), &user);
        }
    }

    /// Sends the name change to the server, then applies what it returned.
    pub async fn save_profile(&self, update: &ProfileUpdate) -> Result<User, Rejection> {
        let saved = self
            .gateway
            .update_profile(update)
            .await
            .map_err(|e| e.into_rejection("Failed to update profile"))?;

        self.update_profile(&saved);
        self.read(|s| s.session.user.clone())
            .ok_or_else(|| Rejection::message("Not logged in"))
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), Rejection> {
        self.gateway
            .change_password(change)
            .await
            .map_err(|e| e.into_rejection("Failed to change password"))
    }

    pub fn reset_status(&self) {
        self.dispatch(SessionAction::ResetStatus);
    }

    // Tasks

    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, Rejection> {
        self.dispatch(TasksAction::Fetch(Phase::Pending));

        let result = self
            .gateway
            .list_tasks()
            .await
            .map_err(|e| e.into_rejection("Failed to fetch tasks"));
        if let Ok(tasks) = &result {
            debug!("Fetched {} tasks", tasks.len());
        }

        self.dispatch(TasksAction::Fetch(Phase::settle(result.clone())));
        result
    }

    /// Fetches only when someone is logged in and nothing was loaded yet.
    /// Returns `None` when skipped. The check is not a lock.
    pub async fn fetch_if_idle(&self) -> Option<Result<Vec<Task>, Rejection>> {
        let idle = self.read(|s| s.session.user.is_some() && s.tasks.status == Status::Idle);
        if !idle {
            return None;
        }
        Some(self.fetch_tasks().await)
    }

    pub async fn add_task(&self, task: &NewTask) -> Result<Task, Rejection> {
        self.dispatch(TasksAction::Add(Phase::Pending));

        let result = self
            .gateway
            .create_task(task)
            .await
            .map_err(|e| e.into_rejection("Failed to add task"));
        if let Ok(created) = &result {
            info!("Added task {}", created.id);
        }

        self.dispatch(TasksAction::Add(Phase::settle(result.clone())));
        result
    }

    /// Returns the merged task, or `None` if it is no longer known locally or
    /// on the server.
    pub async fn update_task(
        &self,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, Rejection> {
        self.dispatch(TasksAction::Update(Phase::Pending));

        let result = match self.gateway.update_task(id, patch).await {
            Ok(update) => Ok(update),
            Err(e) if is_not_found(&e) => {
                debug!("Task {} is gone on the server", id);
                Ok(TaskUpdate::empty(id))
            }
            Err(e) => Err(e.into_rejection("Failed to update task")),
        };
        let failed = result.as_ref().err().cloned();

        self.dispatch(TasksAction::Update(Phase::settle(result)));
        match failed {
            Some(rejection) => Err(rejection),
            None => Ok(self.task(id)),
        }
    }

    /// Flips the completion flag of a locally known task.
    pub async fn toggle_completed(&self, id: TaskId) -> Result<Option<Task>, Rejection> {
        let Some(completed) = self.task(id).map(|t| t.completed) else {
            debug!("Toggle for unknown task {} ignored", id);
            return Ok(None);
        };
        self.update_task(id, &TaskPatch::new().completed(!completed))
            .await
    }

    /// Deleting a task the server no longer has is not an error.
    pub async fn remove_task(&self, id: TaskId) -> Result<(), Rejection> {
        self.dispatch(TasksAction::Remove(Phase::Pending));

        let result = match self.gateway.delete_task(id).await {
            Ok(()) => {
                info!("Deleted task {}", id);
                Ok(id)
            }
            Err(e) if is_not_found(&e) => {
                debug!("Task {} was already deleted", id);
                Ok(id)
            }
            Err(e) => Err(e.into_rejection("Failed to delete task")),
        };
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);

        self.dispatch(TasksAction::Remove(Phase::settle(result)));
        outcome
    }

    /// The locally known task with `id`, if any.
    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.read(|s| s.tasks.items.iter().find(|t| t.id == id).cloned())
    }

    // Theme

    pub fn theme(&self) -> Theme {
        Theme::load(self.storage.as_ref())
    }

    pub fn toggle_theme(&self) -> Result<Theme, StorageError> {
        let theme = self.theme().toggled();
        theme.save(self.storage.as_ref())?;
        debug!("Theme set to {}", theme);
        Ok(theme)
    }
}

fn is_not_found(error: &GatewayError) -> bool {
    error.status() == Some(404)
}
