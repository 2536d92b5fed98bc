//! Root state and reducer.

use todo_core::DurableStorage;

use crate::action::Action;
use crate::session::{self, SessionState};
use crate::tasks::{self, TasksState};

/// The whole client state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub session: SessionState,
    pub tasks: TasksState,
}

impl AppState {
    /// Initial state with the session rehydrated from `storage`. Tasks always
    /// start empty and idle.
    pub fn restore(storage: &dyn DurableStorage) -> Self {
        Self {
            session: SessionState::restore(storage),
            tasks: TasksState::default(),
        }
    }
}

/// Applies `action` to every slice.
pub fn reduce(state: AppState, action: &Action) -> AppState {
    AppState {
        session: session::reduce(state.session, action),
        tasks: tasks::reduce(state.tasks, action),
    }
}
