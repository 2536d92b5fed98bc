//! Task collection slice.

use todo_core::{Rejection, Task};
use tracing::debug;

use crate::action::{Action, SessionAction, TasksAction};
use crate::status::{Phase, Status};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasksState {
    pub items: Vec<Task>,
    pub status: Status,
    pub error: Option<Rejection>,
}

/// A new session, or the end of one, always starts from an empty collection.
pub fn reduce(state: TasksState, action: &Action) -> TasksState {
    let action = match action {
        Action::Session(SessionAction::LoggedOut)
        | Action::Session(SessionAction::Login(Phase::Fulfilled(_))) => {
            return TasksState::default();
        }
        Action::Session(_) => return state,
        Action::Tasks(action) => action,
    };

    match action {
        TasksAction::Fetch(phase) => settle(state, phase, |_, tasks| tasks.clone()),
        TasksAction::Add(phase) => settle(state, phase, |mut items, task| {
            items.push(task.clone());
            items
        }),
        TasksAction::Update(phase) => settle(state, phase, |mut items, update| {
            match items.iter_mut().find(|t| t.id == update.id) {
                Some(task) => task.merge(update),
                None => debug!("Update for unknown task {} ignored", update.id),
            }
            items
        }),
        TasksAction::Remove(phase) => settle(state, phase, |mut items, id| {
            items.retain(|t| t.id != *id);
            items
        }),
        TasksAction::Clear => TasksState::default(),
    }
}

/// Shared phase handling. `apply` only runs on fulfilment; a rejection keeps
/// the current items.
fn settle<T>(
    state: TasksState,
    phase: &Phase<T>,
    apply: impl FnOnce(Vec<Task>, &T) -> Vec<Task>,
) -> TasksState {
    match phase {
        Phase::Pending => TasksState {
            status: Status::Loading,
            error: None,
            ..state
        },
        Phase::Fulfilled(value) => TasksState {
            items: apply(state.items, value),
            status: Status::Succeeded,
            error: None,
        },
        Phase::Rejected(rejection) => TasksState {
            status: Status::Failed,
            error: Some(rejection.clone()),
            ..state
        },
    }
}
