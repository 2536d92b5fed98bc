//! Typed actions. Reducers are the only consumers.

use todo_core::{AccessToken, ProfileUpdate, Task, TaskId, TaskUpdate, User};

use crate::status::Phase;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Session(SessionAction),
    Tasks(TasksAction),
}

/// Payload of a completed login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    pub user: User,
    pub token: AccessToken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Login(Phase<LoginSuccess>),
    Register(Phase<User>),
    /// Also resets the tasks slice.
    LoggedOut,
    /// Name fields already saved on the server.
    ProfileUpdated(ProfileUpdate),
    ResetStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TasksAction {
    Fetch(Phase<Vec<Task>>),
    Add(Phase<Task>),
    Update(Phase<TaskUpdate>),
    Remove(Phase<TaskId>),
    Clear,
}

impl From<SessionAction> for Action {
    fn from(action: SessionAction) -> Self {
        Self::Session(action)
    }
}

impl From<TasksAction> for Action {
    fn from(action: TasksAction) -> Self {
        Self::Tasks(action)
    }
}
