//! Request status shared by both slices.

use serde::{Deserialize, Serialize};
use todo_core::Rejection;

/// Where a slice's last request stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// The three phases of an asynchronous operation, as carried by actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Pending,
    Fulfilled(T),
    Rejected(Rejection),
}

impl<T> Phase<T> {
    /// Maps a finished operation onto its terminal phase.
    pub fn settle(result: Result<T, Rejection>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled(value),
            Err(rejection) => Self::Rejected(rejection),
        }
    }

    /// The slice status this phase leads to.
    pub fn status(&self) -> Status {
        match self {
            Self::Pending => Status::Loading,
            Self::Fulfilled(_) => Status::Succeeded,
            Self::Rejected(_) => Status::Failed,
        }
    }
}
