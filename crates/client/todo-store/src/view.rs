//! What the dashboard shows: ownership check, filter and sort over the task
//! slice, plus a purely visual reordering overlay.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use todo_core::{Task, TaskId};
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    CreatedAsc,
    #[default]
    CreatedDesc,
    DueAsc,
    DueDesc,
}

impl TaskSort {
    /// Tasks without a due date go last in both due-date orders.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::CreatedAsc => a.created_at.cmp(&b.created_at),
            Self::CreatedDesc => b.created_at.cmp(&a.created_at),
            Self::DueAsc | Self::DueDesc => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) if *self == Self::DueAsc => x.cmp(&y),
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

macro_rules! text_enum {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $text,)+
                })
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($ty))),
                }
            }
        }
    };
}

text_enum!(TaskFilter { All => "all", Active => "active", Completed => "completed" });
text_enum!(TaskSort {
    CreatedAsc => "created_asc",
    CreatedDesc => "created_desc",
    DueAsc => "due_asc",
    DueDesc => "due_desc",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    #[serde(default)]
    pub filter: TaskFilter,
    #[serde(default)]
    pub sort: TaskSort,
}

/// Tasks the current user may see, filtered and sorted.
///
/// Empty without a logged-in user. Entries owned by anyone else are dropped
/// even if they made it into state.
pub fn visible_tasks(state: &AppState, options: &ViewOptions) -> Vec<Task> {
    let Some(username) = state.session.username() else {
        return Vec::new();
    };

    let mut tasks: Vec<Task> = state
        .tasks
        .items
        .iter()
        .filter(|t| t.owner == username && options.filter.matches(t))
        .cloned()
        .collect();

    // `sort_by` is stable.
    tasks.sort_by(|a, b| options.sort.compare(a, b));
    tasks
}

/// Drag-to-reorder overlay on top of the visible list.
///
/// The order is local only and starts over whenever the visible list changes.
#[derive(Debug, Clone, Default)]
pub struct LocalOrder {
    basis: Vec<TaskId>,
    order: Vec<TaskId>,
}

impl LocalOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the overlay if `visible` differs from the list it was built on.
    pub fn sync(&mut self, visible: &[Task]) {
        let ids: Vec<TaskId> = visible.iter().map(|t| t.id).collect();
        if ids != self.basis {
            self.order = ids.clone();
            self.basis = ids;
        }
    }

    /// Moves `active` to the position of `over`. Unknown ids are ignored.
    pub fn move_task(&mut self, active: TaskId, over: TaskId) -> bool {
        let from = self.order.iter().position(|id| *id == active);
        let to = self.order.iter().position(|id| *id == over);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        if from == to {
            return false;
        }

        let id = self.order.remove(from);
        self.order.insert(to, id);
        debug!("Moved task {} to position {} (not saved)", active, to);
        true
    }

    /// `visible` in overlay order. Syncs first.
    pub fn apply(&mut self, visible: &[Task]) -> Vec<Task> {
        self.sync(visible);
        self.order
            .iter()
            .filter_map(|id| visible.iter().find(|t| t.id == *id))
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> &[TaskId] {
        &self.order
    }
}
