//! Client-side state for the to-do client.
//!
//! All state lives in one [`AppState`] made of two slices, session and tasks.
//! Every change is an [`Action`] fed through the pure [`reduce`] function;
//! [`Store`] owns the container, runs the asynchronous intents against the
//! gateway and dispatches the resulting actions.
//!
//! Logout is an action of the session slice that the tasks slice also
//! handles, so no task list outlives the session it was fetched for.

pub mod action;
pub mod guard;
pub mod session;
pub mod state;
pub mod status;
pub mod store;
pub mod tasks;
pub mod theme;
pub mod view;

pub use action::{Action, LoginSuccess, SessionAction, TasksAction};
pub use guard::{Navigation, Route, guard};
pub use session::SessionState;
pub use state::{AppState, reduce};
pub use status::{Phase, Status};
pub use store::Store;
pub use tasks::TasksState;
pub use theme::Theme;
pub use view::{LocalOrder, TaskFilter, TaskSort, ViewOptions, visible_tasks};
