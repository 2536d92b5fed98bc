//! Core types shared by the to-do client crates.
//!
//! This crate has no network code. It defines the wire model of the remote
//! task API, the [`Rejection`] value every client operation fails with, and
//! the [`DurableStorage`] abstraction used to keep a session across runs.

pub mod rejection;
pub mod storage;
pub mod task;
pub mod user;

pub use rejection::{FieldErrors, Rejection};
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError, StorageKey};
pub use task::{NewTask, Task, TaskId, TaskPatch, TaskUpdate, TaskValidationError};
pub use user::{
    AccessToken, Credentials, PasswordChange, ProfileUpdate, Registration, TokenPair, User,
};
