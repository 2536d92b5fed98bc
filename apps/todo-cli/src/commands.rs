//! One handler per subcommand. Each returns `Ok(false)` when the request was
//! rejected and the reason has already been printed.

use anyhow::Result;
use chrono::NaiveDate;
use todo_core::{
    NewTask, PasswordChange, ProfileUpdate, Registration, Rejection, Task, TaskId, TaskPatch,
};
use todo_store::{LocalOrder, Navigation, Route, Store, ViewOptions, guard, visible_tasks};
use tracing::{debug, info};

use crate::ui::Ui;

/// Runs the navigation guard for `route`. A redirect to login is satisfied
/// in place when a terminal is attached.
pub async fn enter(store: &Store, ui: &Ui, route: Route) -> Result<bool> {
    let navigation = store.read(|s| guard(&s.session, route));
    match navigation {
        Navigation::Render(_) => Ok(true),
        Navigation::Redirect { to, from } => {
            debug!("{} requires a session, redirected to {}", from, to);
            if !ui.is_interactive() {
                ui.note("Not logged in. Run `todo login` first.")?;
                return Ok(false);
            }
            ui.note("You need to log in first.")?;
            if !login(store, ui, None, Some(from)).await? {
                return Ok(false);
            }
            Ok(Navigation::post_login_target(Some(from)) == from)
        }
    }
}

pub async fn register(
    store: &Store,
    ui: &Ui,
    username: Option<String>,
    email: Option<String>,
) -> Result<bool> {
    store.reset_status();

    let username = match username {
        Some(username) => username,
        None => ui.input("Username", None)?,
    };
    let email = match email {
        Some(email) => email,
        None => ui.input("Email", None)?,
    };
    let password = ui.new_password()?;

    let registration = Registration {
        username,
        email,
        password,
    };
    match store.register(&registration).await {
        Ok(user) => {
            ui.success(&format!("Account {} created", user.username))?;
            ui.note(&format!("Log in with: todo login -u {}", user.username))?;
            Ok(true)
        }
        Err(rejection) => {
            ui.rejection(&rejection)?;
            Ok(false)
        }
    }
}

/// `from` is the page that asked for the login, if any.
pub async fn login(
    store: &Store,
    ui: &Ui,
    username: Option<String>,
    from: Option<Route>,
) -> Result<bool> {
    let username = match username {
        Some(username) => username,
        None => ui.input("Username", None)?,
    };
    let password = ui.password("Password")?;

    match store.login(&username, &password).await {
        Ok(user) => {
            ui.success(&format!("Logged in as {}", user.display_name()))?;
            debug!("Continuing to {}", Navigation::post_login_target(from));
            Ok(true)
        }
        Err(rejection) => {
            ui.rejection(&rejection)?;
            Ok(false)
        }
    }
}

pub fn logout(store: &Store, ui: &Ui) -> Result<bool> {
    store.logout();
    ui.success("Logged out")?;
    Ok(true)
}

pub fn whoami(store: &Store, ui: &Ui) -> Result<bool> {
    match store.read(|s| s.session.user.clone()) {
        Some(user) => ui.user(&user)?,
        None => ui.note("No profile stored for this session.")?,
    }
    Ok(true)
}

pub async fn list(store: &Store, ui: &Ui, view: ViewOptions, arrange: bool) -> Result<bool> {
    let mut ok = true;
    if let Some(Err(rejection)) = store.fetch_if_idle().await {
        ui.rejection(&rejection)?;
        ok = false;
    }

    let state = store.snapshot();
    let mut tasks = visible_tasks(&state, &view);
    debug!("Showing {} tasks ({} / {})", tasks.len(), view.filter, view.sort);

    if arrange && tasks.len() > 1 && ui.is_interactive() {
        let mut order = LocalOrder::new();
        order.sync(&tasks);

        let titles: Vec<String> = tasks.iter().map(|t| t.title.clone()).collect();
        let picked = ui.arrange(&titles)?;
        for (position, index) in picked.into_iter().enumerate() {
            let over = order.ids()[position];
            order.move_task(tasks[index].id, over);
        }

        tasks = order.apply(&tasks);
        ui.note("This order is only shown here and is not saved.")?;
    }

    ui.tasks(&tasks, state.tasks.status)?;
    Ok(ok)
}

pub async fn add(
    store: &Store,
    ui: &Ui,
    title: Option<String>,
    description: Option<String>,
    due: Option<NaiveDate>,
) -> Result<bool> {
    let (title, description) = match title {
        Some(title) => (title, description),
        None => {
            let title = ui.input("Title", None)?;
            let description = match description {
                Some(description) => Some(description),
                None => Some(ui.optional_input("Description (optional)")?),
            };
            (title, description)
        }
    };
    let mut task = NewTask::new(&title)?.with_due_date(due);
    if let Some(description) = description {
        task = task.with_description(description);
    }

    match store.add_task(&task).await {
        Ok(created) => {
            ui.success(&format!("Added #{} {}", created.id, created.title))?;
            Ok(true)
        }
        Err(rejection) => {
            ui.rejection(&rejection)?;
            Ok(false)
        }
    }
}

/// `due` is `Some(None)` to clear the due date.
pub async fn edit(
    store: &Store,
    ui: &Ui,
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
    due: Option<Option<NaiveDate>>,
) -> Result<bool> {
    let mut patch = TaskPatch::new();
    if let Some(title) = title {
        patch = patch.title(title)?;
    }
    if let Some(description) = description {
        patch = patch.description(description);
    }
    if let Some(due) = due {
        patch = patch.due_date(due);
    }

    if patch.is_empty() {
        ui.note("Nothing to change.")?;
        return Ok(true);
    }
    if let Some(Err(rejection)) = store.fetch_if_idle().await {
        ui.rejection(&rejection)?;
        return Ok(false);
    }
    if store.task(id).is_none() {
        ui.note(&format!("No task #{id}"))?;
        return Ok(true);
    }

    report_update(ui, id, store.update_task(id, &patch).await)
}

pub async fn toggle(store: &Store, ui: &Ui, id: TaskId) -> Result<bool> {
    if let Some(Err(rejection)) = store.fetch_if_idle().await {
        ui.rejection(&rejection)?;
        return Ok(false);
    }
    report_update(ui, id, store.toggle_completed(id).await)
}

fn report_update(
    ui: &Ui,
    id: TaskId,
    result: Result<Option<Task>, Rejection>,
) -> Result<bool> {
    match result {
        Ok(Some(task)) => {
            let state = if task.completed { "done" } else { "open" };
            ui.success(&format!("#{} {} ({})", task.id, task.title, state))?;
            Ok(true)
        }
        Ok(None) => {
            ui.note(&format!("No task #{id}"))?;
            Ok(true)
        }
        Err(rejection) => {
            ui.rejection(&rejection)?;
            Ok(false)
        }
    }
}

pub async fn remove(store: &Store, ui: &Ui, id: TaskId, yes: bool) -> Result<bool> {
    if !yes && ui.is_interactive() && !ui.confirm(&format!("Delete task #{id}?"))? {
        return Ok(true);
    }

    match store.remove_task(id).await {
        Ok(()) => {
            ui.success(&format!("Deleted #{id}"))?;
            Ok(true)
        }
        Err(rejection) => {
            ui.rejection(&rejection)?;
            Ok(false)
        }
    }
}

pub async fn profile(
    store: &Store,
    ui: &Ui,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<bool> {
    let mut update = ProfileUpdate {
        first_name,
        last_name,
    };

    if update.is_empty() {
        let current = store.read(|s| s.session.user.clone());
        let (first, last) = current
            .map(|u| (u.first_name, u.last_name))
            .unwrap_or_default();
        update.first_name = Some(ui.input("First name", Some(first.as_str()))?);
        update.last_name = Some(ui.input("Last name", Some(last.as_str()))?);
    }

    match store.save_profile(&update).await {
        Ok(user) => {
            ui.success("Profile updated")?;
            ui.user(&user)?;
            Ok(true)
        }
        Err(rejection) => {
            ui.rejection(&rejection)?;
            Ok(false)
        }
    }
}

pub async fn password(store: &Store, ui: &Ui) -> Result<bool> {
    let old_password = ui.password("Current password")?;
    let new_password = ui.new_password()?;

    let change = PasswordChange {
        old_password,
        new_password,
    };
    match store.change_password(&change).await {
        Ok(()) => {
            info!("Password changed");
            ui.success("Password changed")?;
            Ok(true)
        }
        Err(rejection) => {
            ui.rejection(&rejection)?;
            Ok(false)
        }
    }
}

pub fn theme(store: &Store) -> Result<bool> {
    let theme = store.toggle_theme()?;
    Ui::new(theme).success(&format!("Theme set to {theme}"))?;
    Ok(true)
}
