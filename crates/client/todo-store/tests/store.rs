//! Store flows against a mock task API.

use std::sync::Arc;

use futures::StreamExt;
use futures_signals::signal::SignalExt;
use serde_json::json;
use tempfile::TempDir;
use todo_core::{
    DurableStorage, FileStorage, MemoryStorage, NewTask, ProfileUpdate, Registration, Rejection,
    StorageKey, TaskId, TaskPatch,
};
use todo_gateway::ApiConfig;
use todo_store::{
    AppState, Navigation, Route, SessionState, Status, Store, TaskFilter, TaskSort, TasksState,
    Theme, ViewOptions, guard, visible_tasks,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alice_json() -> serde_json::Value {
    json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.com",
        "first_name": "",
        "last_name": ""
    })
}

fn task_json(id: i64, title: &str, completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "user": "alice",
        "title": title,
        "description": null,
        "completed": completed,
        "created_at": format!("2024-03-{:02}T10:00:00Z", id.clamp(1, 28)),
        "updated_at": null,
        "due_date": null
    })
}

async fn setup(storage: Arc<dyn DurableStorage>) -> (MockServer, Store) {
    let server = MockServer::start().await;
    let config = ApiConfig::new(&format!("{}/api/", server.uri())).unwrap();
    let store = Store::new(config, storage).unwrap();
    (server, store)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"username": "alice", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "access-1",
            "refresh": "refresh-1"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alice_json()))
        .mount(server)
        .await;
}

async fn logged_in(storage: Arc<dyn DurableStorage>) -> (MockServer, Store) {
    let (server, store) = setup(storage).await;
    mount_login(&server).await;
    store.login("alice", "secret").await.unwrap();
    (server, store)
}

#[tokio::test]
async fn test_valid_login() {
    let storage = Arc::new(MemoryStorage::new());
    let (server, store) = setup(storage.clone()).await;
    mount_login(&server).await;

    let user = store.login("alice", "secret").await.unwrap();
    assert_eq!(user.username, "alice");

    let session = store.snapshot().session;
    assert_eq!(session.status, Status::Succeeded);
    assert_eq!(session.token.unwrap().as_str(), "access-1");
    assert_eq!(session.error, None);

    assert_eq!(
        storage.get(StorageKey::Token).unwrap().as_deref(),
        Some("access-1")
    );
    let stored: serde_json::Value =
        serde_json::from_str(&storage.get(StorageKey::User).unwrap().unwrap()).unwrap();
    assert_eq!(stored["username"], "alice");
}

#[tokio::test]
async fn test_invalid_login() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(StorageKey::Token, "stale").unwrap();
    let (server, store) = setup(storage.clone()).await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let err = store.login("alice", "wrong").await.unwrap_err();
    assert_eq!(
        err,
        Rejection::message("No active account found with the given credentials")
    );

    let session = store.snapshot().session;
    assert_eq!(session.status, Status::Failed);
    assert_eq!(session.user, None);
    assert_eq!(session.token, None);
    assert_eq!(session.error, Some(err));
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_login_without_detail_uses_generic_message() {
    let (server, store) = setup(Arc::new(MemoryStorage::new())).await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = store.login("alice", "secret").await.unwrap_err();
    assert_eq!(err, Rejection::message("Login failed"));
}

#[tokio::test]
async fn test_add_buy_milk() {
    let (server, store) = logged_in(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(1, "a", false)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .and(body_json(json!({"title": "Buy milk", "description": null, "due_date": null})))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json(42, "Buy milk", false)))
        .expect(1)
        .mount(&server)
        .await;

    store.fetch_tasks().await.unwrap();
    let before = store.read(|s| s.tasks.items.len());

    let created = store
        .add_task(&NewTask::new("  Buy milk ").unwrap())
        .await
        .unwrap();
    assert_eq!(created.id, TaskId(42));

    let tasks = store.snapshot().tasks;
    assert_eq!(tasks.items.len(), before + 1);
    assert_eq!(tasks.items.last().unwrap().title, "Buy milk");
    assert_eq!(tasks.status, Status::Succeeded);
}

#[tokio::test]
async fn test_delete_absent_id_is_noop() {
    let (server, store) = logged_in(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json(1, "a", false),
            task_json(2, "b", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    store.fetch_tasks().await.unwrap();
    let before = store.snapshot().tasks.items;

    store.remove_task(TaskId(99)).await.unwrap();
    assert_eq!(store.snapshot().tasks.items, before);

    let updated = store
        .update_task(TaskId(99), &TaskPatch::new().completed(true))
        .await
        .unwrap();
    assert_eq!(updated, None);
    assert_eq!(store.snapshot().tasks.items, before);
    assert_eq!(store.snapshot().tasks.status, Status::Succeeded);
}

#[tokio::test]
async fn test_toggle_and_remove() {
    let (server, store) = logged_in(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json(1, "a", false),
            task_json(2, "b", false)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/1/"))
        .and(body_json(json!({"completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(1, "a", true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/2/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store.fetch_tasks().await.unwrap();

    let toggled = store.toggle_completed(TaskId(1)).await.unwrap().unwrap();
    assert!(toggled.completed);
    assert_eq!(store.toggle_completed(TaskId(7)).await.unwrap(), None);

    store.remove_task(TaskId(2)).await.unwrap();
    let ids: Vec<_> = store.read(|s| s.tasks.items.iter().map(|t| t.id).collect());
    assert_eq!(ids, vec![TaskId(1)]);

    let done = visible_tasks(
        &store.snapshot(),
        &ViewOptions {
            filter: TaskFilter::Completed,
            sort: TaskSort::CreatedAsc,
        },
    );
    assert_eq!(done.len(), 1);
}

#[tokio::test]
async fn test_failed_fetch_keeps_items() {
    let (server, store) = logged_in(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(1, "a", false)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    store.fetch_tasks().await.unwrap();
    let err = store.fetch_tasks().await.unwrap_err();
    assert_eq!(err, Rejection::message("Failed to fetch tasks"));

    let tasks = store.snapshot().tasks;
    assert_eq!(tasks.status, Status::Failed);
    assert_eq!(tasks.items.len(), 1);
    assert_eq!(tasks.error, Some(err));
}

#[tokio::test]
async fn test_fetch_if_idle_runs_once() {
    let (server, store) = setup(Arc::new(MemoryStorage::new())).await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(store.fetch_if_idle().await.is_none());

    mount_login(&server).await;
    store.login("alice", "secret").await.unwrap();
    assert!(store.fetch_if_idle().await.is_some());
    assert!(store.fetch_if_idle().await.is_none());
}

#[tokio::test]
async fn test_logout_resets_everything() {
    let storage = Arc::new(MemoryStorage::new());
    let (server, store) = logged_in(storage.clone()).await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(1, "a", false)])))
        .mount(&server)
        .await;
    store.fetch_tasks().await.unwrap();
    store.toggle_theme().unwrap();

    store.logout();

    let state = store.snapshot();
    assert_eq!(state.session, SessionState::default());
    assert_eq!(state.tasks, TasksState::default());
    assert_eq!(storage.get(StorageKey::Token).unwrap(), None);
    assert_eq!(storage.get(StorageKey::User).unwrap(), None);
    assert_eq!(store.theme(), Theme::Dark);

    assert_eq!(
        guard(&state.session, Route::Dashboard),
        Navigation::Redirect {
            to: Route::Login,
            from: Route::Dashboard
        }
    );
}

#[tokio::test]
async fn test_register_field_errors() {
    let (server, store) = setup(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "username": ["A user with that username already exists."],
            "password": "This password is too short."
        })))
        .mount(&server)
        .await;

    let err = store
        .register(&Registration {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "x".to_string(),
        })
        .await
        .unwrap_err();

    let fields = err.field_errors().unwrap();
    assert_eq!(
        fields.get("username").unwrap(),
        ["A user with that username already exists.".to_string()]
    );
    assert_eq!(fields.get("password").unwrap().len(), 1);

    let session = store.snapshot().session;
    assert_eq!(session.status, Status::Failed);
    assert!(!session.is_authenticated());

    store.reset_status();
    assert_eq!(store.snapshot().session.status, Status::Idle);
    assert_eq!(store.snapshot().session.error, None);
}

#[tokio::test]
async fn test_save_profile_updates_stored_user() {
    let storage = Arc::new(MemoryStorage::new());
    let (server, store) = logged_in(storage.clone()).await;

    Mock::given(method("PATCH"))
        .and(path("/api/users/me/update/"))
        .and(body_json(json!({"first_name": "Alice"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "first_name": "Alice",
            "last_name": ""
        })))
        .mount(&server)
        .await;

    let user = store
        .save_profile(&ProfileUpdate {
            first_name: Some("Alice".to_string()),
            last_name: None,
        })
        .await
        .unwrap();
    assert_eq!(user.first_name, "Alice");

    let stored: serde_json::Value =
        serde_json::from_str(&storage.get(StorageKey::User).unwrap().unwrap()).unwrap();
    assert_eq!(stored["first_name"], "Alice");
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let (server, store) = logged_in(Arc::new(FileStorage::new(dir.path()))).await;
    drop(store);

    let config = ApiConfig::new(&format!("{}/api/", server.uri())).unwrap();
    let store = Store::new(config, Arc::new(FileStorage::new(dir.path()))).unwrap();

    let session = store.snapshot().session;
    assert_eq!(session.username(), Some("alice"));
    assert_eq!(session.status, Status::Idle);
    assert_eq!(
        guard(&session, Route::Settings),
        Navigation::Render(Route::Settings)
    );
    assert_eq!(store.snapshot().tasks, TasksState::default());
}

#[tokio::test]
async fn test_signal_observes_dispatches() {
    let (_server, store) = setup(Arc::new(MemoryStorage::new())).await;
    let mut states = store.signal().to_stream();

    let first: AppState = states.next().await.unwrap();
    assert_eq!(first.session.status, Status::Idle);

    store.reset_status();
    store.dispatch(todo_store::TasksAction::Clear);
    let next = states.next().await.unwrap();
    assert_eq!(next, AppState::default());
}

#[tokio::test]
async fn test_switching_user_refetches_tasks() {
    let (server, store) = logged_in(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"username": "bob", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "access-2",
            "refresh": "refresh-2"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "username": "bob",
            "email": "bob@example.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(1, "a", false)])))
        .expect(1)
        .mount(&server)
        .await;
    let mut bobs = task_json(7, "Walk dog", false);
    bobs["user"] = json!("bob");
    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([bobs])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(store.fetch_if_idle().await.is_some());

    store.login("bob", "hunter2").await.unwrap();
    assert_eq!(store.snapshot().tasks, TasksState::default());

    assert!(store.fetch_if_idle().await.is_some());
    let visible = visible_tasks(&store.snapshot(), &ViewOptions::default());
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].owner, "bob");
}

#[tokio::test]
async fn test_failed_mutations_keep_items() {
    let (server, store) = logged_in(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(1, "a", false)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "title": ["This field may not be blank."]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/1/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    store.fetch_tasks().await.unwrap();
    let before = store.snapshot().tasks.items;

    let err = store
        .add_task(&NewTask::new("Buy milk").unwrap())
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().get("title").is_some());
    let tasks = store.snapshot().tasks;
    assert_eq!(tasks.items, before);
    assert_eq!(tasks.status, Status::Failed);
    assert_eq!(tasks.error, Some(err));

    let err = store
        .update_task(TaskId(1), &TaskPatch::new().completed(true))
        .await
        .unwrap_err();
    assert_eq!(err, Rejection::message("Failed to update task"));
    let tasks = store.snapshot().tasks;
    assert_eq!(tasks.items, before);
    assert!(!tasks.items[0].completed);
    assert_eq!(tasks.status, Status::Failed);
    assert_eq!(tasks.error, Some(err));
}

#[tokio::test]
async fn test_task_lookup_is_local() {
    let (server, store) = logged_in(Arc::new(MemoryStorage::new())).await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(3, "c", false)])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(store.task(TaskId(3)), None);
    store.fetch_tasks().await.unwrap();
    assert_eq!(store.task(TaskId(3)).unwrap().title, "c");
    assert_eq!(store.task(TaskId(4)), None);
    assert_eq!(store.toggle_completed(TaskId(4)).await.unwrap(), None);
}

#[tokio::test]
async fn test_login_field_errors_are_kept() {
    let (server, store) = setup(Arc::new(MemoryStorage::new())).await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "password": ["This field may not be blank."]
        })))
        .mount(&server)
        .await;

    let err = store.login("alice", "").await.unwrap_err();
    assert_eq!(
        err.field_errors().unwrap().get("password"),
        Some(&["This field may not be blank.".to_string()][..])
    );
    assert_eq!(store.snapshot().session.error, Some(err));
}
