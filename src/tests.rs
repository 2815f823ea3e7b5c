//! Integration tests for the facdir client.
//!
//! The remote directory store is mocked with an in-process axum server on a
//! random port; the cache lives in a temp directory. Failure modes are
//! toggled on the mock's shared state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::cache::{init_cache, CacheStore};
use crate::errors::{AppError, NoticeLevel};
use crate::models::{Connectivity, Credentials, ProfessorForm, RegisterRequest, Role};
use crate::remote::RemoteClient;
use crate::seed;
use crate::session::Session;
use crate::view::ActiveView;

/// Mutable state behind the mock remote store.
#[derive(Debug)]
struct MockState {
    /// Body served by GET /directory.
    directory: Value,
    /// When true, every endpoint answers 500 with an error envelope.
    fail: bool,
    /// Error message placed in the `{"error"}` envelope when failing.
    fail_message: Option<String>,
    next_id: u32,
    create_calls: u32,
}

impl MockState {
    fn new(directory: Value) -> Self {
        Self {
            directory,
            fail: false,
            fail_message: None,
            next_id: 1,
            create_calls: 0,
        }
    }
}

type Shared = Arc<Mutex<MockState>>;

fn failure(state: &MockState) -> Response {
    let body = match &state.fail_message {
        Some(msg) => json!({ "error": msg }),
        None => json!({}),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn mock_get_directory(State(shared): State<Shared>) -> Response {
    let state = shared.lock().unwrap();
    if state.fail {
        return failure(&state);
    }
    Json(state.directory.clone()).into_response()
}

async fn mock_create_professor(
    State(shared): State<Shared>,
    Json(mut payload): Json<Value>,
) -> Response {
    let mut state = shared.lock().unwrap();
    state.create_calls += 1;
    if state.fail {
        return failure(&state);
    }
    let id = format!("srv-{}", state.next_id);
    state.next_id += 1;
    payload["id"] = json!(id);
    state.directory["professors"][&id] = payload.clone();
    Json(payload).into_response()
}

async fn mock_update_professor(
    State(shared): State<Shared>,
    Path(id): Path<String>,
    Json(mut payload): Json<Value>,
) -> Response {
    let mut state = shared.lock().unwrap();
    if state.fail {
        return failure(&state);
    }
    payload["id"] = json!(id);
    state.directory["professors"][&id] = payload.clone();
    Json(payload).into_response()
}

async fn mock_delete_professor(State(shared): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = shared.lock().unwrap();
    if state.fail {
        return failure(&state);
    }
    if let Some(professors) = state.directory["professors"].as_object_mut() {
        professors.remove(&id);
    }
    Json(json!({})).into_response()
}

async fn mock_delete_department(State(shared): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = shared.lock().unwrap();
    if state.fail {
        return failure(&state);
    }
    if let Some(departments) = state.directory["departments"].as_object_mut() {
        departments.remove(&id);
    }
    Json(json!({})).into_response()
}

async fn mock_login(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = shared.lock().unwrap();
    if state.fail {
        return failure(&state);
    }
    if body["password"] == json!("secret") {
        Json(json!({
            "id": "user-1",
            "email": body["email"],
            "name": "Admin",
            "role": "admin"
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid credentials" })))
            .into_response()
    }
}

async fn mock_logout() -> Response {
    Json(json!({})).into_response()
}

async fn mock_register(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = shared.lock().unwrap();
    if state.fail {
        return failure(&state);
    }
    Json(json!({
        "id": "user-2",
        "email": body["email"],
        "name": body["name"],
        "role": "guest"
    }))
    .into_response()
}

async fn mock_current_user(State(shared): State<Shared>) -> Response {
    let state = shared.lock().unwrap();
    if state.fail {
        return failure(&state);
    }
    Json(json!({
        "id": "user-1",
        "email": "admin@university.edu",
        "name": "Admin",
        "role": "admin"
    }))
    .into_response()
}

/// Test fixture: mock remote store plus a temp-dir cache.
struct TestFixture {
    remote: RemoteClient,
    cache: CacheStore,
    state: Shared,
    _temp_dir: TempDir,
}

impl TestFixture {
    /// A remote directory with one department/branch/professor of its own,
    /// none of which collide with the seed.
    fn remote_directory() -> Value {
        json!({
            "departments": {
                "d-remote": {
                    "id": "d-remote",
                    "name": "Mechanical Engineering",
                    "branches": ["b-remote"]
                }
            },
            "branches": {
                "b-remote": {
                    "id": "b-remote",
                    "name": "Thermal Systems",
                    "departmentId": "d-remote"
                }
            },
            "professors": {
                "p-remote": {
                    "id": "p-remote",
                    "name": "Dr. Remote Only",
                    "branchId": "b-remote",
                    "departmentId": "d-remote",
                    "research": ["Heat transfer"]
                }
            },
            "news": []
        })
    }

    async fn new() -> Self {
        Self::with_directory(Self::remote_directory()).await
    }

    async fn with_directory(directory: Value) -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::new(directory)));

        let app = Router::new()
            .route("/api/directory", get(mock_get_directory))
            .route("/api/professors", post(mock_create_professor))
            .route("/api/professors/{id}", put(mock_update_professor))
            .route("/api/professors/{id}", delete(mock_delete_professor))
            .route("/api/departments/{id}", delete(mock_delete_department))
            .route("/api/auth/login", post(mock_login))
            .route("/api/auth/logout", post(mock_logout))
            .route("/api/auth/register", post(mock_register))
            .route("/api/auth/me", get(mock_current_user))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_cache(&temp_dir.path().join("cache.sqlite"))
            .await
            .expect("Failed to init cache");

        let remote = RemoteClient::new(
            format!("http://{}/api", addr),
            None,
            1,
            Duration::from_millis(10),
        )
        .unwrap();

        TestFixture {
            remote,
            cache: CacheStore::new(pool),
            state,
            _temp_dir: temp_dir,
        }
    }

    /// A client pointed at a port nothing listens on.
    async fn unreachable_remote() -> RemoteClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        RemoteClient::new(
            format!("http://{}/api", addr),
            None,
            2,
            Duration::from_millis(5),
        )
        .unwrap()
    }

    fn set_fail(&self, fail: bool, message: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.fail = fail;
        state.fail_message = message.map(|s| s.to_string());
    }

    fn create_calls(&self) -> u32 {
        self.state.lock().unwrap().create_calls
    }

    async fn open_session(&self) -> Session {
        Session::open(self.remote.clone(), self.cache.clone()).await
    }
}

fn form(department_id: &str, branch: &str, name: &str) -> ProfessorForm {
    ProfessorForm {
        name: name.to_string(),
        email: format!("{}@university.edu", name.to_lowercase().replace(' ', ".")),
        position: "Assistant Professor".to_string(),
        branch: branch.to_string(),
        department_id: department_id.to_string(),
        research: vec!["Operating systems".to_string()],
        ..Default::default()
    }
}

// ==================== RECONCILER ====================

#[tokio::test]
async fn test_load_adopts_remote_and_merges_seed() {
    let fixture = TestFixture::new().await;
    let session = fixture.open_session().await;

    assert_eq!(session.connectivity(), Connectivity::Connected);

    let data = session.data();
    // Remote base adopted
    assert!(data.departments.contains_key("d-remote"));
    assert!(data.professors.contains_key("p-remote"));
    // Seed-only identifiers merged in with exact field values
    let seed_prof = &seed::dataset().professors["prof-seed-1"];
    assert_eq!(&data.professors["prof-seed-1"], seed_prof);
    assert!(data.departments.contains_key("dept-cse"));
}

#[tokio::test]
async fn test_load_base_wins_over_seed() {
    let mut directory = TestFixture::remote_directory();
    directory["departments"]["dept-cse"] = json!({
        "id": "dept-cse",
        "name": "CSE (renamed on server)",
        "branches": []
    });
    let fixture = TestFixture::with_directory(directory).await;
    let session = fixture.open_session().await;

    assert_eq!(
        session.data().departments["dept-cse"].name,
        "CSE (renamed on server)"
    );
}

#[tokio::test]
async fn test_load_falls_back_to_seed_when_remote_down() {
    let fixture = TestFixture::new().await;
    let remote = TestFixture::unreachable_remote().await;
    let session = Session::open(remote, fixture.cache.clone()).await;

    assert_eq!(session.connectivity(), Connectivity::Offline);
    // Never empty given a non-empty seed
    assert!(!session.data().professors.is_empty());
    assert_eq!(
        &session.data().professors["prof-seed-1"],
        &seed::dataset().professors["prof-seed-1"]
    );
}

#[tokio::test]
async fn test_load_falls_back_to_cache_when_remote_down() {
    let fixture = TestFixture::new().await;

    // Populate the cache through a connected session
    let connected = fixture.open_session().await;
    fixture.cache.save(connected.data()).await;

    let remote = TestFixture::unreachable_remote().await;
    let session = Session::open(remote, fixture.cache.clone()).await;

    assert_eq!(session.connectivity(), Connectivity::Offline);
    // Cached base (remote-only entries) survives, seed still merged
    assert!(session.data().departments.contains_key("d-remote"));
    assert!(session.data().departments.contains_key("dept-cse"));
}

#[tokio::test]
async fn test_load_treats_malformed_payload_as_failure() {
    // Structurally invalid: no departments field
    let fixture = TestFixture::with_directory(json!({ "banner": "hello" })).await;
    let session = fixture.open_session().await;

    assert_eq!(session.connectivity(), Connectivity::Offline);
    assert!(!session.data().professors.is_empty());
}

#[tokio::test]
async fn test_reconciled_load_is_idempotent_across_cache_round_trip() {
    let fixture = TestFixture::new().await;
    let remote_down_1 = TestFixture::unreachable_remote().await;
    let first = Session::open(remote_down_1, fixture.cache.clone()).await;
    fixture.cache.save(first.data()).await;

    // Second load re-merges the seed over the cached (already merged) base
    let remote_down_2 = TestFixture::unreachable_remote().await;
    let second = Session::open(remote_down_2, fixture.cache.clone()).await;

    assert_eq!(first.data(), second.data());
}

// ==================== MUTATION PATH ====================

#[tokio::test]
async fn test_add_professor_keys_by_server_id_and_persists() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    let id = session
        .add_professor(&form("d-remote", "Thermal Systems", "New Hire"))
        .await
        .expect("add should succeed");

    assert!(id.starts_with("srv-"));
    assert_eq!(session.data().professors[&id].name, "New Hire");

    // Persisted to the cache
    let cached = fixture.cache.load().await.expect("cache written");
    assert!(cached.professors.contains_key(&id));
}

#[tokio::test]
async fn test_add_professor_failure_leaves_state_unchanged() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;
    let before = session.data().clone();

    fixture.set_fail(true, Some("database unavailable"));
    let result = session
        .add_professor(&form("d-remote", "Thermal Systems", "Ghost Hire"))
        .await;

    assert!(result.is_err());
    // No local insertion, no branch registration
    assert_eq!(session.data(), &before);

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("database unavailable"));
}

#[tokio::test]
async fn test_add_professor_rejects_unknown_department_before_network() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    let result = session
        .add_professor(&form("d-nope", "Somewhere", "Lost Hire"))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(fixture.create_calls(), 0);
    assert!(!session.take_notices().is_empty());
}

#[tokio::test]
async fn test_edit_professor_success_replaces_by_id() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    let mut edited = form("d-remote", "Thermal Systems", "Dr. Remote Only");
    edited.position = "Professor".to_string();
    let id = session
        .edit_professor("p-remote", &edited)
        .await
        .expect("edit should succeed");

    assert_eq!(id, "p-remote");
    assert_eq!(session.data().professors["p-remote"].position, "Professor");
    assert_eq!(session.connectivity(), Connectivity::Connected);
}

#[tokio::test]
async fn test_edit_professor_falls_back_locally_when_remote_fails() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    fixture.set_fail(true, None);
    let mut edited = form("d-remote", "Thermal Systems", "Dr. Remote Only");
    edited.description = "Edited while offline".to_string();

    let id = session
        .edit_professor("p-remote", &edited)
        .await
        .expect("offline edit should still apply locally");

    assert_eq!(id, "p-remote");
    assert_eq!(session.connectivity(), Connectivity::Offline);
    assert_eq!(
        session.data().professors["p-remote"].description,
        "Edited while offline"
    );

    // The offline write reached the cache
    let cached = fixture.cache.load().await.expect("cache written");
    assert_eq!(
        cached.professors["p-remote"].description,
        "Edited while offline"
    );

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_edit_professor_synthesizes_id_when_missing() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    fixture.set_fail(true, None);
    let id = session
        .edit_professor("", &form("d-remote", "Thermal Systems", "Unsaved Draft"))
        .await
        .expect("offline edit should still apply locally");

    assert!(!id.is_empty());
    assert!(session.data().professors.contains_key(&id));
}

#[tokio::test]
async fn test_branch_resolution_reuses_existing_branch_case_insensitive() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;
    let branches_before = session.data().branches.len();

    let id = session
        .edit_professor("p-remote", &form("d-remote", "thermal systems", "Dr. Remote Only"))
        .await
        .unwrap();

    // Existing identifier reused, nothing new registered
    assert_eq!(session.data().professors[&id].branch_id, "b-remote");
    assert_eq!(session.data().branches.len(), branches_before);
}

#[tokio::test]
async fn test_branch_resolution_creates_exactly_one_new_branch() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;
    let branches_before = session.data().departments["d-remote"].branches.clone();

    let id = session
        .edit_professor("p-remote", &form("d-remote", "Fluid Dynamics", "Dr. Remote Only"))
        .await
        .unwrap();

    let department = &session.data().departments["d-remote"];
    assert_eq!(department.branches.len(), branches_before.len() + 1);

    let new_branch_id = department.branches.last().unwrap();
    let new_branch = &session.data().branches[new_branch_id];
    assert_eq!(new_branch.name, "Fluid Dynamics");
    assert_eq!(new_branch.department_id, "d-remote");
    assert_eq!(&session.data().professors[&id].branch_id, new_branch_id);
}

#[tokio::test]
async fn test_remove_professor_success_and_failure() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    session
        .remove_professor("p-remote")
        .await
        .expect("remove should succeed");
    assert!(!session.data().professors.contains_key("p-remote"));

    // Failure leaves state unchanged; no offline fallback
    fixture.set_fail(true, None);
    let before = session.data().clone();
    let result = session.remove_professor("prof-seed-1").await;
    assert!(result.is_err());
    assert_eq!(session.data(), &before);
    assert!(!session.take_notices().is_empty());
}

#[tokio::test]
async fn test_remove_department_refetches_aggregate() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;
    assert!(session.data().departments.contains_key("d-remote"));

    session
        .remove_department("d-remote")
        .await
        .expect("remove should succeed");

    // Gone via refetch, not local deletion; seed entries still present
    assert!(!session.data().departments.contains_key("d-remote"));
    assert!(session.data().departments.contains_key("dept-cse"));
    assert_eq!(session.connectivity(), Connectivity::Connected);
}

#[tokio::test]
async fn test_remove_department_failure_leaves_state_unchanged() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    fixture.set_fail(true, None);
    let before = session.data().clone();
    let result = session.remove_department("d-remote").await;

    assert!(result.is_err());
    assert_eq!(session.data(), &before);
}

// ==================== AUTH ====================

#[tokio::test]
async fn test_login_logout_lifecycle() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;
    assert!(session.user().is_none());

    session
        .login(&Credentials {
            email: "admin@university.edu".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("login should succeed");

    let user = session.user().expect("user should be set");
    assert_eq!(user.email, "admin@university.edu");

    session.logout().await;
    assert!(session.user().is_none());
}

#[tokio::test]
async fn test_login_rejected_surfaces_remote_message() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    let result = session
        .login(&Credentials {
            email: "admin@university.edu".to_string(),
            password: "wrong".to_string(),
        })
        .await;

    match result {
        Err(AppError::Remote { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message.as_deref(), Some("invalid credentials"));
        }
        other => panic!("expected remote rejection, got {:?}", other.map(|_| ())),
    }
    assert!(session.user().is_none());
}

#[tokio::test]
async fn test_register_returns_account() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    let account = session
        .register(&RegisterRequest {
            name: "New Admin".to_string(),
            email: "new@university.edu".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("register should succeed");

    assert_eq!(account.email, "new@university.edu");
    assert_eq!(account.role, Role::Guest);
    // Registration alone does not authenticate
    assert!(session.user().is_none());
}

#[tokio::test]
async fn test_refresh_user_adopts_current_account() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;

    session
        .refresh_user()
        .await
        .expect("current-user lookup should succeed");

    assert_eq!(session.user().unwrap().role, Role::Admin);
}

// ==================== VIEWS ====================

#[tokio::test]
async fn test_navigation_updates_current_view() {
    let fixture = TestFixture::new().await;
    let mut session = fixture.open_session().await;
    assert_eq!(session.current_view(), &ActiveView::Home);

    session.navigate(ActiveView::DepartmentDetail {
        department_id: "d-remote".to_string(),
    });

    assert_eq!(session.current_view().route(), "/departments/d-remote");
}

// ==================== REMOTE CLIENT ====================

#[tokio::test]
async fn test_transport_errors_exhaust_retries_then_fail() {
    let remote = TestFixture::unreachable_remote().await;
    let result = remote.fetch_directory().await;
    assert!(matches!(result, Err(AppError::Connectivity(_))));
}
