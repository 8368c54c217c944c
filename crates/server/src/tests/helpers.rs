// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for the server tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Mutex;
use tower::ServiceExt;

use complaint_desk_api::{ClosureArtifactRenderer, LogNotifier, TextClosureRenderer};
use complaint_desk_domain::{
    Complaint, ComplaintId, Department, DepartmentId, Directory, Reporter, Role, User,
};
use complaint_desk_persistence::{ComplaintStore, SqliteSheet};

use crate::dispatch::NotificationDispatcher;
use crate::{AppState, ErrorResponse, SharedStore, build_router};

pub const MANAGER: &str = "u1";
pub const ASSIGNEE: &str = "u2";
pub const OTHER_EMPLOYEE: &str = "u3";
pub const PRINCIPAL: &str = "u7";
pub const ADMIN: &str = "u9";

pub const COMPLAINT_ID: &str = "17";

pub fn create_test_directory() -> Directory {
    Directory::new(
        vec![
            User::new(MANAGER, "Maya Manager", Role::Manager, Some("d1"))
                .with_email("maya@school.example"),
            User::new(ASSIGNEE, "Avi Assignee", Role::Employee, Some("d1"))
                .with_email("avi@school.example"),
            User::new(OTHER_EMPLOYEE, "Omer Other", Role::Employee, Some("d2")),
            User::new(PRINCIPAL, "Pnina Principal", Role::Principal, None)
                .with_email("principal@school.example"),
            User::new(ADMIN, "Adam Admin", Role::Admin, None),
        ],
        vec![
            Department::new("d1", "Science", Some(MANAGER)),
            Department::new("d2", "Sports", None),
        ],
    )
}

pub fn create_test_complaint(id: &str) -> Complaint {
    let mut complaint: Complaint = Complaint::new(
        ComplaintId::new(id),
        String::from("Transport"),
        String::from("Late bus"),
        String::from("The bus was late every day this week."),
        Reporter::ParentStudent {
            full_name: String::from("Dana Levi"),
            email: String::from("dana@example.org"),
            phone: String::from("050-0000000"),
            grade: String::from("7"),
            class_number: String::from("2"),
        },
        created_at(),
    );
    complaint.department_id = Some(DepartmentId::new("d1"));
    complaint
}

pub fn created_at() -> OffsetDateTime {
    datetime!(2026-03-01 08:00 UTC)
}

pub fn create_test_store() -> SharedStore {
    let sheet: SqliteSheet =
        SqliteSheet::new_in_memory().expect("Failed to create in-memory sheet");
    let mut store: ComplaintStore<SqliteSheet> = ComplaintStore::new(sheet);
    store
        .append(&create_test_complaint(COMPLAINT_ID))
        .expect("Failed to seed complaint");
    Arc::new(Mutex::new(store))
}

/// Builds app state over a seeded in-memory store.
///
/// Must be called inside a Tokio runtime; the notification worker is
/// spawned here.
pub fn create_test_app_state() -> AppState {
    let store: SharedStore = create_test_store();
    let renderer: Arc<dyn ClosureArtifactRenderer> = Arc::new(TextClosureRenderer);
    let (dispatcher, _worker) = NotificationDispatcher::spawn(
        Arc::clone(&store),
        Arc::new(LogNotifier),
        Arc::clone(&renderer),
    );

    AppState {
        store,
        directory: Arc::new(create_test_directory()),
        app_url: Some(Arc::from("https://desk.example")),
        dispatcher,
        renderer,
    }
}

pub fn create_test_app() -> Router {
    build_router(create_test_app_state())
}

/// Sends one request, with an optional bearer credential and JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("Authorization", format!("Bearer {user}"));
    }
    let body: Body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

/// Asserts an error status and returns the error body.
pub async fn expect_error(response: Response<Body>, status: StatusCode) -> ErrorResponse {
    assert_eq!(response.status(), status);
    read_json(response).await
}
