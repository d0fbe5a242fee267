// SPDX-License-Identifier: MPL-2.0
//! HTTP timemark backend against a mock server.

use lecture_player::application::port::TimemarkBackend;
use lecture_player::domain::timemark::{AnnotationKey, NewTimemark, TimemarkId, TimemarkUpdate};
use lecture_player::error::{AnnotationError, AnnotationOperation};
use lecture_player::infrastructure::HttpTimemarkBackend;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COLLECTION: &str = "/api/courses/cs101/videos/week3/timemarks";

fn timemark_json(id: &str, timestamp: f64, content: &str) -> Value {
    json!({
        "id": id,
        "courseId": "cs101",
        "videoId": "week3",
        "userId": "user-7",
        "timestamp": timestamp,
        "content": content,
        "createdAt": "2026-03-02T10:15:00Z",
        "updatedAt": "2026-03-02T10:15:00Z"
    })
}

fn key() -> AnnotationKey {
    AnnotationKey::new("cs101", "week3")
}

fn backend(server: &MockServer) -> HttpTimemarkBackend {
    HttpTimemarkBackend::new(&format!("{}/api/", server.uri()), Duration::from_secs(5))
        .expect("backend")
}

#[tokio::test]
async fn list_decodes_camel_case_entities() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COLLECTION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            timemark_json("tm-2", 300.0, "Proof sketch"),
            timemark_json("tm-1", 95.4, "Key formula"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let timemarks = backend(&server).list(&key()).await.expect("list");

    assert_eq!(timemarks.len(), 2);
    assert_eq!(timemarks[1].id, TimemarkId::new("tm-1"));
    assert_eq!(timemarks[1].content, "Key formula");
    assert!(timemarks[1].is_saved);
    assert!(!timemarks[1].is_edited);
}

#[tokio::test]
async fn create_posts_new_timemark() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COLLECTION))
        .and(body_json(json!({
            "courseId": "cs101",
            "videoId": "week3",
            "timestamp": 95.4,
            "content": "Key formula"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(timemark_json("tm-9", 95.4, "Key formula")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = NewTimemark {
        course_id: key().course_id,
        video_id: key().video_id,
        timestamp: 95.4,
        content: "Key formula".to_string(),
    };
    let created = backend(&server).create(&request).await.expect("create");

    assert_eq!(created.id, TimemarkId::new("tm-9"));
    assert_eq!(created.timestamp, 95.4);
}

#[tokio::test]
async fn update_puts_to_entity_url() {
    let server = MockServer::start().await;
    let mut edited = timemark_json("tm-1", 96.0, "Key formula (revised)");
    edited["isEdited"] = json!(true);
    Mock::given(method("PUT"))
        .and(path(format!("{COLLECTION}/tm-1")))
        .and(body_json(json!({"timestamp": 96.0, "content": "Key formula (revised)"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(edited))
        .expect(1)
        .mount(&server)
        .await;

    let update = TimemarkUpdate {
        timestamp: 96.0,
        content: "Key formula (revised)".to_string(),
    };
    let updated = backend(&server)
        .update(&key(), &TimemarkId::new("tm-1"), &update)
        .await
        .expect("update");

    assert!(updated.is_edited);
    assert_eq!(updated.content, "Key formula (revised)");
}

#[tokio::test]
async fn delete_of_missing_entity_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{COLLECTION}/tm-404")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend(&server)
        .delete(&key(), &TimemarkId::new("tm-404"))
        .await
        .expect_err("missing entity");

    assert!(matches!(err, AnnotationError::NotFound(id) if id.as_str() == "tm-404"));
}

#[tokio::test]
async fn server_error_maps_to_backend_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(COLLECTION))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .list(&key())
        .await
        .expect_err("unavailable");

    match err {
        AnnotationError::Backend { operation, message } => {
            assert_eq!(operation, AnnotationOperation::List);
            assert_eq!(message, "HTTP 503: maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        AnnotationError::backend(AnnotationOperation::List, "x").i18n_key(),
        "notification-timemark-load-error"
    );
}

#[tokio::test]
async fn unreachable_server_is_backend_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let backend = HttpTimemarkBackend::new(
        &format!("http://127.0.0.1:{port}/api/"),
        Duration::from_secs(2),
    )
    .expect("backend");

    let err = backend.list(&key()).await.expect_err("connection refused");
    assert!(matches!(
        err,
        AnnotationError::Backend {
            operation: AnnotationOperation::List,
            ..
        }
    ));
}
