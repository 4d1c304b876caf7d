//! End-to-end tests for the HTTP surface.
//!
//! Drives the full router with `tower::ServiceExt::oneshot` against a real
//! SQLite database and a scripted identity lookup.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use verity_api::{router, AppState};
use verity_core::{IdentityLookup, LookupError, ProfileService, VerificationGate};
use verity_domain::{Identity, ResilienceConfig};
use verity_infra::{DbManager, SqliteProfileStore};

/// What the scripted lookup should currently answer.
#[derive(Clone)]
enum RemoteUser {
    Found(Identity),
    NotFound,
    Transport(String),
}

struct ScriptedLookup {
    response: Mutex<RemoteUser>,
}

impl ScriptedLookup {
    fn answering(response: RemoteUser) -> Arc<Self> {
        Arc::new(Self { response: Mutex::new(response) })
    }

    fn set_response(&self, response: RemoteUser) {
        *self.response.lock().expect("stub lock") = response;
    }
}

#[async_trait]
impl IdentityLookup for ScriptedLookup {
    async fn find_user(&self, user_id: i64) -> Result<Identity, LookupError> {
        match self.response.lock().expect("stub lock").clone() {
            RemoteUser::Found(identity) => Ok(Identity { id: user_id, ..identity }),
            RemoteUser::NotFound => Err(LookupError::NotFound),
            RemoteUser::Transport(cause) => Err(LookupError::Transport { cause }),
        }
    }
}

fn ann() -> RemoteUser {
    RemoteUser::Found(Identity { id: 42, name: "Ann".into(), email: "a@x.com".into() })
}

fn test_app(remote: RemoteUser) -> (Router, Arc<ScriptedLookup>, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db = Arc::new(
        DbManager::new(temp_dir.path().join("test.db"), 2).expect("db manager"),
    );
    db.run_migrations().expect("migrations");

    let resilience = ResilienceConfig {
        retry_max_attempts: 2,
        retry_initial_backoff_ms: 1,
        retry_max_backoff_ms: 1,
        ..ResilienceConfig::default()
    };

    let lookup = ScriptedLookup::answering(remote);
    let store = Arc::new(SqliteProfileStore::new(Arc::clone(&db)));
    let gate = VerificationGate::new(lookup.clone(), &resilience).expect("gate");
    let service = Arc::new(ProfileService::new(store, gate));

    (router(AppState::new(service, db)), lookup, temp_dir)
}

fn post_profiles(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/profiles")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn create_profile_returns_201_with_persisted_row() {
    let (app, _lookup, _tmp) = test_app(ann());

    let response = app
        .oneshot(post_profiles(json!({
            "userId": 42,
            "bio": "Rustacean",
            "location": "Oslo",
            "age": 34
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["userId"], 42);
    assert_eq!(body["bio"], "Rustacean");
    assert!(body["id"].as_i64().expect("id") > 0);
    assert!(body.get("createdAt").is_some());
}

#[tokio::test]
async fn create_profile_with_missing_user_id_returns_400_envelope() {
    let (app, _lookup, _tmp) = test_app(ann());

    let response =
        app.oneshot(post_profiles(json!({ "bio": "no user" }))).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["path"], "/profiles");
    assert_eq!(body["validationErrors"][0], "userId is required");
    assert!(body.get("timestamp").is_some());
}

#[tokio::test]
async fn create_profile_with_oversized_bio_returns_400() {
    let (app, _lookup, _tmp) = test_app(ann());

    let response = app
        .oneshot(post_profiles(json!({ "userId": 42, "bio": "x".repeat(501) })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["validationErrors"][0].as_str().expect("msg").contains("bio"));
}

#[tokio::test]
async fn create_profile_with_malformed_json_returns_400() {
    let (app, _lookup, _tmp) = test_app(ann());

    let request = Request::builder()
        .method("POST")
        .uri("/profiles")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_profile_for_unknown_user_returns_404() {
    let (app, _lookup, _tmp) = test_app(RemoteUser::NotFound);

    let response =
        app.oneshot(post_profiles(json!({ "userId": 42 }))).await.expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], 404);
    assert!(body["message"].as_str().expect("msg").contains("User with id 42"));
}

#[tokio::test]
async fn create_profile_during_outage_returns_503() {
    let (app, _lookup, _tmp) = test_app(RemoteUser::Transport("connection refused".into()));

    let response =
        app.oneshot(post_profiles(json!({ "userId": 42 }))).await.expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], 503);
    assert!(body["message"].as_str().expect("msg").contains("not available"));
}

#[tokio::test]
async fn get_profile_returns_enriched_payload() {
    let (app, _lookup, _tmp) = test_app(ann());

    let created = app
        .clone()
        .oneshot(post_profiles(json!({ "userId": 42, "bio": "hello" })))
        .await
        .expect("response");
    let created = body_json(created).await;
    let id = created["id"].as_i64().expect("id");

    let response = app.oneshot(get(&format!("/profiles/{id}"))).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["profileId"], id);
    assert_eq!(body["userId"], 42);
    assert_eq!(body["bio"], "hello");
    assert_eq!(body["user"]["name"], "Ann");
    assert_eq!(body["user"]["email"], "a@x.com");
}

#[tokio::test]
async fn get_profile_fails_with_404_when_user_disappeared() {
    let (app, lookup, _tmp) = test_app(ann());

    let created = app
        .clone()
        .oneshot(post_profiles(json!({ "userId": 42 })))
        .await
        .expect("response");
    let id = body_json(created).await["id"].as_i64().expect("id");

    lookup.set_response(RemoteUser::NotFound);

    let response = app.oneshot(get(&format!("/profiles/{id}"))).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_missing_profile_returns_404_envelope() {
    let (app, _lookup, _tmp) = test_app(ann());

    let response = app.oneshot(get("/profiles/999")).await.expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["path"], "/profiles/999");
    assert!(body["message"].as_str().expect("msg").contains("Profile with id 999"));
}

#[tokio::test]
async fn health_reports_ok_with_reachable_database() {
    let (app, _lookup, _tmp) = test_app(ann());

    let response = app.oneshot(get("/health")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["database"], true);
}
