#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use crunch_core::job::STATUS_TTL_SECS;
use crunch_events::{EventBus, JobQueue, JobReceiver};
use crunch_store::{MemoryStatusStore, SharedStatusStore};
use crunch_worker::{TaskExecutor, WorkerConfig, WorkerPool};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crunch_api::config::ServerConfig;
use crunch_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        redis_url: None,
    }
}

/// Test application without workers. The receiver lets tests inspect what
/// was dispatched.
pub struct TestApp {
    pub router: Router,
    pub store: SharedStatusStore,
    pub receiver: JobReceiver,
}

pub fn build_test_app() -> TestApp {
    build_test_app_with_capacity(64)
}

/// Like [`build_test_app`], with a queue holding at most `capacity` jobs.
pub fn build_test_app_with_capacity(capacity: usize) -> TestApp {
    let store: SharedStatusStore = Arc::new(MemoryStatusStore::new());
    let (queue, receiver) = JobQueue::channel(capacity);
    let router = crunch_api::app::build_router(test_state(Arc::clone(&store), queue));
    TestApp {
        router,
        store,
        receiver,
    }
}

/// Test application with a running worker pool and no per-item delay.
pub struct LiveApp {
    pub router: Router,
    pub store: SharedStatusStore,
    pub pool: WorkerPool,
}

pub fn build_live_app() -> LiveApp {
    let store: SharedStatusStore = Arc::new(MemoryStatusStore::new());
    let (queue, receiver) = JobQueue::channel(64);

    let worker_config = WorkerConfig {
        concurrency: 2,
        item_delay: Duration::ZERO,
        ..WorkerConfig::default()
    };
    let executor = Arc::new(TaskExecutor::new(
        Arc::clone(&store),
        Arc::new(EventBus::default()),
        &worker_config,
    ));
    let pool = WorkerPool::start(executor, receiver, worker_config.concurrency);

    let router = crunch_api::app::build_router(test_state(Arc::clone(&store), queue));
    LiveApp {
        router,
        store,
        pool,
    }
}

fn test_state(store: SharedStatusStore, queue: JobQueue) -> AppState {
    AppState {
        store,
        queue,
        status_ttl: Duration::from_secs(STATUS_TTL_SECS),
        config: Arc::new(test_config()),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
