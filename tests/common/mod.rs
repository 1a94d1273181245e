#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use lms_api::auth::{generate_jwt, Claims, Role};
use lms_api::config::{self, ListingConfig};
use lms_api::database::models::{Course, CourseForm, User};
use lms_api::database::{CourseStore, MemoryStore};
use lms_api::AppState;

/// An in-process app over a seeded memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
    pub instructor: User,
    pub learner: User,
    pub admin: User,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::with_default_levels().await);
        let instructor = store.add_user("kim", "Kim Instructor", Role::Instructor, None).await;
        let learner = store.add_user("lee", "Lee Learner", Role::Learner, Some(1)).await;
        let admin = store.add_user("root", "Admin", Role::Admin, None).await;

        let state = AppState::new(store.clone(), ListingConfig::default());
        let router = lms_api::app(state, config::config());

        Self {
            store,
            router,
            instructor,
            learner,
            admin,
        }
    }

    pub fn token(user: &User) -> String {
        let role = Role::parse(&user.role).expect("seeded role");
        generate_jwt(&Claims::new(user.id, role)).expect("token")
    }

    pub async fn user(&self, login: &str, role: Role, level_id: Option<i32>) -> User {
        self.store.add_user(login, login, role, level_id).await
    }

    pub async fn course(&self, title: &str, level_id: i32) -> Course {
        let form = CourseForm {
            title: title.to_string(),
            level_id,
            ..Default::default()
        };
        self.store
            .insert_course(self.instructor.id, &form)
            .await
            .expect("seed course")
    }

    pub async fn enroll(&self, course_id: Uuid, user: &User, completed: bool) {
        self.store
            .add_enrollment(course_id, user.id, completed)
            .await
            .expect("seed enrollment");
    }

    /// Send one request through the router; returns status and parsed body
    /// (`Value::Null` for empty bodies)
    pub async fn call(&self, method: Method, uri: &str, user: Option<&User>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", format!("Bearer {}", Self::token(user)));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, user: Option<&User>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: Option<&User>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, user, Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: Option<&User>, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, user, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Option<&User>) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, user, None).await
    }
}

/// The built binary, serving on a free port with the memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_lms-api"))
            .arg("serve")
            .env("APP_ENV", "development")
            .env("STORAGE_BACKEND", "memory")
            .env("LMS_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    /// Run `lms-api token --login` against a fresh memory store
    pub fn mint_token(login: &str) -> Result<String> {
        let output = Command::new(env!("CARGO_BIN_EXE_lms-api"))
            .args(["token", "--login", login])
            .env("APP_ENV", "development")
            .env("STORAGE_BACKEND", "memory")
            .output()
            .context("failed to run token command")?;
        if !output.status.success() {
            anyhow::bail!("token command failed: {}", String::from_utf8_lossy(&output.stderr));
        }
        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
