#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use taskcomplete_core::db::open_db_in_memory;
use taskcomplete_core::model::user::UserDraft;
use taskcomplete_core::{
    Project, ProjectDraft, ProjectRepository, SessionData, SessionRepository,
    SqliteProjectRepository, SqliteSessionRepository, SqliteTaskRepository, SqliteUserRepository,
    Task, TaskDraft, TaskRepository, UserId, UserRepository,
};
use taskcomplete_web::{build_router, AppState, WebSettings};
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

/// A user with a ready-made session cookie.
pub struct TestUser {
    pub id: UserId,
    pub cookie: String,
    pub session_key: String,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(open_db_in_memory().unwrap(), WebSettings::default());
        let router = build_router(state.clone());
        Self { state, router }
    }

    /// Creates a user and a logged-in session without going through the
    /// password hasher.
    pub fn user(&self, username: &str) -> TestUser {
        let session_key = format!("test-session-{username}");
        let id = self
            .state
            .with_conn(|conn| {
                let id = SqliteUserRepository::new(conn)
                    .create_user(&UserDraft {
                        username: username.to_string(),
                        email: format!("{username}@example.com"),
                        password_hash: "unusable".to_string(),
                    })
                    .unwrap();
                SqliteSessionRepository::new(conn)
                    .save_session(
                        &session_key,
                        &SessionData::for_user(id),
                        Utc::now().timestamp() + 3600,
                    )
                    .unwrap();
                Ok(id)
            })
            .unwrap();
        TestUser {
            id,
            cookie: format!("sessionid={session_key}"),
            session_key,
        }
    }

    pub fn project(&self, owner: &TestUser, title: &str) -> Project {
        self.state
            .with_conn(|conn| {
                let repo = SqliteProjectRepository::new(conn);
                let id = repo
                    .create_project(
                        owner.id,
                        &ProjectDraft {
                            title: title.to_string(),
                            description: None,
                        },
                    )
                    .unwrap();
                Ok(repo.get_project(id).unwrap().unwrap())
            })
            .unwrap()
    }

    pub fn task(&self, project: &Project, title: &str) -> Task {
        self.state
            .with_conn(|conn| {
                let repo = SqliteTaskRepository::new(conn);
                let id = repo
                    .create_task(&TaskDraft::new(project.id, title))
                    .unwrap();
                Ok(repo.get_task(id).unwrap().unwrap())
            })
            .unwrap()
    }

    pub fn get_task(&self, id: i64) -> Option<Task> {
        self.state
            .with_conn(|conn| Ok(SqliteTaskRepository::new(conn).get_task(id).unwrap()))
            .unwrap()
    }

    pub fn get_project(&self, id: i64) -> Option<Project> {
        self.state
            .with_conn(|conn| Ok(SqliteProjectRepository::new(conn).get_project(id).unwrap()))
            .unwrap()
    }

    pub fn session(&self, key: &str) -> Option<SessionData> {
        self.state
            .with_conn(|conn| {
                Ok(SqliteSessionRepository::new(conn)
                    .load_session(key, Utc::now().timestamp())
                    .unwrap())
            })
            .unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of the response's Set-Cookie header.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
