//! Core domain logic for Task Complete.
//! This crate is the single source of truth for data and authorization rules.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;
pub mod session;

pub use db::{open_db, open_db_in_memory, DbError, DbResult, StoreTarget};
pub use form::{FormErrors, FormInput, NON_FIELD_ERRORS};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LogTarget};
pub use model::project::{Project, ProjectDraft, ProjectId};
pub use model::tag::{Tag, TagId};
pub use model::task::{Priority, Task, TaskDraft, TaskId};
pub use model::user::{Group, User, UserId, SIGNUP_GROUP};
pub use model::ModelValidationError;
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::session_repo::{SessionRepository, SqliteSessionRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{check_password, hash_signup, AccountService};
pub use service::project_service::ProjectService;
pub use service::task_service::{ProjectTaskList, TaskService};
pub use service::{ServiceError, ServiceResult};
pub use session::{SessionData, SESSION_TTL_SECS};
