//! Use-case services.
//!
//! # Responsibility
//! - Enforce owner-based authorization on top of repositories.
//! - Keep the "current project" session affinity in one place.
//!
//! # Invariants
//! - Every read or write of a project/task checks
//!   `requesting_user == owner` first; failure is [`ServiceError::Denied`].
//! - Missing rows are [`ServiceError::NotFound`], checked before ownership.

use crate::form::FormErrors;
use crate::password::PasswordError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account_service;
pub mod project_service;
pub mod task_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    NotFound { entity: &'static str, id: i64 },
    /// Requesting user does not own the resource.
    Denied,
    /// Submitted data failed validation.
    Invalid(FormErrors),
    /// A group required by signup does not exist.
    MissingGroup(String),
    Password(PasswordError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Denied => write!(f, "permission denied"),
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::MissingGroup(name) => write!(f, "group `{name}` does not exist"),
            Self::Password(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Password(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<FormErrors> for ServiceError {
    fn from(value: FormErrors) -> Self {
        Self::Invalid(value)
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}
