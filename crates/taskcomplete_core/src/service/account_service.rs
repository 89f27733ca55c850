//! Account use-cases: signup and credential checks.
//!
//! # Invariants
//! - Argon2 runs only in [`hash_signup`] and [`check_password`]; neither
//!   touches the repository.

use crate::form::account_form::{SignupData, MSG_DUPLICATE_USERNAME};
use crate::form::FormErrors;
use crate::model::user::{User, UserDraft, UserId, SIGNUP_GROUP};
use crate::password::{hash_password, verify_password};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};

pub struct AccountService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> AccountService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Stores a pre-hashed account and adds it to [`SIGNUP_GROUP`].
    ///
    /// # Errors
    /// - `Invalid` when the username is taken.
    /// - `MissingGroup` when the signup group was removed from storage.
    pub fn signup(&self, draft: &UserDraft) -> ServiceResult<User> {
        if self.users.find_by_username(&draft.username)?.is_some() {
            return Err(duplicate_username());
        }

        let group = self
            .users
            .find_group(SIGNUP_GROUP)?
            .ok_or_else(|| ServiceError::MissingGroup(SIGNUP_GROUP.to_string()))?;

        let user_id = match self.users.create_user(draft) {
            Ok(id) => id,
            Err(RepoError::Duplicate(_)) => return Err(duplicate_username()),
            Err(err) => return Err(err.into()),
        };
        self.users.add_user_to_group(user_id, group.id)?;

        info!("event=signup module=service status=ok user_id={user_id}");
        self.get_user(user_id)?.ok_or(ServiceError::NotFound {
            entity: "user",
            id: user_id,
        })
    }

    /// Looks up the user and stored hash for a login attempt.
    /// Pass the result to [`check_password`].
    pub fn find_credentials(&self, username: &str) -> ServiceResult<Option<(User, String)>> {
        Ok(self.users.get_credentials(username)?)
    }

    /// Active user by id; inactive or deleted users yield `None`.
    pub fn get_user(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.users.get_user(id)?.filter(|user| user.is_active))
    }
}

/// Hashes the submitted password into a storable draft.
pub fn hash_signup(data: &SignupData) -> ServiceResult<UserDraft> {
    Ok(UserDraft {
        username: data.username.clone(),
        email: data.email.clone(),
        password_hash: hash_password(&data.password)?,
    })
}

/// Returns the user when `password` matches and the account is active.
pub fn check_password(credentials: Option<(User, String)>, password: &str) -> Option<User> {
    let Some((user, hash)) = credentials else {
        warn!("event=login module=service status=error reason=unknown_user");
        return None;
    };
    if !user.is_active || !verify_password(password, &hash) {
        warn!(
            "event=login module=service status=error reason=bad_credentials user_id={}",
            user.id
        );
        return None;
    }
    info!("event=login module=service status=ok user_id={}", user.id);
    Some(user)
}

fn duplicate_username() -> ServiceError {
    ServiceError::Invalid(FormErrors::single("username", MSG_DUPLICATE_USERNAME))
}
