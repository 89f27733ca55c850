//! User/group repository contract and SQLite implementation.
//!
//! # Invariants
//! - Usernames are unique (case-sensitive).
//! - Password hashes are only returned through `get_credentials`.

use crate::model::user::{Group, GroupId, User, UserDraft, UserId};
use crate::repo::{int_to_bool, is_unique_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, username, email, is_active, date_joined FROM users";

pub trait UserRepository {
    fn create_user(&self, draft: &UserDraft) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Returns the user together with the stored password hash.
    fn get_credentials(&self, username: &str) -> RepoResult<Option<(User, String)>>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    fn find_group(&self, name: &str) -> RepoResult<Option<Group>>;
    fn add_user_to_group(&self, user: UserId, group: GroupId) -> RepoResult<()>;
    fn list_user_groups(&self, user: UserId) -> RepoResult<Vec<Group>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, draft: &UserDraft) -> RepoResult<UserId> {
        draft.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3);",
            params![
                draft.username.as_str(),
                draft.email.as_str(),
                draft.password_hash.as_str()
            ],
        );
        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Duplicate("username")),
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self.get_credentials(username)?.map(|(user, _)| user))
    }

    fn get_credentials(&self, username: &str) -> RepoResult<Option<(User, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, email, is_active, date_joined, password_hash
             FROM users
             WHERE username = ?1;",
        )?;
        let mut rows = stmt.query([username])?;
        match rows.next()? {
            Some(row) => {
                let user = parse_user_row(row)?;
                let hash: String = row.get("password_hash")?;
                Ok(Some((user, hash)))
            }
            None => Ok(None),
        }
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }

    fn find_group(&self, name: &str) -> RepoResult<Option<Group>> {
        let group = self
            .conn
            .query_row(
                "SELECT id, name FROM groups WHERE name = ?1;",
                [name],
                parse_group_row,
            )
            .optional()?;
        Ok(group)
    }

    fn add_user_to_group(&self, user: UserId, group: GroupId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?1, ?2);",
            params![user, group],
        )?;
        Ok(())
    }

    fn list_user_groups(&self, user: UserId) -> RepoResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(
            "SELECT g.id, g.name
             FROM groups g
             INNER JOIN user_groups ug ON ug.group_id = g.id
             WHERE ug.user_id = ?1
             ORDER BY g.name ASC;",
        )?;
        let groups = stmt
            .query_map([user], parse_group_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        is_active: int_to_bool(row.get("is_active")?, "users.is_active")?,
        date_joined: row.get("date_joined")?,
    })
}

fn parse_group_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}
