//! User Account Repository
//!
//! 账号与口令凭据分表存储；口令哈希永远不会进入 user 表。

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Credential, User, UserUpdate};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find account by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find account by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let record_id = parse_id(USER_TABLE, id)?;
        let user: Option<User> = self.base.db().select(record_id).await?;
        Ok(user)
    }

    /// Create a new account record (no credential yet)
    pub async fn create(
        &self,
        name: String,
        email: String,
        phone: Option<String>,
        created_at: i64,
    ) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query(
                "CREATE user SET name = $name, email = $email, phone = $phone, \
                 photo_url = NONE, created_at = $created_at RETURN AFTER",
            )
            .bind(("name", name))
            .bind(("email", email))
            .bind(("phone", phone))
            .bind(("created_at", created_at))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update profile fields. Email is immutable by construction.
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let record_id = parse_id(USER_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.phone.is_some() {
            set_parts.push("phone = $phone");
        }
        if data.photo_url.is_some() {
            set_parts.push("photo_url = $photo_url");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("thing", record_id));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.phone {
            query = query.bind(("phone", v));
        }
        if let Some(v) = data.photo_url {
            query = query.bind(("photo_url", v));
        }

        let mut result = query.await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Credential for a user, if registered
    pub async fn credential_for(&self, user: &RecordId) -> RepoResult<Option<Credential>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM credential WHERE user = $user LIMIT 1")
            .bind(("user", user.clone()))
            .await?;
        let creds: Vec<Credential> = result.take(0)?;
        Ok(creds.into_iter().next())
    }

    /// Store the argon2 hash for a user
    pub async fn insert_credential(&self, user: &RecordId, password_hash: String) -> RepoResult<()> {
        self.base
            .db()
            .query("CREATE credential SET user = $user, password_hash = $password_hash")
            .bind(("user", user.clone()))
            .bind(("password_hash", password_hash))
            .await?;
        Ok(())
    }
}
