//! User Account Model
//!
//! 账号记录不包含任何口令字段；argon2 哈希存放在独立的
//! credential 表中，账号记录可以安全地原样返回给客户端。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;

/// User account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Unix millis
    pub created_at: i64,
}

impl User {
    /// Convert to the client-facing shape
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            photo_url: self.photo_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// Password credential, stored separately from the account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: UserId,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Credential {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

/// Profile update payload (email is immutable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
