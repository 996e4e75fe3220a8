use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

pub const MIN_USERNAME_LEN: usize = 3;

/// Usernames are stored trimmed and must keep at least `MIN_USERNAME_LEN` characters.
pub fn check_username(username: &str) -> ServiceResult<()> {
    if username.trim().chars().count() < MIN_USERNAME_LEN {
        return Err(ServiceError::validation(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    Ok(())
}

/// User record in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,         // stored lowercased
    pub username: String,
    pub password_hash: String, // Argon2 PHC string
    pub tokens: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Optional profile fields collected at signup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub profession: Option<String>,
    pub country: Option<String>,
}

/// Input for `User::create`; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub profile: Profile,
}

/// The mutable subset of a user. Identity fields and the token balance
/// are not reachable from here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub profession: Option<String>,
    pub country: Option<String>,
    #[serde(skip)]
    pub(crate) password_hash: Option<String>,
}

impl UserUpdate {
    pub(crate) fn password(hash: String) -> Self {
        Self {
            password_hash: Some(hash),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, user: &mut User) {
        if let Some(v) = self.username {
            user.username = v.trim().to_string();
        }
        if let Some(v) = self.gender {
            user.gender = Some(v);
        }
        if let Some(v) = self.dob {
            user.dob = Some(v);
        }
        if let Some(v) = self.profession {
            user.profession = Some(v);
        }
        if let Some(v) = self.country {
            user.country = Some(v);
        }
        if let Some(v) = self.password_hash {
            user.password_hash = v;
        }
    }
}
