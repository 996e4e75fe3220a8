use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{Profile, User};

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Request body for login. `identifier` may be an email or a username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub tokens: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub profession: Option<String>,
    pub country: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            tokens: u.tokens,
            created_at: u.created_at,
            gender: u.gender,
            dob: u.dob,
            profession: u.profession,
            country: u.country,
        }
    }
}

#[cfg(test)]
mod dto_tests {
    use super::*;

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            username: "tester".into(),
            password_hash: "$argon2id$secret".into(),
            tokens: 12,
            created_at: OffsetDateTime::now_utc(),
            gender: None,
            dob: None,
            profession: Some("Chef".into()),
            country: None,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"tokens\":12"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn signup_request_reads_flat_profile() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"email":"a@b.co","username":"abc","password":"secret1","country":"Spain"}"#,
        )
        .unwrap();
        assert_eq!(req.profile.country.as_deref(), Some("Spain"));
        assert!(req.profile.gender.is_none());
    }

    #[test]
    fn login_request_accepts_email_field() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"x"}"#).unwrap();
        assert_eq!(req.identifier, "a@b.co");
    }
}
