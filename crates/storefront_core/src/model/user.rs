//! User entity.
//!
//! `password_hash` is stored and validated here but never serialized
//! outward.

use super::{Patch, RecordId};
use crate::validate::{check_required_text, FieldErrors, Validate, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const USERNAME_MAX_BYTES: usize = 100;
const EMAIL_MAX_BYTES: usize = 254;
const PASSWORD_HASH_MAX_BYTES: usize = 500;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Returns whether `email` is syntactically acceptable.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_fields(v: &mut Validator, username: &str, email: &str, password_hash: &str) {
    check_required_text(v, "username", username, USERNAME_MAX_BYTES);
    check_required_text(v, "email", email, EMAIL_MAX_BYTES);
    v.check(
        is_valid_email(email),
        "email",
        "must be a valid email address",
    );
    check_required_text(v, "password_hash", password_hash, PASSWORD_HASH_MAX_BYTES);
}

impl Validate for User {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(&mut v, &self.username, &self.email, &self.password_hash);
        v.finish()
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        check_fields(&mut v, &self.username, &self.email, &self.password_hash);
        v.finish()
    }
}

impl Patch<User> for UserPatch {
    fn merge_into(self, existing: User) -> User {
        User {
            username: self.username.unwrap_or(existing.username),
            email: self.email.unwrap_or(existing.email),
            password_hash: self.password_hash.unwrap_or(existing.password_hash),
            ..existing
        }
    }

    fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}
