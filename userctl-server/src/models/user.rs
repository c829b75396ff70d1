//! User payloads and records
//!
//! One canonical field set, three shapes:
//! - `NewUserRequest`: what clients send on create/replace (no id)
//! - `UserFields`: the same fields after validation
//! - `UserRecord`: validated fields plus the store-assigned id
//!
//! Only `UserFields` is accepted by the persistence layer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ValidationError, ValidationErrors};

/// Minimum length for name and surname
const MIN_NAME_LEN: usize = 2;

/// Minimum length for address
const MIN_ADDRESS_LEN: usize = 5;

/// Maximum length for email
pub const MAX_EMAIL_LEN: usize = 128;

/// Maximum length of the part before `@`
pub const MAX_EMAIL_LOCAL_LEN: usize = 64;

/// Literal date shape with ASCII digits, no calendar check
static BIRTHDAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("invalid birthday regex"));

/// Dot-atom local part (letters may be non-ASCII) @ DNS labels with at least one dot
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\p{L}\p{N}!#$%&'*+/=?^_`{|}~-]+(?:\.[\p{L}\p{N}!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("invalid email regex")
});

/// Create/replace payload as received over HTTP
///
/// Unknown keys (including `id`) are rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NewUserRequest {
    pub name: String,
    pub surname: String,
    pub birthday: String,
    pub email: String,
    pub address: String,
}

impl NewUserRequest {
    /// Check every field and return the validated field set.
    ///
    /// All violations are collected, not just the first.
    ///
    /// # Example
    /// ```
    /// use userctl_server::models::NewUserRequest;
    ///
    /// let req = NewUserRequest {
    ///     name: "Ada".into(),
    ///     surname: "Lovelace".into(),
    ///     birthday: "1815-12-10".into(),
    ///     email: "ada@example.com".into(),
    ///     address: "10 Downing St".into(),
    /// };
    /// assert!(req.validate().is_ok());
    /// ```
    pub fn validate(self) -> Result<UserFields, ValidationErrors> {
        let mut errors = Vec::new();

        check_min_len(&mut errors, "name", &self.name, MIN_NAME_LEN);
        check_min_len(&mut errors, "surname", &self.surname, MIN_NAME_LEN);

        if !BIRTHDAY_RE.is_match(&self.birthday) {
            errors.push(ValidationError::InvalidFormat {
                field: "birthday",
                reason: "must match YYYY-MM-DD",
            });
        }

        if self.email.chars().count() > MAX_EMAIL_LEN {
            errors.push(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        } else if let Err(e) = check_email_syntax(&self.email) {
            errors.push(e);
        }

        check_min_len(&mut errors, "address", &self.address, MIN_ADDRESS_LEN);

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }

        Ok(UserFields {
            name: self.name,
            surname: self.surname,
            birthday: self.birthday,
            email: normalize_email(&self.email),
            address: self.address,
        })
    }
}

fn check_email_syntax(email: &str) -> Result<(), ValidationError> {
    let local_len = email
        .rsplit_once('@')
        .map(|(local, _)| local.chars().count())
        .unwrap_or(0);

    if local_len > MAX_EMAIL_LOCAL_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "local part exceeds 64 characters",
        });
    }

    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "not a valid email address",
        });
    }

    Ok(())
}

/// Domains are case-insensitive; store them lowercased. Local part is kept as sent.
fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_ascii_lowercase()),
        None => email.to_owned(),
    }
}

fn check_min_len(errors: &mut Vec<ValidationError>, field: &'static str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.push(ValidationError::TooShort { field, min });
    }
}

/// Validated user fields (everything except the id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFields {
    name: String,
    surname: String,
    birthday: String,
    email: String,
    address: String,
}

impl UserFields {
    /// Rebuild from a stored row. Rows were validated on the way in.
    pub(crate) fn from_stored(
        name: String,
        surname: String,
        birthday: String,
        email: String,
        address: String,
    ) -> Self {
        Self {
            name,
            surname,
            birthday,
            email,
            address,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn birthday(&self) -> &str {
        &self.birthday
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// A persisted user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(flatten)]
    pub fields: UserFields,
}

impl UserRecord {
    pub fn new(id: i64, fields: UserFields) -> Self {
        Self { id, fields }
    }
}
