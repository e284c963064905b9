//! User entity and write payload
//!
//! A [`User`] is what the stores hand back: identity plus the mutable
//! fields. A [`UserPayload`] is what create and update accept. Update is a
//! full replacement, so both operations share the same payload and the
//! same validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Maximum length for email, names and individual aliases
pub const MAX_TEXT_LEN: usize = 255;

/// One `@`, no whitespace, something on both sides.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("invalid email regex"));

/// A stored user record.
///
/// `id` is opaque to everything above the store: a UUID for the relational
/// and in-process backends, a 24-char hex ObjectId for the document backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub aliases: Option<Vec<String>>,
}

/// Create/update request body.
///
/// All four core fields are required; a body missing any of them fails to
/// decode. `aliases` may be absent, null, or a (possibly empty) list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
}

impl UserPayload {
    /// Check field-level rules.
    ///
    /// # Rules
    /// - email, first and last name: non-blank, max 255 characters
    /// - email must look like `local@domain`
    /// - age must not be negative
    /// - every alias non-blank, max 255 characters
    ///
    /// # Example
    /// ```
    /// use roster_core::UserPayload;
    ///
    /// let payload = UserPayload {
    ///     email: "a@x.com".into(),
    ///     first_name: "A".into(),
    ///     last_name: "B".into(),
    ///     age: 30,
    ///     aliases: None,
    /// };
    /// assert!(payload.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("email", &self.email)?;
        check_text("firstName", &self.first_name)?;
        check_text("lastName", &self.last_name)?;

        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@domain",
            });
        }

        if self.age < 0 {
            return Err(ValidationError::Negative { field: "age" });
        }

        if let Some(aliases) = &self.aliases {
            for alias in aliases {
                check_text("aliases", alias)?;
            }
        }

        Ok(())
    }

    /// Drop aliases, for deployments running without the aliases column.
    #[must_use]
    pub fn without_aliases(mut self) -> Self {
        self.aliases = None;
        self
    }

    /// Materialize a record with the given identifier.
    pub fn into_user(self, id: impl Into<String>) -> User {
        User {
            id: id.into(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            aliases: self.aliases,
        }
    }
}

fn check_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}
