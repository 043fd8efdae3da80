//! User entity as seen by the ledger.
//!
//! The ledger only reads users to confirm that an account owner exists.
//! Credential hashing happens upstream; the store keeps the hash verbatim.

use serde::Serialize;

use crate::domain::foundation::{UserId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_admin: bool,
}

/// Fields for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub is_admin: bool,
}

impl NewUser {
    /// Creates a non-admin user record.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the email is blank or lacks an `@`.
    pub fn new(
        email: impl Into<String>,
        hashed_password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self {
            email,
            full_name: None,
            hashed_password: hashed_password.into(),
            is_admin: false,
        })
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

/// Partial update of a user. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<Option<String>>,
    pub hashed_password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserChanges {
    /// Applies the changes to a user in place.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(hash) = &self.hashed_password {
            user.hashed_password = hash.clone();
        }
        if let Some(is_admin) = self.is_admin {
            user.is_admin = is_admin;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub email: Option<String>,
}

impl UserFilter {
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| user.id == id)
            && self.email.as_ref().map_or(true, |email| &user.email == email)
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::empty_field("email"));
    }
    if !email.contains('@') {
        return Err(ValidationError::invalid_format("email", "missing @ symbol"));
    }
    Ok(())
}
