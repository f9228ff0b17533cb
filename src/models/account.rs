use serde::{Deserialize, Serialize};

use super::validation::{validate_name, validate_required, ValidationError};

/// Fields shared by every account kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on insert.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    /// Unique across trainees and trainers. Empty until provisioned.
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
}

impl User {
    /// An unsaved user; username and credential are provisioned on create.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            username: String::new(),
            password_hash: String::new(),
            is_active: true,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("first name", &self.first_name)?;
        validate_name("last name", &self.last_name)?;
        Ok(())
    }

    /// A stored account always carries a username and a credential hash.
    pub fn validate_provisioned(&self) -> Result<(), ValidationError> {
        validate_required("username", &self.username)?;
        if self.password_hash.trim().is_empty() {
            return Err(ValidationError::Blank("password hash"));
        }
        Ok(())
    }
}

/// Capability shared by trainees and trainers, used by the generic lifecycle engine.
pub trait Account: Clone + Send + Sync + 'static {
    /// Lower-case kind label used in log lines and error messages.
    const KIND: &'static str;

    fn user(&self) -> &User;

    fn user_mut(&mut self) -> &mut User;

    /// Validate the account before any store access.
    fn validate(&self) -> Result<(), ValidationError> {
        self.user().validate()
    }

    fn id(&self) -> Option<i64> {
        self.user().id
    }

    fn username(&self) -> &str {
        &self.user().username
    }

    fn is_active(&self) -> bool {
        self.user().is_active
    }
}
