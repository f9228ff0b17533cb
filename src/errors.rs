use thiserror::Error;

use crate::auth::PasswordError;
use crate::models::ValidationError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Password processing error: {0}")]
    Password(#[from] PasswordError),
    #[error("Store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::UniqueViolation(constraint) => {
                ServiceError::Conflict(format!("uniqueness constraint {constraint} violated"))
            }
            StoreError::MissingReference(what) => ServiceError::NotFound(what),
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_store_constraint_errors_become_typed_failures() {
        assert_matches!(
            ServiceError::from(StoreError::UniqueViolation("users_username_key".to_string())),
            ServiceError::Conflict(message) if message.contains("users_username_key")
        );
        assert_matches!(
            ServiceError::from(StoreError::MissingReference("trainer 7".to_string())),
            ServiceError::NotFound(what) if what == "trainer 7"
        );
        assert_matches!(
            ServiceError::from(StoreError::Decode("bad".to_string())),
            ServiceError::Store(StoreError::Decode(_))
        );
    }
}
