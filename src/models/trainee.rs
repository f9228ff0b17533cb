use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::account::{Account, User};
use super::validation::{validate_date_of_birth, validate_optional, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainee {
    #[serde(flatten)]
    pub user: User,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

impl Trainee {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        address: Option<String>,
        date_of_birth: Option<NaiveDate>,
    ) -> Self {
        Self {
            user: User::new(first_name, last_name),
            date_of_birth,
            address,
        }
    }
}

impl Account for Trainee {
    const KIND: &'static str = "trainee";

    fn user(&self) -> &User {
        &self.user
    }

    fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.user.validate()?;
        validate_optional("address", self.address.as_deref())?;
        if let Some(date_of_birth) = self.date_of_birth {
            validate_date_of_birth(date_of_birth, Utc::now().date_naive())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trainee_is_unprovisioned() {
        let trainee = Trainee::new("Anna", "Lee", Some("1 Elm St".to_string()), None);

        assert_eq!(trainee.id(), None);
        assert_eq!(trainee.username(), "");
        assert!(trainee.is_active());
        assert!(trainee.validate().is_ok());
    }

    #[test]
    fn test_future_birthday_fails_validation() {
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();
        let trainee = Trainee::new("Anna", "Lee", None, Some(tomorrow));

        assert_eq!(trainee.validate(), Err(ValidationError::DateOfBirthNotInPast));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let mut trainee = Trainee::new("Anna", "Lee", None, None);
        trainee.user.password_hash = "$2b$04$secret".to_string();

        let json = serde_json::to_value(&trainee).unwrap();

        assert_eq!(json["first_name"], "Anna");
        assert!(json.get("password_hash").is_none());
    }
}
