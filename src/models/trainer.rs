use serde::{Deserialize, Serialize};

use super::account::{Account, User};
use super::training::TrainingType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    #[serde(flatten)]
    pub user: User,
    pub specialization: TrainingType,
}

impl Trainer {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, specialization: TrainingType) -> Self {
        Self {
            user: User::new(first_name, last_name),
            specialization,
        }
    }
}

impl Account for Trainer {
    const KIND: &'static str = "trainer";

    fn user(&self) -> &User {
        &self.user
    }

    fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }
}
