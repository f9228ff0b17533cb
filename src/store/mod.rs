//! Persistence ports consumed by the services, plus the adapters shipped with the crate.
//!
//! Services depend only on these traits. Both kinds of account share one
//! username namespace and one `(first_name, last_name)` namespace, so
//! `username_exists` and `exists_by_first_and_last_name` must look across
//! trainees and trainers alike.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, NewTraining, Trainee, Trainer, Training, TrainingCriteria};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryDatabase, MemoryTraineeStore, MemoryTrainerStore, MemoryTrainingStore};
pub use postgres::{PgTraineeStore, PgTrainerStore, PgTrainingStore};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("Referenced record does not exist: {0}")]
    MissingReference(String),
    #[error("Stored value could not be decoded: {0}")]
    Decode(String),
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            let constraint = db_error.constraint().unwrap_or("unknown").to_string();
            if db_error.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_error.is_foreign_key_violation() {
                return StoreError::MissingReference(constraint);
            }
        }
        StoreError::Database(error)
    }
}

/// Key-by-identity persistence for one account kind.
#[cfg_attr(test, mockall::automock(type Account = Trainee;))]
#[async_trait]
pub trait AccountStore: Send + Sync {
    type Account: Account;

    async fn find_by_id(&self, id: i64) -> Result<Option<Self::Account>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Self::Account>, StoreError>;

    /// Insert a new account and return it with its assigned id.
    async fn save(&self, account: Self::Account) -> Result<Self::Account, StoreError>;

    /// Overwrite every field of an existing account.
    async fn update(&self, account: Self::Account) -> Result<Self::Account, StoreError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError>;

    /// Whether any account of any kind holds `username`.
    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Whether any account of any kind has exactly this name pair.
    async fn exists_by_first_and_last_name(&self, first_name: &str, last_name: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TraineeStore: AccountStore<Account = Trainee> {
    /// Trainings of the trainee `username` matching every supplied criterion.
    async fn search_trainings(&self, username: &str, criteria: &TrainingCriteria) -> Result<Vec<Training>, StoreError>;

    /// Remove the trainee and, by cascade, their trainings. Returns whether a row was removed.
    async fn delete_by_username(&self, username: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TrainerStore: AccountStore<Account = Trainer> {
    /// Trainings of the trainer `username` matching every supplied criterion.
    async fn search_trainings(&self, username: &str, criteria: &TrainingCriteria) -> Result<Vec<Training>, StoreError>;

    /// Trainers with no training linked to the trainee `trainee_username`.
    async fn find_unassigned_trainers(&self, trainee_username: &str) -> Result<Vec<Trainer>, StoreError>;
}

#[async_trait]
pub trait TrainingStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Training>, StoreError>;

    /// Insert a training. Unknown trainee or trainer ids fail with `MissingReference`.
    async fn save(&self, training: NewTraining) -> Result<Training, StoreError>;
}
