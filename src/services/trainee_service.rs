use chrono::NaiveDate;
use tracing::{info, instrument};

use super::account_service::AccountService;
use crate::errors::ServiceResult;
use crate::models::{Trainee, Training, TrainingCriteria};
use crate::store::TraineeStore;

pub type TraineeService<R> = AccountService<R>;

impl<R: TraineeStore> AccountService<R> {
    /// Build a trainee from its registration fields and provision it.
    pub async fn register_trainee(
        &self,
        first_name: &str,
        last_name: &str,
        password: &str,
        address: Option<String>,
        date_of_birth: Option<NaiveDate>,
    ) -> ServiceResult<Trainee> {
        info!("Registering trainee using first and last names");
        let trainee = Trainee::new(first_name, last_name, address, date_of_birth);
        self.create(trainee, password).await
    }

    /// Delete the trainee and their trainings. Returns whether anything was removed.
    pub async fn delete_trainee(&self, username: &str) -> ServiceResult<bool> {
        info!(username, "Deleting trainee");
        Ok(self.store.delete_by_username(username).await?)
    }

    /// Trainings of `username`, narrowed by every criterion that is set.
    #[instrument(skip(self))]
    pub async fn find_trainee_trainings(
        &self,
        username: &str,
        criteria: &TrainingCriteria,
    ) -> ServiceResult<Vec<Training>> {
        let trainings = self.store.search_trainings(username, criteria).await?;
        info!(count = trainings.len(), "Trainee trainings found");
        Ok(trainings)
    }
}
