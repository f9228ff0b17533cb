use tracing::{info, instrument};

use super::account_service::AccountService;
use crate::errors::ServiceResult;
use crate::models::{Trainer, Training, TrainingCriteria, TrainingType};
use crate::store::TrainerStore;

pub type TrainerService<R> = AccountService<R>;

impl<R: TrainerStore> AccountService<R> {
    pub async fn register_trainer(
        &self,
        first_name: &str,
        last_name: &str,
        password: &str,
        specialization: TrainingType,
    ) -> ServiceResult<Trainer> {
        info!("Registering trainer using first and last names");
        let trainer = Trainer::new(first_name, last_name, specialization);
        self.create(trainer, password).await
    }

    /// Trainings of `username`, narrowed by every criterion that is set.
    #[instrument(skip(self))]
    pub async fn find_trainer_trainings(
        &self,
        username: &str,
        criteria: &TrainingCriteria,
    ) -> ServiceResult<Vec<Training>> {
        let trainings = self.store.search_trainings(username, criteria).await?;
        info!(count = trainings.len(), "Trainer trainings found");
        Ok(trainings)
    }

    /// Trainers who have never trained `trainee_username`.
    #[instrument(skip(self))]
    pub async fn find_unassigned_trainers(&self, trainee_username: &str) -> ServiceResult<Vec<Trainer>> {
        let trainers = self.store.find_unassigned_trainers(trainee_username).await?;
        info!(count = trainers.len(), "Unassigned trainers found");
        Ok(trainers)
    }
}
