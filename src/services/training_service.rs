use tracing::info;

use crate::errors::ServiceResult;
use crate::models::{NewTraining, Training, TrainingType};
use crate::store::TrainingStore;

pub struct TrainingService<S> {
    store: S,
}

impl<S: TrainingStore> TrainingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<Option<Training>> {
        info!(id, "Searching for training by id");
        Ok(self.store.find_by_id(id).await?)
    }

    /// Record a training between an existing trainee and trainer.
    ///
    /// Unknown party ids fail with `NotFound`.
    pub async fn add_training(&self, training: NewTraining) -> ServiceResult<Training> {
        training.validate()?;

        let saved = self.store.save(training).await?;
        info!(
            id = saved.id,
            trainee_id = saved.trainee_id,
            trainer_id = saved.trainer_id,
            "Training saved"
        );
        Ok(saved)
    }

    pub fn training_types(&self) -> &'static [TrainingType] {
        &TrainingType::ALL
    }
}
