#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use gym_crm::auth::PasswordHasher;
use gym_crm::store::{MemoryDatabase, MemoryTraineeStore, MemoryTrainerStore, MemoryTrainingStore};
use gym_crm::{NewTraining, Trainee, TraineeService, Trainer, TrainerService, Training, TrainingService, TrainingType};

pub const PASSWORD: &str = "Secret1";

/// Services wired over one in-memory database, hashing at the cheapest cost.
pub struct TestGym {
    pub db: MemoryDatabase,
    pub trainees: TraineeService<MemoryTraineeStore>,
    pub trainers: TrainerService<MemoryTrainerStore>,
    pub trainings: TrainingService<MemoryTrainingStore>,
}

impl TestGym {
    pub fn new() -> Self {
        let db = MemoryDatabase::new();
        let hasher = PasswordHasher::new(PasswordHasher::MIN_COST);
        Self {
            trainees: TraineeService::with_hasher(db.trainee_store(), hasher),
            trainers: TrainerService::with_hasher(db.trainer_store(), hasher),
            trainings: TrainingService::new(db.training_store()),
            db,
        }
    }

    pub async fn trainee(&self, first_name: &str, last_name: &str) -> Trainee {
        self.trainees
            .register_trainee(first_name, last_name, PASSWORD, None, None)
            .await
            .expect("trainee registration failed")
    }

    pub async fn trainer(&self, first_name: &str, last_name: &str, specialization: TrainingType) -> Trainer {
        self.trainers
            .register_trainer(first_name, last_name, PASSWORD, specialization)
            .await
            .expect("trainer registration failed")
    }

    pub async fn training(
        &self,
        trainee: &Trainee,
        trainer: &Trainer,
        training_type: TrainingType,
        date: NaiveDateTime,
    ) -> Training {
        let training = NewTraining {
            trainee_id: trainee.user.id.expect("trainee without id"),
            trainer_id: trainer.user.id.expect("trainer without id"),
            name: format!("{} with {}", training_type, trainer.user.first_name),
            training_type,
            date,
            duration_seconds: 3600,
        };
        self.trainings.add_training(training).await.expect("training creation failed")
    }
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("invalid date")
}

pub fn at(year: i32, month: u32, day_of_month: u32, hour: u32) -> NaiveDateTime {
    day(year, month, day_of_month)
        .and_hms_opt(hour, 0, 0)
        .expect("invalid time")
}
