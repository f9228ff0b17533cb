use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::auth::base_username;
use crate::errors::ServiceError;
use crate::models::{Account, NewTraining, TrainingType};
use crate::services::{TraineeService, TrainerService, TrainingService};
use crate::store::{TraineeStore, TrainerStore, TrainingStore};

/// Contents of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub trainees: Vec<SeedTrainee>,
    #[serde(default)]
    pub trainers: Vec<SeedTrainer>,
    #[serde(default)]
    pub trainings: Vec<SeedTraining>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTrainee {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTrainer {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub specialization: TrainingType,
}

/// A training between two seeded people, referenced by the username their
/// names derive to (`First.Last`).
#[derive(Debug, Clone, Deserialize)]
pub struct SeedTraining {
    pub trainee: String,
    pub trainer: String,
    pub name: String,
    pub training_type: TrainingType,
    pub date: NaiveDateTime,
    pub duration_seconds: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub trainees_created: usize,
    pub trainers_created: usize,
    pub trainings_created: usize,
    pub skipped: usize,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("malformed seed file {}", path.display()))
    }
}

/// Provisions seed data through the services so every account gets a
/// resolved username and a hashed password.
///
/// People already registered are skipped. Trainings are only created when
/// both parties were registered by the same run, so seeding twice does not
/// duplicate them.
pub struct DataSeeder<'a, E, R, T> {
    trainees: &'a TraineeService<E>,
    trainers: &'a TrainerService<R>,
    trainings: &'a TrainingService<T>,
}

impl<'a, E, R, T> DataSeeder<'a, E, R, T>
where
    E: TraineeStore,
    R: TrainerStore,
    T: TrainingStore,
{
    pub fn new(
        trainees: &'a TraineeService<E>,
        trainers: &'a TrainerService<R>,
        trainings: &'a TrainingService<T>,
    ) -> Self {
        Self { trainees, trainers, trainings }
    }

    pub async fn seed_from_file(&self, path: &Path) -> Result<SeedReport> {
        let data = SeedData::from_file(path)?;
        self.seed_all(data).await
    }

    pub async fn seed_all(&self, data: SeedData) -> Result<SeedReport> {
        tracing::info!("Starting database seeding...");

        let mut report = SeedReport::default();
        // Derived base username -> id of the account created in this run.
        let mut trainee_ids = HashMap::new();
        let mut trainer_ids = HashMap::new();

        for seed in data.trainees {
            let registered = self
                .trainees
                .register_trainee(
                    &seed.first_name,
                    &seed.last_name,
                    &seed.password,
                    seed.address,
                    seed.date_of_birth,
                )
                .await;
            match registered {
                Ok(trainee) => {
                    tracing::info!(username = trainee.username(), "Created seed trainee");
                    trainee_ids.insert(seed_key(&seed.first_name, &seed.last_name), trainee.id());
                    report.trainees_created += 1;
                }
                Err(ServiceError::Conflict(_)) => {
                    tracing::info!("Seed trainee already registered, skipping");
                    report.skipped += 1;
                }
                Err(err) => return Err(err).context("failed to seed trainee"),
            }
        }

        for seed in data.trainers {
            let registered = self
                .trainers
                .register_trainer(&seed.first_name, &seed.last_name, &seed.password, seed.specialization)
                .await;
            match registered {
                Ok(trainer) => {
                    tracing::info!(username = trainer.username(), "Created seed trainer");
                    trainer_ids.insert(seed_key(&seed.first_name, &seed.last_name), trainer.id());
                    report.trainers_created += 1;
                }
                Err(ServiceError::Conflict(_)) => {
                    tracing::info!("Seed trainer already registered, skipping");
                    report.skipped += 1;
                }
                Err(err) => return Err(err).context("failed to seed trainer"),
            }
        }

        for seed in data.trainings {
            let parties = (
                trainee_ids.get(&seed.trainee.to_lowercase()).copied().flatten(),
                trainer_ids.get(&seed.trainer.to_lowercase()).copied().flatten(),
            );
            let (Some(trainee_id), Some(trainer_id)) = parties else {
                tracing::info!(
                    trainee = %seed.trainee,
                    trainer = %seed.trainer,
                    "Seed training parties not created by this run, skipping"
                );
                report.skipped += 1;
                continue;
            };

            let training = NewTraining {
                trainee_id,
                trainer_id,
                name: seed.name,
                training_type: seed.training_type,
                date: seed.date,
                duration_seconds: seed.duration_seconds,
            };
            self.trainings
                .add_training(training)
                .await
                .context("failed to seed training")?;
            report.trainings_created += 1;
        }

        tracing::info!(?report, "Database seeding completed!");
        Ok(report)
    }
}

fn seed_key(first_name: &str, last_name: &str) -> String {
    base_username(first_name, last_name).to_lowercase()
}
