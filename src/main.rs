use anyhow::{Context, Result};
use gym_crm::config::{run_migrations, AppConfig, DataSeeder, DatabaseConfig};
use gym_crm::store::{PgTraineeStore, PgTrainerStore, PgTrainingStore};
use gym_crm::{TraineeService, TrainerService, TrainingService};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    info!(environment = %config.environment, "Gym CRM starting");

    let database = DatabaseConfig::from_env()?;
    let pool = database.create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    let trainees = TraineeService::with_hasher(PgTraineeStore::new(pool.clone()), config.password_hasher());
    let trainers = TrainerService::with_hasher(PgTrainerStore::new(pool.clone()), config.password_hasher());
    let trainings = TrainingService::new(PgTrainingStore::new(pool.clone()));

    if let Some(seed_file) = &config.seed_file {
        let report = DataSeeder::new(&trainees, &trainers, &trainings)
            .seed_from_file(seed_file)
            .await
            .with_context(|| format!("seeding from {} failed", seed_file.display()))?;
        info!(
            trainees = report.trainees_created,
            trainers = report.trainers_created,
            trainings = report.trainings_created,
            skipped = report.skipped,
            "Seed data loaded"
        );
    }

    info!(training_types = trainings.training_types().len(), "Gym CRM ready");
    pool.close().await;
    Ok(())
}
