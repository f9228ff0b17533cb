pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod store;

pub use errors::{ServiceError, ServiceResult};
pub use models::{
    Account, NewTraining, Trainee, Trainer, Training, TrainingCriteria, TrainingType, User,
};
pub use services::{AccountService, TraineeService, TrainerService, TrainingService};
