use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::validation::{validate_duration, validate_required, ValidationError};

/// Training categories, shared by trainer specialization and training records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingType {
    Fitness,
    Yoga,
    Zumba,
    Stretching,
    Resistance,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown training type: {0}")]
pub struct UnknownTrainingType(pub String);

impl TrainingType {
    pub const ALL: [TrainingType; 5] = [
        TrainingType::Fitness,
        TrainingType::Yoga,
        TrainingType::Zumba,
        TrainingType::Stretching,
        TrainingType::Resistance,
    ];

    /// Stable catalogue id
    pub fn id(&self) -> i32 {
        match self {
            TrainingType::Fitness => 1,
            TrainingType::Yoga => 2,
            TrainingType::Zumba => 3,
            TrainingType::Stretching => 4,
            TrainingType::Resistance => 5,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TrainingType::Fitness => "Fitness",
            TrainingType::Yoga => "Yoga",
            TrainingType::Zumba => "Zumba",
            TrainingType::Stretching => "Stretching",
            TrainingType::Resistance => "Resistance",
        }
    }

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingType::Fitness => "FITNESS",
            TrainingType::Yoga => "YOGA",
            TrainingType::Zumba => "ZUMBA",
            TrainingType::Stretching => "STRETCHING",
            TrainingType::Resistance => "RESISTANCE",
        }
    }
}

impl FromStr for TrainingType {
    type Err = UnknownTrainingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrainingType::ALL
            .into_iter()
            .find(|training_type| training_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTrainingType(s.to_string()))
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A stored training session linking one trainee and one trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    pub id: i64,
    pub trainee_id: i64,
    pub trainer_id: i64,
    pub name: String,
    pub training_type: TrainingType,
    pub date: NaiveDateTime,
    pub duration_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTraining {
    pub trainee_id: i64,
    pub trainer_id: i64,
    pub name: String,
    pub training_type: TrainingType,
    pub date: NaiveDateTime,
    pub duration_seconds: i32,
}

impl NewTraining {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("training name", &self.name)?;
        validate_duration(self.duration_seconds)?;
        Ok(())
    }

    pub fn into_training(self, id: i64) -> Training {
        Training {
            id,
            trainee_id: self.trainee_id,
            trainer_id: self.trainer_id,
            name: self.name,
            training_type: self.training_type,
            date: self.date,
            duration_seconds: self.duration_seconds,
        }
    }
}
