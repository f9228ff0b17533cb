//! Optional filters for training searches and their predicate form.
//!
//! A search is the conjunction of the predicates returned by
//! [`TrainingCriteria::predicates`]. Filters that were not supplied produce no
//! predicate, so an empty criteria value matches every training of the anchor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::account::User;
use super::training::{Training, TrainingType};

/// Which party of a training the search is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSide {
    Trainee,
    Trainer,
}

impl SearchSide {
    pub fn anchor_id(&self, training: &Training) -> i64 {
        match self {
            SearchSide::Trainee => training.trainee_id,
            SearchSide::Trainer => training.trainer_id,
        }
    }

    pub fn counterpart_id(&self, training: &Training) -> i64 {
        match self {
            SearchSide::Trainee => training.trainer_id,
            SearchSide::Trainer => training.trainee_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCriteria {
    /// Inclusive lower bound on the training's calendar day.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound on the training's calendar day.
    pub to_date: Option<NaiveDate>,
    /// Case-insensitive fragment of the counterpart's first or last name.
    pub counterpart_name: Option<String>,
    pub training_type: Option<TrainingType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPredicate<'a> {
    OnOrAfter(NaiveDate),
    OnOrBefore(NaiveDate),
    CounterpartNameContains(&'a str),
    TypeIs(TrainingType),
}

impl TrainingCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }

    pub fn counterpart_name(mut self, fragment: impl Into<String>) -> Self {
        self.counterpart_name = Some(fragment.into());
        self
    }

    pub fn training_type(mut self, training_type: TrainingType) -> Self {
        self.training_type = Some(training_type);
        self
    }

    /// One predicate per supplied filter. A blank name fragment is treated as absent.
    pub fn predicates(&self) -> Vec<TrainingPredicate<'_>> {
        let mut predicates = Vec::with_capacity(4);

        if let Some(from_date) = self.from_date {
            predicates.push(TrainingPredicate::OnOrAfter(from_date));
        }
        if let Some(to_date) = self.to_date {
            predicates.push(TrainingPredicate::OnOrBefore(to_date));
        }
        if let Some(fragment) = self.counterpart_name.as_deref().map(str::trim) {
            if !fragment.is_empty() {
                predicates.push(TrainingPredicate::CounterpartNameContains(fragment));
            }
        }
        if let Some(training_type) = self.training_type {
            predicates.push(TrainingPredicate::TypeIs(training_type));
        }

        predicates
    }

    /// Evaluate every predicate against a training and its counterpart.
    pub fn matches(&self, training: &Training, counterpart: &User) -> bool {
        self.predicates()
            .iter()
            .all(|predicate| predicate.matches(training, counterpart))
    }
}

impl TrainingPredicate<'_> {
    pub fn matches(&self, training: &Training, counterpart: &User) -> bool {
        match *self {
            TrainingPredicate::OnOrAfter(from_date) => training.date.date() >= from_date,
            TrainingPredicate::OnOrBefore(to_date) => training.date.date() <= to_date,
            TrainingPredicate::CounterpartNameContains(fragment) => {
                let fragment = fragment.to_lowercase();
                counterpart.first_name.to_lowercase().contains(&fragment)
                    || counterpart.last_name.to_lowercase().contains(&fragment)
            }
            TrainingPredicate::TypeIs(training_type) => training.training_type == training_type,
        }
    }
}
