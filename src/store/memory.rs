//! In-process store backed by a shared `tokio::sync::RwLock`.
//!
//! Enforces the same uniqueness and reference constraints as the PostgreSQL
//! schema, so services observe identical outcomes against either adapter.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AccountStore, StoreError, TraineeStore, TrainerStore, TrainingStore};
use crate::models::{
    Account, NewTraining, SearchSide, Trainee, Trainer, Training, TrainingCriteria, User,
};

/// Tables behind a [`MemoryDatabase`].
#[derive(Debug, Default)]
pub struct MemoryState {
    last_user_id: i64,
    last_training_id: i64,
    trainees: BTreeMap<i64, Trainee>,
    trainers: BTreeMap<i64, Trainer>,
    trainings: BTreeMap<i64, Training>,
}

impl MemoryState {
    fn users(&self) -> impl Iterator<Item = &User> {
        self.trainees
            .values()
            .map(|trainee| &trainee.user)
            .chain(self.trainers.values().map(|trainer| &trainer.user))
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.trainees
            .get(&id)
            .map(|trainee| &trainee.user)
            .or_else(|| self.trainers.get(&id).map(|trainer| &trainer.user))
    }

    /// Mirror of the `users` table unique constraints, ignoring the row being rewritten.
    fn check_unique(&self, candidate: &User) -> Result<(), StoreError> {
        for user in self.users().filter(|user| user.id != candidate.id) {
            if user.username == candidate.username {
                return Err(StoreError::UniqueViolation("users_username_key".to_string()));
            }
            if user.first_name == candidate.first_name && user.last_name == candidate.last_name {
                return Err(StoreError::UniqueViolation("users_first_name_last_name_key".to_string()));
            }
        }
        Ok(())
    }

    fn search_trainings(&self, side: SearchSide, anchor: Option<i64>, criteria: &TrainingCriteria) -> Vec<Training> {
        let Some(anchor) = anchor else {
            return Vec::new();
        };

        let mut trainings: Vec<Training> = self
            .trainings
            .values()
            .filter(|training| side.anchor_id(training) == anchor)
            .filter(|training| {
                self.user(side.counterpart_id(training))
                    .is_some_and(|counterpart| criteria.matches(training, counterpart))
            })
            .cloned()
            .collect();

        trainings.sort_by_key(|training| (training.date, training.id));
        trainings
    }
}

/// Shared in-process database; hand out per-kind stores with the accessors.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trainee_store(&self) -> MemoryTraineeStore {
        MemoryAccountStore::new(self.clone())
    }

    pub fn trainer_store(&self) -> MemoryTrainerStore {
        MemoryAccountStore::new(self.clone())
    }

    pub fn training_store(&self) -> MemoryTrainingStore {
        MemoryTrainingStore { db: self.clone() }
    }
}

/// Selects the table an account kind lives in.
pub trait MemoryTable: Account {
    fn table(state: &MemoryState) -> &BTreeMap<i64, Self>;

    fn table_mut(state: &mut MemoryState) -> &mut BTreeMap<i64, Self>;
}

impl MemoryTable for Trainee {
    fn table(state: &MemoryState) -> &BTreeMap<i64, Self> {
        &state.trainees
    }

    fn table_mut(state: &mut MemoryState) -> &mut BTreeMap<i64, Self> {
        &mut state.trainees
    }
}

impl MemoryTable for Trainer {
    fn table(state: &MemoryState) -> &BTreeMap<i64, Self> {
        &state.trainers
    }

    fn table_mut(state: &mut MemoryState) -> &mut BTreeMap<i64, Self> {
        &mut state.trainers
    }
}

fn find_in<T: MemoryTable>(state: &MemoryState, username: &str) -> Option<T> {
    T::table(state)
        .values()
        .find(|account| account.username() == username)
        .cloned()
}

#[derive(Debug, Clone)]
pub struct MemoryAccountStore<T> {
    db: MemoryDatabase,
    _kind: PhantomData<fn() -> T>,
}

pub type MemoryTraineeStore = MemoryAccountStore<Trainee>;
pub type MemoryTrainerStore = MemoryAccountStore<Trainer>;

impl<T> MemoryAccountStore<T> {
    fn new(db: MemoryDatabase) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<T: MemoryTable> AccountStore for MemoryAccountStore<T> {
    type Account = T;

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, StoreError> {
        let state = self.db.state.read().await;
        Ok(T::table(&state).get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<T>, StoreError> {
        let state = self.db.state.read().await;
        Ok(find_in(&state, username))
    }

    async fn save(&self, mut account: T) -> Result<T, StoreError> {
        let mut state = self.db.state.write().await;
        state.check_unique(account.user())?;

        state.last_user_id += 1;
        let id = state.last_user_id;
        account.user_mut().id = Some(id);
        T::table_mut(&mut state).insert(id, account.clone());

        tracing::debug!(id, kind = T::KIND, "Inserted account");
        Ok(account)
    }

    async fn update(&self, account: T) -> Result<T, StoreError> {
        let mut state = self.db.state.write().await;
        let id = account
            .id()
            .filter(|id| T::table(&state).contains_key(id))
            .ok_or_else(|| StoreError::MissingReference(format!("{} {:?}", T::KIND, account.id())))?;
        state.check_unique(account.user())?;

        T::table_mut(&mut state).insert(id, account.clone());
        Ok(account)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let state = self.db.state.read().await;
        Ok(T::table(&state).contains_key(&id))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let state = self.db.state.read().await;
        let taken = state.users().any(|user| user.username == username);
        Ok(taken)
    }

    async fn exists_by_first_and_last_name(&self, first_name: &str, last_name: &str) -> Result<bool, StoreError> {
        let state = self.db.state.read().await;
        let registered = state
            .users()
            .any(|user| user.first_name == first_name && user.last_name == last_name);
        Ok(registered)
    }
}

#[async_trait]
impl TraineeStore for MemoryTraineeStore {
    async fn search_trainings(&self, username: &str, criteria: &TrainingCriteria) -> Result<Vec<Training>, StoreError> {
        let state = self.db.state.read().await;
        let anchor = find_in::<Trainee>(&state, username).and_then(|trainee| trainee.id());
        Ok(state.search_trainings(SearchSide::Trainee, anchor, criteria))
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let mut state = self.db.state.write().await;
        let Some(id) = find_in::<Trainee>(&state, username).and_then(|trainee| trainee.id()) else {
            return Ok(false);
        };

        state.trainees.remove(&id);
        state.trainings.retain(|_, training| training.trainee_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TrainerStore for MemoryTrainerStore {
    async fn search_trainings(&self, username: &str, criteria: &TrainingCriteria) -> Result<Vec<Training>, StoreError> {
        let state = self.db.state.read().await;
        let anchor = find_in::<Trainer>(&state, username).and_then(|trainer| trainer.id());
        Ok(state.search_trainings(SearchSide::Trainer, anchor, criteria))
    }

    async fn find_unassigned_trainers(&self, trainee_username: &str) -> Result<Vec<Trainer>, StoreError> {
        let state = self.db.state.read().await;
        let trainee_id = find_in::<Trainee>(&state, trainee_username).and_then(|trainee| trainee.id());

        let unassigned: Vec<Trainer> = state
            .trainers
            .iter()
            .filter(|(trainer_id, _)| {
                !state.trainings.values().any(|training| {
                    Some(training.trainee_id) == trainee_id && training.trainer_id == **trainer_id
                })
            })
            .map(|(_, trainer)| trainer.clone())
            .collect();
        Ok(unassigned)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryTrainingStore {
    db: MemoryDatabase,
}

#[async_trait]
impl TrainingStore for MemoryTrainingStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Training>, StoreError> {
        let state = self.db.state.read().await;
        Ok(state.trainings.get(&id).cloned())
    }

    async fn save(&self, training: NewTraining) -> Result<Training, StoreError> {
        let mut state = self.db.state.write().await;
        if !state.trainees.contains_key(&training.trainee_id) {
            return Err(StoreError::MissingReference(format!("trainee {}", training.trainee_id)));
        }
        if !state.trainers.contains_key(&training.trainer_id) {
            return Err(StoreError::MissingReference(format!("trainer {}", training.trainer_id)));
        }

        state.last_training_id += 1;
        let training = training.into_training(state.last_training_id);
        state.trainings.insert(training.id, training.clone());
        Ok(training)
    }
}
