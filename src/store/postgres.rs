//! PostgreSQL adapters built on `sqlx`.
//!
//! Accounts live in `users` plus one kind table (`trainees` or `trainers`)
//! keyed by `user_id`. The unique constraints on `users` make concurrent
//! creations for the same person or username fail at insert time.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Row};

use super::{AccountStore, StoreError, TraineeStore, TrainerStore, TrainingStore};
use crate::models::{
    NewTraining, SearchSide, Trainee, Trainer, Training, TrainingCriteria, TrainingPredicate, TrainingType, User,
};

const USER_COLUMNS: &str = "u.id, u.first_name, u.last_name, u.username, u.password_hash, u.is_active";

const TRAINING_COLUMNS: &str =
    "tr.id, tr.trainee_id, tr.trainer_id, tr.training_name, tr.training_type, tr.training_date, tr.duration_seconds";

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: Some(row.try_get("id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
    })
}

fn parse_training_type(value: &str) -> Result<TrainingType, StoreError> {
    value
        .parse::<TrainingType>()
        .map_err(|e| StoreError::Decode(e.to_string()))
}

fn trainee_from_row(row: &PgRow) -> Result<Trainee, StoreError> {
    Ok(Trainee {
        user: user_from_row(row)?,
        date_of_birth: row.try_get("date_of_birth")?,
        address: row.try_get("address")?,
    })
}

fn trainer_from_row(row: &PgRow) -> Result<Trainer, StoreError> {
    let specialization: String = row.try_get("specialization")?;
    Ok(Trainer {
        user: user_from_row(row)?,
        specialization: parse_training_type(&specialization)?,
    })
}

fn training_from_row(row: &PgRow) -> Result<Training, StoreError> {
    let training_type: String = row.try_get("training_type")?;
    Ok(Training {
        id: row.try_get("id")?,
        trainee_id: row.try_get("trainee_id")?,
        trainer_id: row.try_get("trainer_id")?,
        name: row.try_get("training_name")?,
        training_type: parse_training_type(&training_type)?,
        date: row.try_get("training_date")?,
        duration_seconds: row.try_get("duration_seconds")?,
    })
}

async fn insert_user(conn: &mut PgConnection, user: &User) -> Result<i64, StoreError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (first_name, last_name, username, password_hash, is_active)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.is_active)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// Rewrite the `users` row of an account that exists in `kind_table`.
async fn update_user(conn: &mut PgConnection, kind_table: &str, user: &User) -> Result<i64, StoreError> {
    let id = user
        .id
        .ok_or_else(|| StoreError::MissingReference(format!("{kind_table} without id")))?;

    let sql = format!(
        "UPDATE users
         SET first_name = $2, last_name = $3, username = $4, password_hash = $5, is_active = $6
         WHERE id = $1 AND EXISTS (SELECT 1 FROM {kind_table} k WHERE k.user_id = $1)"
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::MissingReference(format!("{kind_table} {id}")));
    }
    Ok(id)
}

async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, StoreError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

async fn name_exists(pool: &PgPool, first_name: &str, last_name: &str) -> Result<bool, StoreError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE first_name = $1 AND last_name = $2)")
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

async fn kind_row_exists(pool: &PgPool, kind_table: &str, id: i64) -> Result<bool, StoreError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {kind_table} WHERE user_id = $1)");
    let exists = sqlx::query_scalar::<_, bool>(&sql).bind(id).fetch_one(pool).await?;
    Ok(exists)
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_predicate<'args>(query: &mut QueryBuilder<'args, Postgres>, predicate: TrainingPredicate<'_>) {
    match predicate {
        TrainingPredicate::OnOrAfter(from_date) => {
            query.push(" AND tr.training_date::date >= ").push_bind(from_date);
        }
        TrainingPredicate::OnOrBefore(to_date) => {
            query.push(" AND tr.training_date::date <= ").push_bind(to_date);
        }
        TrainingPredicate::CounterpartNameContains(fragment) => {
            let pattern = format!("%{}%", escape_like(fragment));
            query
                .push(" AND (counterpart.first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR counterpart.last_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        TrainingPredicate::TypeIs(training_type) => {
            query.push(" AND tr.training_type = ").push_bind(training_type.as_str());
        }
    }
}

/// Build the anchored training search: one `AND` clause per supplied criterion.
fn training_search_query<'args>(
    side: SearchSide,
    username: &'args str,
    criteria: &TrainingCriteria,
) -> QueryBuilder<'args, Postgres> {
    let (anchor_column, counterpart_column) = match side {
        SearchSide::Trainee => ("trainee_id", "trainer_id"),
        SearchSide::Trainer => ("trainer_id", "trainee_id"),
    };

    let mut query = QueryBuilder::new(format!(
        "SELECT {TRAINING_COLUMNS} FROM trainings tr \
         JOIN users anchor ON anchor.id = tr.{anchor_column} \
         JOIN users counterpart ON counterpart.id = tr.{counterpart_column} \
         WHERE anchor.username = "
    ));
    query.push_bind(username);

    for predicate in criteria.predicates() {
        push_predicate(&mut query, predicate);
    }

    query.push(" ORDER BY tr.training_date, tr.id");
    query
}

async fn search_trainings(
    pool: &PgPool,
    side: SearchSide,
    username: &str,
    criteria: &TrainingCriteria,
) -> Result<Vec<Training>, StoreError> {
    let mut query = training_search_query(side, username, criteria);
    tracing::debug!(sql = query.sql(), "Searching trainings");

    let rows = query.build().fetch_all(pool).await?;
    rows.iter().map(training_from_row).collect()
}

#[derive(Debug, Clone)]
pub struct PgTraineeStore {
    pool: PgPool,
}

impl PgTraineeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_sql(filter: &str) -> String {
        format!(
            "SELECT {USER_COLUMNS}, t.date_of_birth, t.address
             FROM users u JOIN trainees t ON t.user_id = u.id
             WHERE {filter}"
        )
    }
}

#[async_trait]
impl AccountStore for PgTraineeStore {
    type Account = Trainee;

    async fn find_by_id(&self, id: i64) -> Result<Option<Trainee>, StoreError> {
        let row = sqlx::query(&Self::select_sql("u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(trainee_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainee>, StoreError> {
        let row = sqlx::query(&Self::select_sql("u.username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(trainee_from_row).transpose()
    }

    async fn save(&self, mut trainee: Trainee) -> Result<Trainee, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_user(&mut tx, &trainee.user).await?;

        sqlx::query("INSERT INTO trainees (user_id, date_of_birth, address) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(trainee.date_of_birth)
            .bind(&trainee.address)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        trainee.user.id = Some(id);
        Ok(trainee)
    }

    async fn update(&self, trainee: Trainee) -> Result<Trainee, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = update_user(&mut tx, "trainees", &trainee.user).await?;

        sqlx::query("UPDATE trainees SET date_of_birth = $2, address = $3 WHERE user_id = $1")
            .bind(id)
            .bind(trainee.date_of_birth)
            .bind(&trainee.address)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(trainee)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError> {
        kind_row_exists(&self.pool, "trainees", id).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        username_exists(&self.pool, username).await
    }

    async fn exists_by_first_and_last_name(&self, first_name: &str, last_name: &str) -> Result<bool, StoreError> {
        name_exists(&self.pool, first_name, last_name).await
    }
}

#[async_trait]
impl TraineeStore for PgTraineeStore {
    async fn search_trainings(&self, username: &str, criteria: &TrainingCriteria) -> Result<Vec<Training>, StoreError> {
        search_trainings(&self.pool, SearchSide::Trainee, username, criteria).await
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users u USING trainees t WHERE t.user_id = u.id AND u.username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PgTrainerStore {
    pool: PgPool,
}

impl PgTrainerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_sql(filter: &str) -> String {
        format!(
            "SELECT {USER_COLUMNS}, tr.specialization
             FROM users u JOIN trainers tr ON tr.user_id = u.id
             WHERE {filter}"
        )
    }
}

#[async_trait]
impl AccountStore for PgTrainerStore {
    type Account = Trainer;

    async fn find_by_id(&self, id: i64) -> Result<Option<Trainer>, StoreError> {
        let row = sqlx::query(&Self::select_sql("u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(trainer_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Trainer>, StoreError> {
        let row = sqlx::query(&Self::select_sql("u.username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(trainer_from_row).transpose()
    }

    async fn save(&self, mut trainer: Trainer) -> Result<Trainer, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_user(&mut tx, &trainer.user).await?;

        sqlx::query("INSERT INTO trainers (user_id, specialization) VALUES ($1, $2)")
            .bind(id)
            .bind(trainer.specialization.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        trainer.user.id = Some(id);
        Ok(trainer)
    }

    async fn update(&self, trainer: Trainer) -> Result<Trainer, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = update_user(&mut tx, "trainers", &trainer.user).await?;

        sqlx::query("UPDATE trainers SET specialization = $2 WHERE user_id = $1")
            .bind(id)
            .bind(trainer.specialization.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(trainer)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError> {
        kind_row_exists(&self.pool, "trainers", id).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        username_exists(&self.pool, username).await
    }

    async fn exists_by_first_and_last_name(&self, first_name: &str, last_name: &str) -> Result<bool, StoreError> {
        name_exists(&self.pool, first_name, last_name).await
    }
}

#[async_trait]
impl TrainerStore for PgTrainerStore {
    async fn search_trainings(&self, username: &str, criteria: &TrainingCriteria) -> Result<Vec<Training>, StoreError> {
        search_trainings(&self.pool, SearchSide::Trainer, username, criteria).await
    }

    async fn find_unassigned_trainers(&self, trainee_username: &str) -> Result<Vec<Trainer>, StoreError> {
        let sql = Self::select_sql(
            "NOT EXISTS (
                SELECT 1 FROM trainings t JOIN users trainee ON trainee.id = t.trainee_id
                WHERE t.trainer_id = tr.user_id AND trainee.username = $1
             )
             ORDER BY u.id",
        );
        let rows = sqlx::query(&sql).bind(trainee_username).fetch_all(&self.pool).await?;
        rows.iter().map(trainer_from_row).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PgTrainingStore {
    pool: PgPool,
}

impl PgTrainingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrainingStore for PgTrainingStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Training>, StoreError> {
        let sql = format!("SELECT {TRAINING_COLUMNS} FROM trainings tr WHERE tr.id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(training_from_row).transpose()
    }

    async fn save(&self, training: NewTraining) -> Result<Training, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO trainings (trainee_id, trainer_id, training_name, training_type, training_date, duration_seconds)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(training.trainee_id)
        .bind(training.trainer_id)
        .bind(&training.name)
        .bind(training.training_type.as_str())
        .bind(training.date)
        .bind(training.duration_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(training.into_training(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Bob"), "Bob");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_search_without_criteria_only_anchors() {
        let query = training_search_query(SearchSide::Trainee, "Anna.Lee", &TrainingCriteria::new());
        let sql = query.sql();

        assert!(sql.contains("anchor.id = tr.trainee_id"));
        assert!(sql.contains("counterpart.id = tr.trainer_id"));
        assert!(sql.ends_with("WHERE anchor.username = $1 ORDER BY tr.training_date, tr.id"));
    }

    #[test]
    fn test_search_renders_one_clause_per_criterion() {
        let criteria = TrainingCriteria::new()
            .from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .to_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
            .counterpart_name("ann")
            .training_type(TrainingType::Yoga);
        let query = training_search_query(SearchSide::Trainer, "Bob.Stone", &criteria);
        let sql = query.sql();

        assert!(sql.contains("anchor.id = tr.trainer_id"));
        assert!(sql.contains(" AND tr.training_date::date >= $2"));
        assert!(sql.contains(" AND tr.training_date::date <= $3"));
        assert!(sql.contains(" AND (counterpart.first_name ILIKE $4 OR counterpart.last_name ILIKE $5)"));
        assert!(sql.contains(" AND tr.training_type = $6"));
    }

    #[test]
    fn test_search_skips_blank_name_fragment() {
        let criteria = TrainingCriteria::new().counterpart_name("");
        let query = training_search_query(SearchSide::Trainee, "Anna.Lee", &criteria);

        assert!(!query.sql().contains("ILIKE"));
    }
}
