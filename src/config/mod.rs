use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::auth::PasswordHasher;

pub mod database;
pub mod seeding;

pub use database::{run_migrations, DatabaseConfig};
pub use seeding::{DataSeeder, SeedData, SeedReport};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
    pub bcrypt_cost: u32,
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("BCRYPT_COST must be an integer, got {value:?}"))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            bcrypt_cost: bcrypt_cost.clamp(PasswordHasher::MIN_COST, PasswordHasher::MAX_COST),
            seed_file: env::var_os("SEED_FILE").map(PathBuf::from),
        })
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.bcrypt_cost)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
