use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password cannot be empty")]
    Empty,
    #[error("Failed to hash password: {0}")]
    HashingFailed(#[source] bcrypt::BcryptError),
    #[error("Stored password hash is malformed")]
    MalformedHash,
}

/// Hashes plaintext passwords with bcrypt at a fixed cost.
///
/// The cost is configurable so tests and seeding can trade strength for speed;
/// verification reads the cost from the stored hash and works for any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;

    /// Create a hasher, clamping `cost` into the range bcrypt accepts.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(Self::MIN_COST, Self::MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Empty);
        }

        hash(password, self.cost).map_err(PasswordError::HashingFailed)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

/// Hash a password using bcrypt at the default cost
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    PasswordHasher::default().hash(password)
}

/// Verify a password against its hash.
///
/// A mismatch is `Ok(false)`; only a hash bcrypt cannot parse is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|_| PasswordError::MalformedHash)
}
