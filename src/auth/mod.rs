// Credential utilities: password hashing and username provisioning

pub mod password;
pub mod username;

pub use password::{hash_password, verify_password, PasswordError, PasswordHasher};
pub use username::{base_username, resolve_unique_username};
