// Domain records and input validation

pub mod account;
pub mod trainee;
pub mod trainer;
pub mod training;
pub mod training_criteria;
pub mod validation;

pub use account::*;
pub use trainee::*;
pub use trainer::*;
pub use training::*;
pub use training_criteria::*;
pub use validation::*;
