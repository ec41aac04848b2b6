// Declare modules at the root level
pub mod aqi;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod proximity;
pub mod store;
pub mod time;
pub mod validation;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export everything under a shared namespace for external access
pub mod shared {
    pub use super::aqi;
    pub use super::config;
    pub use super::dashboard;
    pub use super::domain;
    pub use super::proximity;
    pub use super::store;
    pub use super::time;
    pub use super::validation;
}

// Also re-export at root for convenience
pub use aqi::*;
pub use config::*;
pub use dashboard::*;
pub use domain::*;
pub use proximity::*;
pub use store::*;
pub use time::*;
pub use validation::*;
