pub mod app_config;
pub mod database;
pub mod estimate_repo;
pub mod memory_repo;

pub use database::DbClient;
pub use estimate_repo::StoreEstimateRepository;
pub use memory_repo::{FailPoint, InMemoryEstimateRepository};
