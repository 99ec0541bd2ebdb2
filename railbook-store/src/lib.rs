pub mod app_config;
pub mod datastore;
pub mod ledger;
pub mod owners;
pub mod seating;

pub use app_config::{Config, ConfigError, EngineConfig, RouteConfig};
pub use datastore::Datastore;
pub use seating::SectionOccupancy;
