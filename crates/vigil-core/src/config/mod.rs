//! Configuration system for Vigil.
//! TOML-based, 3-layer resolution: env > project > user > defaults.

pub mod identity_config;
pub mod query_config;
pub mod store_config;
pub mod vigil_config;

pub use identity_config::{IdentityConfig, LineTolerance, PathMode};
pub use query_config::QueryConfig;
pub use store_config::StoreConfig;
pub use vigil_config::VigilConfig;
