//! Error handling for Vigil.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod query_error;
pub mod store_error;

pub use config_error::ConfigError;
pub use error_code::VigilErrorCode;
pub use query_error::QueryError;
pub use store_error::StoreError;
