//! Stable machine-readable error codes.
//! Outer surfaces (CLI, HTTP) map these to exit codes and status codes.

/// Maps an error to a stable code suitable for API payloads and logs.
pub trait VigilErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const NOT_FOUND: &str = "not_found";
pub const ALREADY_EXISTS: &str = "already_exists";
pub const CONFLICT: &str = "conflict";
pub const INVALID_FILTER: &str = "invalid_filter";
pub const STORE_ERROR: &str = "store_error";
pub const CONFIG_ERROR: &str = "config_error";
