//! Path and line normalization ahead of identity hashing.

use crate::config::{IdentityConfig, LineTolerance, PathMode};

/// Normalize a file path for hashing.
///
/// Backslashes become forward slashes, the longest matching configured
/// prefix is stripped, then the configured path mode keeps the whole
/// remainder, its basename, or its trailing components.
pub fn normalize_path(path: &str, config: &IdentityConfig) -> String {
    let normalized = path.replace('\\', "/");

    let mut remainder = normalized.as_str();
    let mut best_len = 0usize;
    for prefix in &config.strip_prefixes {
        let prefix = prefix.replace('\\', "/");
        if normalized.starts_with(&prefix) && prefix.len() > best_len {
            best_len = prefix.len();
        }
    }
    if best_len > 0 {
        remainder = normalized[best_len..].trim_start_matches('/');
    }

    match config.effective_path_mode() {
        PathMode::Full => remainder.to_string(),
        PathMode::Basename => remainder
            .rsplit('/')
            .next()
            .unwrap_or(remainder)
            .to_string(),
        PathMode::LastComponents => {
            let components: Vec<&str> =
                remainder.split('/').filter(|c| !c.is_empty()).collect();
            let keep = config.effective_path_components() as usize;
            let start = components.len().saturating_sub(keep);
            components[start..].join("/")
        }
    }
}

/// Normalize a line number for hashing. `None` means lines do not
/// participate in the hash at all.
pub fn normalize_line(line: u32, config: &IdentityConfig) -> Option<u32> {
    match config.effective_line_tolerance() {
        LineTolerance::Exact => Some(line),
        LineTolerance::Bucket => Some(line / config.effective_line_bucket().max(1)),
        LineTolerance::Ignore => None,
    }
}
