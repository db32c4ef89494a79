//! Bug-identity normalization configuration.

use serde::{Deserialize, Serialize};

/// How file paths enter the identity hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    /// The full path, after prefix stripping and separator normalization.
    Full,
    /// The file name only. Collapses same-named files in different
    /// directories onto one identity.
    Basename,
    /// The trailing `path_components` components. Survives checkout-root
    /// moves while still separating same-named files.
    LastComponents,
}

impl PathMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathMode::Full => "full",
            PathMode::Basename => "basename",
            PathMode::LastComponents => "last_components",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(PathMode::Full),
            "basename" => Some(PathMode::Basename),
            "last_components" => Some(PathMode::LastComponents),
            _ => None,
        }
    }
}

/// How line numbers enter the identity hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTolerance {
    /// The exact line number.
    Exact,
    /// `line / line_bucket` enters the hash, so a report that drifts a few
    /// lines inside one bucket keeps its identity.
    Bucket,
    /// Lines are left out of the hash entirely.
    Ignore,
}

impl LineTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTolerance::Exact => "exact",
            LineTolerance::Bucket => "bucket",
            LineTolerance::Ignore => "ignore",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(LineTolerance::Exact),
            "bucket" => Some(LineTolerance::Bucket),
            "ignore" => Some(LineTolerance::Ignore),
            _ => None,
        }
    }
}

/// Configuration for the identity subsystem.
///
/// Identity is a deliberate trade-off: the looser the normalization, the more
/// resilient identities are to refactoring, and the more likely two distinct
/// defects collapse into one. Every knob here changes which edits preserve a
/// bug's identity, so changing them on an existing store effectively renames
/// every bug at the next ingest.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IdentityConfig {
    /// Path prefixes removed before hashing (checkout roots, CI workspaces).
    #[serde(default)]
    pub strip_prefixes: Vec<String>,
    /// Path normalization mode. Default: `last_components`.
    pub path_mode: Option<PathMode>,
    /// Component count for `last_components`. Default: 2.
    pub path_components: Option<u32>,
    /// Line normalization mode. Default: `bucket`.
    pub line_tolerance: Option<LineTolerance>,
    /// Bucket width for `bucket`. Default: 10.
    pub line_bucket: Option<u32>,
    /// Whether the column number enters the hash. Default: true.
    pub include_column: Option<bool>,
}

impl IdentityConfig {
    /// Returns the effective path mode, defaulting to `last_components`.
    pub fn effective_path_mode(&self) -> PathMode {
        self.path_mode.unwrap_or(PathMode::LastComponents)
    }

    /// Returns the effective component count, defaulting to 2.
    pub fn effective_path_components(&self) -> u32 {
        self.path_components.unwrap_or(2)
    }

    /// Returns the effective line tolerance, defaulting to `bucket`.
    pub fn effective_line_tolerance(&self) -> LineTolerance {
        self.line_tolerance.unwrap_or(LineTolerance::Bucket)
    }

    /// Returns the effective bucket width, defaulting to 10.
    pub fn effective_line_bucket(&self) -> u32 {
        self.line_bucket.unwrap_or(10)
    }

    /// Returns whether columns enter the hash, defaulting to true.
    pub fn effective_include_column(&self) -> bool {
        self.include_column.unwrap_or(true)
    }
}
