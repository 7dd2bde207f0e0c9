/// Crate-level error types for sitecheck diagnostics.
use std::path::PathBuf;

/// Fatal conditions for a run. Each variant names the path, pattern, or
/// reason for failure so the diagnostic is useful without a debugger.
/// Per-check violations are never errors; they are collected into the report.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The build output root exists but holds no HTML documents.
    #[error("no HTML files found in build output: {}", path.display())]
    EmptyBuildOutput {
        /// The build output root that was scanned.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// An inline-script error signature failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern text as written.
        pattern: String,
        /// The regex compilation error.
        source: regex::Error,
    },

    /// A CSS selector used for extraction failed to parse.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        /// Description of the parse failure.
        reason: String,
        /// The selector text.
        selector: String,
    },

    /// JSON serialization of a report failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// The build output root does not exist on disk.
    #[error("build output not found: {}", path.display())]
    MissingBuildOutput {
        /// The expected build output root.
        path: PathBuf,
    },

    /// An HTML document could not be read.
    #[error("read failed: {}: {source}", path.display())]
    ReadFailed {
        /// File that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A document named on the command line is not part of the build output.
    #[error("unknown document: {path}")]
    UnknownDocument {
        /// Root-relative document path as given.
        path: String,
    },

    /// Directory traversal of the build output failed.
    #[error("walk: {0}")]
    Walk(
        /// The wrapped walkdir error.
        #[from]
        walkdir::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
