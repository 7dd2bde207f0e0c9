use std::path::{Path, PathBuf};

use crate::error::Error;

/// File name of the project config, looked up in the working directory.
pub const CONFIG_FILE: &str = ".sitecheck.toml";

/// Build output directory used when neither the config nor `--root` names one.
const DEFAULT_ROOT: &str = "public";

/// Substring that marks a document as a partial.
const DEFAULT_PARTIAL_MARKER: &str = "partial";

/// Project configuration loaded from `.sitecheck.toml`.
/// Include/exclude patterns are path prefixes applied to root-relative document paths.
pub struct Config {
    /// Extra inline-script error signatures (regex syntax).
    pub error_patterns: Vec<String>,
    /// Document path prefixes to skip.
    exclude: Vec<String>,
    /// Internal link target prefixes the resolver skips.
    ignore: Vec<String>,
    /// Document path prefixes to check; empty means everything.
    include: Vec<String>,
    /// Documents whose path contains this are exempt from page-level checks.
    partial_marker: String,
    /// Build output root, relative to the working directory.
    root: PathBuf,
}

/// Raw TOML structure for `.sitecheck.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SitecheckTomlConfig {
    /// See [`Config::error_patterns`].
    #[serde(default)]
    error_patterns: Vec<String>,
    /// See [`Config::exclude`].
    #[serde(default)]
    exclude: Vec<String>,
    /// See [`Config::ignore`].
    #[serde(default)]
    ignore: Vec<String>,
    /// See [`Config::include`].
    #[serde(default)]
    include: Vec<String>,
    /// See [`Config::partial_marker`].
    partial_marker: Option<String>,
    /// See [`Config::root`].
    root: Option<PathBuf>,
}

impl Config {
    /// Check whether a document should be scanned.
    ///
    /// A path is included if no include patterns are set (check everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_check(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }

    /// Whether a link target, raw or normalized, starts with an `ignore` prefix.
    pub fn is_ignored(&self, target: &str) -> bool {
        return self.ignore.iter().any(|p| return target.starts_with(p.as_str()));
    }

    /// Whether a document is a partial (exempt from structure and title checks).
    pub fn is_partial(&self, relative_path: &str) -> bool {
        return !self.partial_marker.is_empty() && relative_path.contains(self.partial_marker.as_str());
    }

    /// Load config from `.sitecheck.toml` in the given directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        return Self::parse(&content);
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: SitecheckTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            error_patterns: raw.error_patterns,
            exclude: raw.exclude,
            ignore: raw.ignore,
            include: raw.include,
            partial_marker: raw.partial_marker.unwrap_or_else(|| return DEFAULT_PARTIAL_MARKER.to_string()),
            root: raw.root.unwrap_or_else(|| return PathBuf::from(DEFAULT_ROOT)),
        });
    }

    /// The build output root: the command-line override if given, else the configured one.
    pub fn root(&self, cli_override: Option<&Path>) -> PathBuf {
        return cli_override.map_or_else(|| return self.root.clone(), Path::to_path_buf);
    }
}

impl Default for Config {
    /// Check everything under `public/`, no ignores, no extra patterns.
    fn default() -> Self {
        return Self {
            error_patterns: Vec::new(),
            exclude: Vec::new(),
            ignore: Vec::new(),
            include: Vec::new(),
            partial_marker: DEFAULT_PARTIAL_MARKER.to_string(),
            root: PathBuf::from(DEFAULT_ROOT),
        };
    }
}
