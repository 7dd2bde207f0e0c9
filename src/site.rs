//! Build output snapshot: which paths exist, and the parsed HTML documents.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use scraper::Html;
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::Error;

/// One HTML file from the build output, read and parsed once per run.
pub struct Document {
    /// Parsed DOM.
    pub html: Html,
    /// Root-relative path with forward slashes and no leading slash (`blog/index.html`).
    pub path: String,
    /// Raw file contents.
    pub source: String,
}

/// Immutable snapshot of a build output tree, captured before any check runs.
pub struct SiteTree {
    /// Root-relative paths of every HTML document, sorted.
    html_files: Vec<String>,
    /// Every file as `/path`, plus `/dir/` and `/dir/index.html` for every directory.
    known_paths: HashSet<String>,
    /// The build output root on disk.
    root: PathBuf,
}

impl Document {
    /// Wrap already-read source text as a parsed document.
    pub fn parse(path: impl Into<String>, source: String) -> Self {
        let html = Html::parse_document(&source);
        return Self { html, path: path.into(), source };
    }
}

impl SiteTree {
    /// Whether a root-relative absolute path (`/x/y`) exists on disk under the root.
    /// Directories count.
    pub fn exists_on_disk(&self, absolute: &str) -> bool {
        return self.root.join(absolute.trim_start_matches('/')).exists();
    }

    /// Root-relative paths of every HTML document, sorted.
    pub fn html_files(&self) -> &[String] {
        return &self.html_files;
    }

    /// Whether the path is in the snapshot's known-path set.
    pub fn is_known(&self, absolute: &str) -> bool {
        return self.known_paths.contains(absolute);
    }

    /// Walk `root` and snapshot every path under it.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingBuildOutput` if `root` is not a directory,
    /// `Error::Walk` if traversal fails, or `Error::EmptyBuildOutput`
    /// if no HTML documents exist.
    pub fn load(root: &Path) -> Result<Self, Error> {
        if !root.is_dir() {
            return Err(Error::MissingBuildOutput { path: root.to_path_buf() });
        }

        let mut html_files = Vec::new();
        let mut known_paths = HashSet::new();
        insert_directory_index(&mut known_paths, "");

        for entry in WalkDir::new(root).min_depth(1).into_iter().filter_entry(|e| return !is_hidden(e)) {
            let entry = entry?;
            let relative = relative_slash_path(root, entry.path());

            if entry.file_type().is_dir() {
                insert_directory_index(&mut known_paths, &relative);
                continue;
            }

            if entry.path().extension().is_some_and(|ext| return ext == "html") {
                html_files.push(relative.clone());
            }
            known_paths.insert(format!("/{relative}"));
        }

        if html_files.is_empty() {
            return Err(Error::EmptyBuildOutput { path: root.to_path_buf() });
        }

        html_files.sort();
        tracing::debug!(
            root = %root.display(),
            html = html_files.len(),
            known = known_paths.len(),
            "captured build output"
        );

        return Ok(Self { html_files, known_paths, root: root.to_path_buf() });
    }

    /// Strip a leading `/` from `relative` and confirm it names an HTML
    /// document in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDocument` if it does not.
    pub fn require_document<'a>(&self, relative: &'a str) -> Result<&'a str, Error> {
        let relative = relative.trim_start_matches('/');
        if !self.html_files.iter().any(|f| return f == relative) {
            return Err(Error::UnknownDocument { path: relative.to_string() });
        }
        return Ok(relative);
    }

    /// The build output root on disk.
    pub fn root(&self) -> &Path {
        return &self.root;
    }

    /// Build a snapshot from explicit parts, for tests that don't need a real tree.
    #[cfg(test)]
    pub fn from_parts(root: &Path, html_files: &[&str], known_paths: &[&str]) -> Self {
        return Self {
            html_files: html_files.iter().map(|s| return (*s).to_string()).collect(),
            known_paths: known_paths.iter().map(|s| return (*s).to_string()).collect(),
            root: root.to_path_buf(),
        };
    }
}

/// Add the implicit index entries for a directory (`""` is the root).
fn insert_directory_index(known_paths: &mut HashSet<String>, relative_dir: &str) {
    let dir = if relative_dir.is_empty() {
        "/".to_string()
    } else {
        format!("/{relative_dir}/")
    };
    known_paths.insert(format!("{dir}index.html"));
    known_paths.insert(dir);
}

/// Dot-prefixed entries below the root are not part of the site.
fn is_hidden(entry: &DirEntry) -> bool {
    return entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.');
}

/// Read and parse every HTML document the config admits.
///
/// # Errors
///
/// Returns `Error::ReadFailed` for the first document that cannot be read;
/// an unreadable document aborts the run.
pub fn load_documents(tree: &SiteTree, config: &Config) -> Result<Vec<Document>, Error> {
    let mut documents = Vec::new();

    for relative in tree.html_files() {
        if !config.should_check(relative) {
            tracing::debug!(document = %relative, "excluded by config");
            continue;
        }
        documents.push(read_document(tree, relative)?);
    }

    tracing::debug!(count = documents.len(), "parsed documents");
    return Ok(documents);
}

/// Read and parse a single document by its root-relative path.
///
/// # Errors
///
/// Returns `Error::UnknownDocument` if the path is not an HTML document in the
/// snapshot, or `Error::ReadFailed` if it cannot be read.
pub fn read_document(tree: &SiteTree, relative: &str) -> Result<Document, Error> {
    let relative = tree.require_document(relative)?;

    // Pages in legacy encodings still get checked; bad bytes become U+FFFD.
    let disk_path = tree.root().join(relative);
    let bytes = std::fs::read(&disk_path)
        .map_err(|source| return Error::ReadFailed { path: disk_path.clone(), source })?;
    let source = String::from_utf8_lossy(&bytes).into_owned();
    return Ok(Document::parse(relative, source));
}

/// Render a path below `root` as forward-slash separated components.
fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    return relative
        .components()
        .map(|c| return c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
}
