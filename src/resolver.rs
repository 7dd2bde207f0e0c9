//! Internal link resolution against a build output snapshot.
//!
//! A target is stripped of its fragment and query, made absolute relative to
//! the referencing document, and then probed under a fixed list of candidate
//! forms that cover implicit `index.html` pages and omitted extensions.

use crate::site::SiteTree;
use crate::types::Reference;

/// Candidate forms tried for every normalized path, in order.
/// Add a rule here to accept a new form; `resolve` does not change.
pub const CANDIDATE_RULES: [CandidateRule; 5] = [
    CandidateRule { build: as_is, name: "as-is" },
    CandidateRule { build: with_index, name: "index" },
    CandidateRule { build: trimmed_with_index, name: "trimmed-index" },
    CandidateRule { build: trimmed, name: "trimmed" },
    CandidateRule { build: with_html_extension, name: "html-extension" },
];

/// What happened to one internal reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No candidate exists.
    Broken {
        /// Root-relative absolute path the target normalized to.
        normalized: String,
    },
    /// A candidate exists on disk or in the known-path set.
    Resolved {
        /// The first candidate that matched.
        candidate: String,
        /// Root-relative absolute path the target normalized to.
        normalized: String,
    },
    /// The target was only a fragment or query marker.
    Skipped,
}

/// One named way of turning a normalized path into an on-disk candidate.
pub struct CandidateRule {
    /// Produce the candidate from the normalized path.
    pub build: fn(&str) -> String,
    /// Short label used in `resolve` output.
    pub name: &'static str,
}

/// Apply every rule to a normalized path.
pub fn candidates(normalized: &str) -> Vec<(&'static str, String)> {
    return CANDIDATE_RULES
        .iter()
        .map(|rule| return (rule.name, (rule.build)(normalized)))
        .collect();
}

/// Whether a single candidate exists: on disk under the root, or in the
/// snapshot's known-path set. Both are consulted; directory-index entries in
/// the known set need not match the probed string form.
pub fn candidate_exists(tree: &SiteTree, candidate: &str) -> bool {
    return tree.exists_on_disk(candidate) || tree.is_known(candidate);
}

/// Collapse `.` and `..` segments and repeated slashes into a `/`-rooted path.
/// `..` at the root stays at the root. A trailing slash is kept.
fn collapse_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }

    let mut out = format!("/{}", segments.join("/"));
    if path.ends_with('/') && !out.ends_with('/') {
        out.push('/');
    }
    return out;
}

/// Turn a raw target into a root-relative absolute path.
///
/// Returns `None` when nothing is left after removing the fragment and query;
/// such targets are skipped, not broken. Relative targets are joined onto the
/// directory of `/` + `source_document`.
pub fn normalize(source_document: &str, raw: &str) -> Option<String> {
    let path = strip_fragment_and_query(raw);
    if path.is_empty() {
        return None;
    }

    if path.starts_with('/') {
        return Some(collapse_segments(path));
    }

    let source = format!("/{source_document}");
    let base_dir = source.rsplit_once('/').map_or("", |(dir, _)| return dir);
    return Some(collapse_segments(&format!("{base_dir}/{path}")));
}

/// Decide whether an internal reference resolves within the tree.
pub fn resolve(tree: &SiteTree, reference: &Reference) -> Outcome {
    let Some(normalized) = normalize(&reference.source, &reference.target) else {
        return Outcome::Skipped;
    };

    for (rule, candidate) in candidates(&normalized) {
        if candidate_exists(tree, &candidate) {
            tracing::debug!(href = %reference.target, %candidate, rule, "resolved");
            return Outcome::Resolved { candidate, normalized };
        }
    }

    tracing::debug!(href = %reference.target, %normalized, "no candidate exists");
    return Outcome::Broken { normalized };
}

/// Like [`normalize`], but a relative target is taken from the build root
/// rather than from a document's directory.
pub fn root_relative(raw: &str) -> Option<String> {
    let path = strip_fragment_and_query(raw);
    if path.is_empty() {
        return None;
    }
    return Some(collapse_segments(path));
}

/// Everything before the first `#` or `?`.
pub fn strip_fragment_and_query(raw: &str) -> &str {
    let end = raw.find(['#', '?']).unwrap_or(raw.len());
    return raw.get(..end).unwrap_or(raw);
}

// ── Candidate rules ────────────────────────────────────────────────────

/// The normalized path itself.
fn as_is(path: &str) -> String {
    return path.to_string();
}

/// The path with one trailing slash removed.
fn trimmed(path: &str) -> String {
    return path.strip_suffix('/').unwrap_or(path).to_string();
}

/// The path with one trailing slash removed, then `/index.html`.
fn trimmed_with_index(path: &str) -> String {
    return format!("{}/index.html", path.strip_suffix('/').unwrap_or(path));
}

/// The path with `.html` appended.
fn with_html_extension(path: &str) -> String {
    return format!("{path}.html");
}

/// The path with `/index.html` appended.
fn with_index(path: &str) -> String {
    return format!("{path}/index.html");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::types::ReferenceKind;

    fn reference(source: &str, target: &str) -> Reference {
        return Reference {
            kind: ReferenceKind::Anchor,
            source: source.to_string(),
            target: target.to_string(),
        };
    }

    fn write(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    /// A real tree: index, about page, a post, and an image.
    fn fixture() -> (tempfile::TempDir, SiteTree) {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html");
        write(dir.path(), "about/index.html");
        write(dir.path(), "blog/post/index.html");
        write(dir.path(), "img/logo.png");
        write(dir.path(), "contact.html");
        let tree = SiteTree::load(dir.path()).unwrap();
        return (dir, tree);
    }

    #[test]
    fn strips_fragment_then_query() {
        assert_eq!(strip_fragment_and_query("/a?b=1#c"), "/a");
        assert_eq!(strip_fragment_and_query("/a#c?b=1"), "/a");
        assert_eq!(strip_fragment_and_query("#only"), "");
        assert_eq!(strip_fragment_and_query("?q=1"), "");
    }

    #[test]
    fn relative_targets_join_the_document_directory() {
        assert_eq!(normalize("blog/post/index.html", "../img/logo.png").unwrap(), "/blog/img/logo.png");
        assert_eq!(normalize("blog/post/index.html", "../../img/logo.png").unwrap(), "/img/logo.png");
        assert_eq!(normalize("blog/post/index.html", "./comments/").unwrap(), "/blog/post/comments/");
        assert_eq!(normalize("index.html", "about").unwrap(), "/about");
    }

    #[test]
    fn parent_segments_stop_at_the_root() {
        assert_eq!(normalize("index.html", "../../x.css").unwrap(), "/x.css");
        assert_eq!(normalize("index.html", "/../secret").unwrap(), "/secret");
    }

    #[test]
    fn absolute_targets_keep_their_trailing_slash() {
        assert_eq!(normalize("index.html", "/about/").unwrap(), "/about/");
        assert_eq!(normalize("index.html", "/about//team/").unwrap(), "/about/team/");
        assert_eq!(normalize("index.html", "/").unwrap(), "/");
    }

    #[test]
    fn five_candidates_in_order() {
        let forms: Vec<String> = candidates("/about/").into_iter().map(|(_, c)| c).collect();
        assert_eq!(
            forms,
            ["/about/", "/about//index.html", "/about/index.html", "/about", "/about/.html"]
        );
    }

    #[test]
    fn directory_with_trailing_slash_resolves_to_its_index() {
        let (_dir, tree) = fixture();
        assert!(matches!(resolve(&tree, &reference("index.html", "/about/")), Outcome::Resolved { .. }));
    }

    #[test]
    fn directory_without_trailing_slash_resolves() {
        let (_dir, tree) = fixture();
        assert!(matches!(resolve(&tree, &reference("index.html", "/about")), Outcome::Resolved { .. }));
    }

    #[test]
    fn parent_relative_asset_resolves() {
        let (_dir, tree) = fixture();
        let outcome = resolve(&tree, &reference("blog/post/index.html", "../../img/logo.png"));
        assert_eq!(
            outcome,
            Outcome::Resolved {
                candidate: "/img/logo.png".to_string(),
                normalized: "/img/logo.png".to_string(),
            }
        );
    }

    #[test]
    fn exact_file_resolves_on_first_candidate() {
        let (_dir, tree) = fixture();
        let outcome = resolve(&tree, &reference("index.html", "/contact.html"));
        assert_eq!(
            outcome,
            Outcome::Resolved {
                candidate: "/contact.html".to_string(),
                normalized: "/contact.html".to_string(),
            }
        );
    }

    #[test]
    fn extension_may_be_omitted() {
        let (_dir, tree) = fixture();
        assert!(matches!(resolve(&tree, &reference("index.html", "/contact")), Outcome::Resolved { .. }));
    }

    #[test]
    fn fragment_only_target_is_skipped() {
        let (_dir, tree) = fixture();
        assert_eq!(resolve(&tree, &reference("index.html", "#section")), Outcome::Skipped);
    }

    #[test]
    fn missing_page_is_broken() {
        let (_dir, tree) = fixture();
        assert_eq!(
            resolve(&tree, &reference("index.html", "/missing-page")),
            Outcome::Broken { normalized: "/missing-page".to_string() }
        );
    }

    #[test]
    fn resolving_twice_gives_the_same_outcome() {
        let (_dir, tree) = fixture();
        for target in ["/about/", "/missing-page", "#x", "../img/logo.png"] {
            let r = reference("blog/post/index.html", target);
            assert_eq!(resolve(&tree, &r), resolve(&tree, &r), "{target}");
        }
    }

    #[test]
    fn known_path_set_alone_is_enough() {
        let tree = SiteTree::from_parts(Path::new("/nonexistent-root"), &["index.html"], &["/docs/", "/docs/index.html"]);
        assert!(matches!(resolve(&tree, &reference("index.html", "/docs/")), Outcome::Resolved { .. }));
        assert!(matches!(resolve(&tree, &reference("index.html", "/docs")), Outcome::Resolved { .. }));
        assert!(matches!(resolve(&tree, &reference("index.html", "/other")), Outcome::Broken { .. }));
    }

    #[test]
    fn root_relative_ignores_document_directory() {
        assert_eq!(root_relative("js/app.js?v=2").as_deref(), Some("/js/app.js"));
        assert_eq!(root_relative("/js/../js/app.js").as_deref(), Some("/js/app.js"));
        assert_eq!(root_relative("#top"), None);
    }
}
