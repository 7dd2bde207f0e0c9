//! Named checks over a build output snapshot.
//!
//! Every check is a stateless scan that returns the full list of violations it
//! found; an empty list means the check passed.

use regex::Regex;

use crate::config::Config;
use crate::error::Error;
use crate::extract::{self, Selectors};
use crate::report::CheckReport;
use crate::resolver::{self, Outcome};
use crate::site::{Document, SiteTree};
use crate::types::{Reference, ReferenceKind, Scope, Violation};

/// Error signatures searched for in inline script bodies.
const BUILTIN_ERROR_PATTERNS: [&str; 4] = [
    r"console\.error\(",
    r"throw new Error\(",
    r"undefined is not",
    r"(?i)cannot read property.*undefined",
];

/// Characters of a script body quoted in a violation.
const SNIPPET_CHARS: usize = 100;

/// Literal `src` values left behind by templates that rendered nothing.
const PLACEHOLDER_SRC: [&str; 2] = ["undefined", "null"];

/// Every check, in the order `check` runs them.
pub const ALL_CHECKS: [CheckKind; 9] = [
    CheckKind::IndexPage,
    CheckKind::NotFoundPage,
    CheckKind::HasLinks,
    CheckKind::InternalLinks,
    CheckKind::ScriptSrc,
    CheckKind::LocalScripts,
    CheckKind::InlineScripts,
    CheckKind::Structure,
    CheckKind::Titles,
];

/// Named checks, selectable with `--only`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    /// At least one anchor link exists.
    HasLinks,
    /// The site has a top-level `index.html`.
    IndexPage,
    /// No inline script matches an error signature.
    InlineScripts,
    /// Every internal link and asset reference resolves.
    InternalLinks,
    /// Every local `<script src>` exists.
    LocalScripts,
    /// The site has a 404 page.
    NotFoundPage,
    /// No `<script src>` is empty or a placeholder.
    ScriptSrc,
    /// Documents with a doctype have an `<html>` element.
    Structure,
    /// Non-partial documents have a title.
    Titles,
}

/// Everything a check may look at. Built once per run and passed explicitly.
pub struct Context<'a> {
    /// Loaded configuration.
    pub config: &'a Config,
    /// Parsed documents admitted by the config.
    pub documents: &'a [Document],
    /// Compiled inline-script error signatures.
    pub patterns: &'a ScriptPatterns,
    /// Compiled CSS selectors.
    pub selectors: &'a Selectors,
    /// The build output snapshot.
    pub tree: &'a SiteTree,
}

/// Compiled inline-script error signatures, built-in plus configured.
pub struct ScriptPatterns {
    /// Each pattern's source text alongside its compiled form.
    patterns: Vec<(String, Regex)>,
}

/// Doctype and `<html>` detection over raw document text.
struct StructureMarkers {
    /// Matches a doctype declaration.
    doctype: Regex,
    /// Matches an opening `<html>` tag.
    html: Regex,
}

impl CheckKind {
    /// One-line description for `info` output.
    pub fn description(self) -> &'static str {
        return match self {
            CheckKind::HasLinks => "At least one <a href> exists",
            CheckKind::IndexPage => "The site has a top-level index.html",
            CheckKind::InlineScripts => "No inline script matches an error signature",
            CheckKind::InternalLinks => "Every internal link and asset reference resolves",
            CheckKind::LocalScripts => "Every local <script src> exists",
            CheckKind::NotFoundPage => "The site has a 404 page",
            CheckKind::ScriptSrc => "No <script src> is empty, \"undefined\" or \"null\"",
            CheckKind::Structure => "Documents with a doctype contain an <html> element",
            CheckKind::Titles => "Non-partial documents have a title",
        };
    }

    /// Kebab-case name used on the command line and in reports.
    pub fn name(self) -> &'static str {
        return match self {
            CheckKind::HasLinks => "has-links",
            CheckKind::IndexPage => "index-page",
            CheckKind::InlineScripts => "inline-scripts",
            CheckKind::InternalLinks => "internal-links",
            CheckKind::LocalScripts => "local-scripts",
            CheckKind::NotFoundPage => "not-found-page",
            CheckKind::ScriptSrc => "script-src",
            CheckKind::Structure => "structure",
            CheckKind::Titles => "titles",
        };
    }
}

impl ScriptPatterns {
    /// Compile the built-in signatures followed by `extra`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` for the first pattern that fails to compile.
    pub fn new(extra: &[String]) -> Result<Self, Error> {
        let mut patterns = Vec::new();
        let builtin = BUILTIN_ERROR_PATTERNS.iter().map(|p| return (*p).to_string());

        for pattern in builtin.chain(extra.iter().cloned()) {
            let compiled = Regex::new(&pattern)
                .map_err(|source| return Error::InvalidPattern { pattern: pattern.clone(), source })?;
            patterns.push((pattern, compiled));
        }

        return Ok(Self { patterns });
    }

    /// Source text of every pattern that matches `body`, in order.
    fn matching<'a>(&'a self, body: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        return self
            .patterns
            .iter()
            .filter(move |(_, regex)| return regex.is_match(body))
            .map(|(source, _)| return source.as_str());
    }
}

impl StructureMarkers {
    /// Compile the doctype and `<html>` markers.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if a marker fails to compile.
    fn new() -> Result<Self, Error> {
        return Ok(Self {
            doctype: compile_marker(r"(?i)<!doctype")?,
            html: compile_marker(r"(?i)<html[\s>]")?,
        });
    }
}

/// Compile one structure marker.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` on failure.
fn compile_marker(pattern: &str) -> Result<Regex, Error> {
    return Regex::new(pattern)
        .map_err(|source| return Error::InvalidPattern { pattern: pattern.to_string(), source });
}

/// At least one anchor link across all checked documents.
pub fn has_links(ctx: &Context<'_>) -> Vec<Violation> {
    let any = ctx
        .documents
        .iter()
        .any(|d| return d.html.select(&ctx.selectors.anchor).next().is_some());

    return if any { Vec::new() } else { vec![Violation::NoLinks] };
}

/// The site has a top-level `index.html`.
pub fn index_page(ctx: &Context<'_>) -> Vec<Violation> {
    if ctx.tree.html_files().iter().any(|f| return f == "index.html") {
        return Vec::new();
    }
    return vec![Violation::MissingPage { expected: "index.html".to_string() }];
}

/// No inline script body matches an error signature.
pub fn inline_scripts(ctx: &Context<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for document in ctx.documents {
        for script in document.html.select(&ctx.selectors.script) {
            let body: String = script.text().collect();
            if body.is_empty() {
                continue;
            }
            for pattern in ctx.patterns.matching(&body) {
                violations.push(Violation::SuspiciousInlineScript {
                    document: document.path.clone(),
                    pattern: pattern.to_string(),
                    snippet: body.chars().take(SNIPPET_CHARS).collect(),
                });
            }
        }
    }

    return violations;
}

/// Every internal reference resolves to an artifact in the tree.
pub fn internal_links(ctx: &Context<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for document in ctx.documents {
        let internal = extract::references(document, ctx.selectors)
            .filter(|r| return r.scope() == Scope::Internal)
            .filter(|r| return !is_ignored(ctx.config, r));

        for reference in internal {
            if let Outcome::Broken { normalized } = resolver::resolve(ctx.tree, &reference) {
                violations.push(Violation::BrokenLink {
                    document: reference.source,
                    href: reference.target,
                    normalized,
                });
            }
        }
    }

    return violations;
}

/// Whether a reference matches an `ignore` prefix, either as written or after
/// normalization against its document.
fn is_ignored(config: &Config, reference: &Reference) -> bool {
    if config.is_ignored(&reference.target) {
        return true;
    }
    return resolver::normalize(&reference.source, &reference.target)
        .is_some_and(|normalized| return config.is_ignored(&normalized));
}

/// Every local `<script src>` points at an existing file. Relative values are
/// taken from the build root, not the document's directory.
pub fn local_scripts(ctx: &Context<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for document in ctx.documents {
        for src in script_sources(document, ctx.selectors) {
            if src.trim().is_empty() {
                continue;
            }
            let reference = Reference {
                kind: ReferenceKind::Source,
                source: document.path.clone(),
                target: src.to_string(),
            };
            if reference.scope() == Scope::External {
                continue;
            }
            let Some(resolved) = resolver::root_relative(src) else {
                continue;
            };
            if !ctx.tree.exists_on_disk(&resolved) {
                violations.push(Violation::MissingScript {
                    document: document.path.clone(),
                    resolved,
                    src: src.to_string(),
                });
            }
        }
    }

    return violations;
}

/// Some HTML path mentions `404`.
pub fn not_found_page(ctx: &Context<'_>) -> Vec<Violation> {
    if ctx.tree.html_files().iter().any(|f| return f.contains("404")) {
        return Vec::new();
    }
    return vec![Violation::MissingPage { expected: "404 page".to_string() }];
}

/// Run one check and wrap its violations in a report.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` if the structure markers fail to compile.
pub fn run(kind: CheckKind, ctx: &Context<'_>) -> Result<CheckReport, Error> {
    let violations = match kind {
        CheckKind::HasLinks => has_links(ctx),
        CheckKind::IndexPage => index_page(ctx),
        CheckKind::InlineScripts => inline_scripts(ctx),
        CheckKind::InternalLinks => internal_links(ctx),
        CheckKind::LocalScripts => local_scripts(ctx),
        CheckKind::NotFoundPage => not_found_page(ctx),
        CheckKind::ScriptSrc => script_src(ctx),
        CheckKind::Structure => structure(ctx)?,
        CheckKind::Titles => titles(ctx),
    };

    tracing::debug!(check = kind.name(), violations = violations.len(), "check finished");
    return Ok(CheckReport { check: kind, violations });
}

/// `src` values of every `<script src>` in a document.
fn script_sources<'a>(document: &'a Document, selectors: &'a Selectors) -> impl Iterator<Item = &'a str> + 'a {
    return document
        .html
        .select(&selectors.script_src)
        .filter_map(|script| return script.value().attr("src"));
}

/// No `<script src>` is blank or a literal placeholder.
pub fn script_src(ctx: &Context<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for document in ctx.documents {
        for src in script_sources(document, ctx.selectors) {
            let trimmed = src.trim();
            if trimmed.is_empty() || PLACEHOLDER_SRC.contains(&src) {
                violations.push(Violation::InvalidScriptSrc {
                    document: document.path.clone(),
                    src: src.to_string(),
                });
            }
        }
    }

    return violations;
}

/// Non-partial documents that declare a doctype contain an `<html>` element.
///
/// Checked on the raw source: the parser always synthesizes `<html>`.
///
/// # Errors
///
/// Returns `Error::InvalidPattern` if the markers fail to compile.
pub fn structure(ctx: &Context<'_>) -> Result<Vec<Violation>, Error> {
    let markers = StructureMarkers::new()?;

    let violations = ctx
        .documents
        .iter()
        .filter(|d| return !ctx.config.is_partial(&d.path))
        .filter(|d| return markers.doctype.is_match(&d.source) && !markers.html.is_match(&d.source))
        .map(|d| return Violation::MissingHtmlElement { document: d.path.clone() })
        .collect();

    return Ok(violations);
}

/// Non-partial documents have a non-blank `<title>`.
pub fn titles(ctx: &Context<'_>) -> Vec<Violation> {
    return ctx
        .documents
        .iter()
        .filter(|d| return !ctx.config.is_partial(&d.path))
        .filter(|d| {
            let title: String = d.html.select(&ctx.selectors.title).flat_map(|t| return t.text()).collect();
            return title.trim().is_empty();
        })
        .map(|d| return Violation::MissingTitle { document: d.path.clone() })
        .collect();
}
