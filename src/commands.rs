//! Core CLI commands for sitecheck: check, resolve, info.

use std::path::Path;
use std::process::ExitCode;

use crate::checks::{self, ALL_CHECKS, CheckKind, Context, ScriptPatterns};
use crate::config::Config;
use crate::error;
use crate::extract::{self, Selectors};
use crate::report::{Format, RunReport};
use crate::resolver::{self, Outcome};
use crate::site::{self, SiteTree};
use crate::types::{Reference, ReferenceKind, Scope};

/// Exit code when at least one check failed.
const EXIT_CHECK_FAILED: u8 = 1;

/// Snapshot the build output and run checks, printing the report.
///
/// Exit code: 0 when every check passes, 1 when any check fails.
///
/// # Errors
///
/// Returns setup errors: config loading, missing or empty build output,
/// unreadable documents, invalid patterns.
pub fn check(root_override: Option<&Path>, format: Format, only: &[CheckKind]) -> Result<ExitCode, error::Error> {
    let config = Config::load(Path::new("."))?;
    let root = config.root(root_override);
    let kinds = if only.is_empty() { ALL_CHECKS.as_slice() } else { only };

    let report = run_checks(&root, &config, kinds)?;
    print!("{}", report.render(format)?);

    if report.passed() {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::from(EXIT_CHECK_FAILED));
}

/// Output a comprehensive reference document for sitecheck.
pub fn info(json: bool) {
    return crate::info::run(json);
}

/// Print one reference with its scope and resolution outcome.
fn print_reference_outcome(tree: &SiteTree, reference: &Reference) {
    let kind = reference.kind;
    let target = &reference.target;
    if reference.scope() == Scope::External {
        println!("EXTERNAL  {kind}  {target}");
        return;
    }

    match resolver::resolve(tree, reference) {
        Outcome::Broken { normalized } => println!("BROKEN    {kind}  {target} -> {normalized}"),
        Outcome::Resolved { candidate, .. } => println!("OK        {kind}  {target} -> {candidate}"),
        Outcome::Skipped => println!("SKIPPED   {kind}  {target}"),
    }
    return;
}

/// List every reference in a document with its outcome, or resolve a single
/// target as if it appeared in that document and show each candidate probed.
///
/// # Errors
///
/// Returns setup errors, or `Error::UnknownDocument` if the document is not
/// part of the build output.
pub fn resolve(root_override: Option<&Path>, document: &str, target: Option<&str>) -> Result<(), error::Error> {
    let config = Config::load(Path::new("."))?;
    let root = config.root(root_override);
    let tree = SiteTree::load(&root)?;
    let source = tree.require_document(document)?;

    let Some(target) = target else {
        let selectors = Selectors::new()?;
        let parsed = site::read_document(&tree, source)?;
        for reference in extract::references(&parsed, &selectors) {
            print_reference_outcome(&tree, &reference);
        }
        return Ok(());
    };

    let reference = Reference {
        kind: ReferenceKind::Anchor,
        source: source.to_string(),
        target: target.to_string(),
    };
    if reference.scope() == Scope::External {
        print_reference_outcome(&tree, &reference);
        return Ok(());
    }

    let Some(normalized) = resolver::normalize(source, target) else {
        println!("SKIPPED   {target} (fragment or query only)");
        return Ok(());
    };

    println!("{target} -> {normalized}");
    for (rule, candidate) in resolver::candidates(&normalized) {
        let mark = if resolver::candidate_exists(&tree, &candidate) { "found" } else { "-" };
        println!("  {rule:<15} {candidate:<40} {mark}");
    }

    print_reference_outcome(&tree, &reference);
    return Ok(());
}

/// Snapshot `root`, parse the admitted documents, and run `kinds` in order.
///
/// # Errors
///
/// Returns setup errors from snapshotting, document loading, selector or
/// pattern compilation.
pub fn run_checks(root: &Path, config: &Config, kinds: &[CheckKind]) -> Result<RunReport, error::Error> {
    let tree = SiteTree::load(root)?;
    let documents = site::load_documents(&tree, config)?;
    let selectors = Selectors::new()?;
    let patterns = ScriptPatterns::new(&config.error_patterns)?;

    let ctx = Context {
        config,
        documents: &documents,
        patterns: &patterns,
        selectors: &selectors,
        tree: &tree,
    };

    let mut reports = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        reports.push(checks::run(kind, &ctx)?);
    }

    return Ok(RunReport {
        checks: reports,
        documents: documents.len(),
        root: root.display().to_string(),
    });
}
