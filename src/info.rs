use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checks::ALL_CHECKS;
use crate::config::{CONFIG_FILE, Config};
use crate::site::SiteTree;

/// Output the comprehensive sitecheck reference document.
pub fn run(json: bool) {
    let state = gather_state(Path::new("."));

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_found: bool,
    html_documents: Option<usize>,
    root: PathBuf,
}

fn gather_state(dir: &Path) -> CurrentState {
    let config_found = dir.join(CONFIG_FILE).exists();
    let root = Config::load(dir).map(|c| c.root(None)).unwrap_or_else(|_| Config::default().root(None));
    let html_documents = SiteTree::load(&root).ok().map(|t| t.html_files().len());

    CurrentState { config_found, html_documents, root }
}

/// Exit codes and their meaning, shared by both output formats.
const EXIT_CODES: [(u8, &str); 3] = [
    (0, "All checks passed"),
    (1, "At least one check failed"),
    (2, "Setup or runtime error (missing/empty build output, unreadable file, bad config)"),
];

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_checks();
    print_markdown_config();
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# sitecheck {version}

Validate static site build output: required pages exist, internal links and
assets resolve, script tags and inline scripts look sane, pages have titles.

## Workflow

    sitecheck check                       Run every check against the build output
    sitecheck check --only internal-links Run selected checks
    sitecheck check --format json         Machine-readable report
    sitecheck resolve <page.html>         Show every reference in a page and its outcome
    sitecheck resolve <page.html> <href>  Show the candidate paths tried for one target
    sitecheck watch                       Re-check whenever the build output changes

## Link Resolution

Fragments and queries are stripped, relative targets are joined onto the
page's directory, then these candidates are tried in order:

    <path>
    <path>/index.html
    <path without trailing slash>/index.html
    <path without trailing slash>
    <path>.html

"
    );
}

fn print_markdown_checks() {
    println!("## Checks\n");
    println!("| Name | Meaning |");
    println!("|------|---------|");
    for kind in ALL_CHECKS {
        println!("| {} | {} |", kind.name(), kind.description());
    }
    println!();
}

fn print_markdown_config() {
    print!(
        "\
## Configuration ({CONFIG_FILE})

    root = \"public\"                # build output root (--root overrides)
    include = [\"blog/\"]            # only check these documents
    exclude = [\"drafts/\"]          # skip these documents
    partial_marker = \"partial\"     # documents exempt from title/structure checks
    ignore = [\"/admin/\"]           # link targets never resolved
    error_patterns = [\"alert\\\\(\"]  # extra inline-script error signatures

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:     {CONFIG_FILE} (found)");
    } else {
        println!("Config:     {CONFIG_FILE} (not found)");
    }

    let root = state.root.display();
    match state.html_documents {
        Some(n) => println!("Root:       {root} ({n} HTML documents)"),
        None => println!("Root:       {root} (missing or empty)"),
    }
}

fn print_markdown_exit_codes() {
    println!("## Exit Codes\n");
    println!("| Code | Meaning |");
    println!("|------|---------|");
    for (code, meaning) in EXIT_CODES {
        println!("| {code}    | {meaning} |");
    }
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    version: String,
    checks: Vec<CheckInfo>,
    exit_codes: Vec<ExitCodeInfo>,
    current_state: StateJson,
}

#[derive(Serialize)]
struct CheckInfo {
    description: String,
    name: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    html_documents: Option<usize>,
    root: String,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: ALL_CHECKS
            .iter()
            .map(|kind| CheckInfo {
                description: kind.description().to_string(),
                name: kind.name().to_string(),
            })
            .collect(),
        exit_codes: EXIT_CODES
            .iter()
            .map(|(code, meaning)| ExitCodeInfo { code: *code, meaning: (*meaning).to_string() })
            .collect(),
        current_state: StateJson {
            config_found: state.config_found,
            html_documents: state.html_documents,
            root: state.root.display().to_string(),
        },
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
