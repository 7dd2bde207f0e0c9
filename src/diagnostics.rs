use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::MissingBuildOutput { path } => render_missing_build_output(&path.display().to_string()),
        Error::EmptyBuildOutput { path } => render_empty_build_output(&path.display().to_string()),
        Error::InvalidPattern { pattern, source } => render_invalid_pattern(pattern, &source.to_string()),
        Error::UnknownDocument { path } => render_unknown_document(path),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::ReadFailed { path, source } => format!("\
# Error: Read Failed

Could not read `{}`: {source}
", path.display()),

        Error::InvalidSelector { selector, reason } => format!("\
# Error: Invalid Selector

`{selector}`: {reason}
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON Serialization

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid Config

{e}

## Fix

Correct `{CONFIG_FILE}`, or run `sitecheck info` for the accepted keys.
"),
        Error::Walk(e) => format!("\
# Error: Directory Walk

{e}
"),
        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_empty_build_output(path: &str) -> String {
    format!(
        "\
# Error: Empty Build Output

`{path}` contains no HTML files.

## Fix

Check that the site generator wrote its output to `{path}`, or point
sitecheck at the right directory:

    sitecheck --root <dir> check
"
    )
}

fn render_invalid_pattern(pattern: &str, reason: &str) -> String {
    format!(
        "\
# Error: Invalid Pattern

`{pattern}` is not a valid regular expression:

{reason}

## Fix

Correct the entry in `error_patterns` in `{CONFIG_FILE}`.
"
    )
}

fn render_missing_build_output(path: &str) -> String {
    format!(
        "\
# Error: Build Output Not Found

`{path}` does not exist.

## Fix

Build the site first (for example with `hugo`), then re-run:

    sitecheck check

Or point sitecheck at the build output:

    sitecheck --root <dir> check
"
    )
}

fn render_unknown_document(path: &str) -> String {
    format!(
        "\
# Error: Unknown Document

`{path}` is not an HTML document in the build output.

## Fix

Give the path relative to the build output root, e.g. `blog/index.html`.
"
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_build_output_suggests_building() {
        let md = render_error(&Error::MissingBuildOutput { path: PathBuf::from("public") });
        assert!(md.starts_with("# Error: Build Output Not Found"));
        assert!(md.contains("`public` does not exist."));
        assert!(md.contains("sitecheck --root <dir> check"));
    }

    #[test]
    fn empty_build_output_names_the_directory() {
        let md = render_error(&Error::EmptyBuildOutput { path: PathBuf::from("dist") });
        assert!(md.contains("`dist` contains no HTML files."));
    }

    #[test]
    fn other_errors_fall_back_to_generic_block() {
        let md = render_error(&Error::WatchFailed { reason: "inotify limit".to_string() });
        assert!(md.starts_with("# Error: Watch Failed"));
        assert!(md.contains("inotify limit"));
    }
}
