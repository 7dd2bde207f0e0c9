use std::path::Path;
use std::process::{Command, Output};

fn sitecheck_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sitecheck"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("SITECHECK_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn clean_build_passes_every_check() {
    let check = sitecheck_cmd("good").arg("check").output().unwrap();
    assert!(
        check.status.success(),
        "check failed:\n{}\n{}",
        stdout(&check),
        stderr(&check)
    );

    let out = stdout(&check);
    assert!(out.contains("PASS  internal-links"), "{out}");
    assert!(out.contains("9 passed, 0 failed"), "{out}");
}

#[test]
fn broken_build_reports_every_violation_and_exits_one() {
    let check = sitecheck_cmd("broken").arg("check").output().unwrap();
    assert_eq!(check.status.code(), Some(1), "{}", stderr(&check));

    let out = stdout(&check);
    assert!(out.contains("FAIL  not-found-page (1)"), "{out}");
    assert!(out.contains("FAIL  internal-links (2)"), "{out}");
    assert!(out.contains("index.html: /missing-page (resolved to /missing-page)"), "{out}");
    assert!(out.contains("index.html: /js/missing.js (resolved to /js/missing.js)"), "{out}");
    assert!(out.contains("FAIL  script-src (1)"), "{out}");
    assert!(out.contains("index.html: src=\"\""), "{out}");
    assert!(out.contains("FAIL  local-scripts (1)"), "{out}");
    assert!(out.contains("FAIL  inline-scripts (1)"), "{out}");
    assert!(out.contains("FAIL  structure (1)"), "{out}");
    assert!(out.contains("blog/index.html: missing <html> tag"), "{out}");
    assert!(out.contains("FAIL  titles (1)"), "{out}");
    assert!(out.contains("PASS  index-page"), "{out}");
    assert!(out.contains("2 passed, 7 failed"), "{out}");
}

#[test]
fn json_report_lists_broken_links() {
    let check = sitecheck_cmd("broken")
        .args(["check", "--format", "json", "--only", "internal-links"])
        .output()
        .unwrap();
    assert_eq!(check.status.code(), Some(1), "{}", stderr(&check));

    let report: serde_json::Value = serde_json::from_slice(&check.stdout).unwrap();
    let checks = report["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0]["check"], "internal-links");

    let normalized: Vec<&str> = checks[0]["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["normalized"].as_str().unwrap())
        .collect();
    assert_eq!(normalized, ["/missing-page", "/js/missing.js"]);
}

#[test]
fn only_runs_the_selected_checks() {
    let check = sitecheck_cmd("broken")
        .args(["check", "--only", "index-page", "--only", "has-links"])
        .output()
        .unwrap();
    assert!(check.status.success(), "{}", stdout(&check));
    assert!(stdout(&check).contains("2 passed, 0 failed"));
}

#[test]
fn missing_build_output_is_fatal() {
    let check = sitecheck_cmd("good")
        .args(["--root", "does-not-exist", "check"])
        .output()
        .unwrap();
    assert_eq!(check.status.code(), Some(2));
    assert!(stderr(&check).contains("Build Output Not Found"), "{}", stderr(&check));
    assert!(stdout(&check).is_empty(), "no check may run: {}", stdout(&check));
}

#[test]
fn build_output_without_html_is_fatal() {
    let check = sitecheck_cmd("empty").arg("check").output().unwrap();
    assert_eq!(check.status.code(), Some(2));
    assert!(stderr(&check).contains("Empty Build Output"), "{}", stderr(&check));
}

#[test]
fn config_sets_root_exclusions_and_ignores() {
    let check = sitecheck_cmd("configured").arg("check").output().unwrap();
    assert!(
        check.status.success(),
        "check failed:\n{}\n{}",
        stdout(&check),
        stderr(&check)
    );
    assert!(stdout(&check).contains("(2 documents in site)"), "{}", stdout(&check));
}

#[test]
fn resolve_shows_candidates_for_one_target() {
    let resolve = sitecheck_cmd("good")
        .args(["resolve", "blog/post/index.html", "../../about"])
        .output()
        .unwrap();
    assert!(resolve.status.success(), "{}", stderr(&resolve));

    let out = stdout(&resolve);
    assert!(out.contains("../../about -> /about"), "{out}");
    assert!(out.contains("/about/index.html"), "{out}");
    assert!(out.contains("OK "), "{out}");
}

#[test]
fn resolve_lists_references_of_a_document() {
    let resolve = sitecheck_cmd("broken")
        .args(["resolve", "index.html"])
        .output()
        .unwrap();
    assert!(resolve.status.success(), "{}", stderr(&resolve));

    let out = stdout(&resolve);
    assert!(out.contains("BROKEN    a[href]  /missing-page -> /missing-page"), "{out}");
    assert!(out.contains("OK        a[href]  /blog/"), "{out}");
}

#[test]
fn resolve_rejects_unknown_documents() {
    let resolve = sitecheck_cmd("good")
        .args(["resolve", "nope.html"])
        .output()
        .unwrap();
    assert_eq!(resolve.status.code(), Some(2));
    assert!(stderr(&resolve).contains("Unknown Document"));

    let single = sitecheck_cmd("good")
        .args(["resolve", "nope.html", "/about/"])
        .output()
        .unwrap();
    assert_eq!(single.status.code(), Some(2));
    assert!(stderr(&single).contains("Unknown Document"), "{}", stderr(&single));
    assert!(stdout(&single).is_empty(), "{}", stdout(&single));
}

#[test]
fn resolve_never_probes_external_targets() {
    let resolve = sitecheck_cmd("good")
        .args(["resolve", "index.html", "http://example.com/x"])
        .output()
        .unwrap();
    assert!(resolve.status.success(), "{}", stderr(&resolve));

    let out = stdout(&resolve);
    assert_eq!(out.trim_end(), "EXTERNAL  a[href]  http://example.com/x");
    assert!(!out.contains(" -> "), "{out}");
}

#[test]
fn info_json_describes_checks() {
    let info = sitecheck_cmd("good").args(["info", "--json"]).output().unwrap();
    assert!(info.status.success());

    let value: serde_json::Value = serde_json::from_slice(&info.stdout).unwrap();
    assert_eq!(value["checks"].as_array().unwrap().len(), 9);
    assert_eq!(value["current_state"]["html_documents"], 5);
}
