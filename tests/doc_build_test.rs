//! Tests for doc-build argument rendering.

use std::sync::Mutex;

use clap::Parser;
use mockexec::doc_build::DocBuildParams;

// GITHUB_ACTIONS is process-global.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn params() -> DocBuildParams {
    let _guard = ENV_LOCK.lock().unwrap();
    DocBuildParams::default()
}

#[test]
fn github_actions_defaults_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();

    unsafe { std::env::remove_var("GITHUB_ACTIONS") };
    assert_eq!(DocBuildParams::default().github_actions, "false");
    let parsed: DocBuildParams = serde_json::from_str("{}").unwrap();
    assert_eq!(parsed.github_actions, "false");

    unsafe { std::env::set_var("GITHUB_ACTIONS", "true") };
    let p = DocBuildParams::default();
    unsafe { std::env::remove_var("GITHUB_ACTIONS") };

    assert_eq!(p.github_actions, "true");
    assert!(p.args_doc_builder().is_empty());
}

#[test]
fn docs_only_with_filters_and_short_packages() {
    let p = DocBuildParams {
        docs_only: true,
        spellcheck_only: false,
        package_filter: vec!["a".to_string(), "b".to_string()],
        short_doc_packages: vec!["x".to_string()],
        ..params()
    };

    assert_eq!(
        p.args_doc_builder(),
        vec!["--docs-only", "--package-filter", "a", "--package-filter", "b", "x"]
    );
}

#[test]
fn flags_keep_fixed_order() {
    let p = DocBuildParams {
        include_commits: true,
        one_pass_only: true,
        spellcheck_only: true,
        docs_only: true,
        ..params()
    };

    assert_eq!(
        p.args_doc_builder(),
        vec![
            "--docs-only",
            "--spellcheck-only",
            "--one-pass-only",
            "--include-commits"
        ]
    );
}

#[test]
fn defaults_render_nothing() {
    assert!(params().args_doc_builder().is_empty());
}

#[test]
fn short_packages_go_last() {
    let p = DocBuildParams {
        short_doc_packages: vec!["amazon".to_string(), "google".to_string()],
        package_filter: vec!["apache-airflow".to_string()],
        ..params()
    };

    assert_eq!(
        p.args_doc_builder(),
        vec!["--package-filter", "apache-airflow", "amazon", "google"]
    );
}

#[derive(Parser)]
struct Wrapper {
    #[command(flatten)]
    params: DocBuildParams,
}

#[test]
fn parses_from_command_line() {
    let _guard = ENV_LOCK.lock().unwrap();
    let w = Wrapper::parse_from([
        "docs",
        "--spellcheck-only",
        "--package-filter",
        "p1",
        "--package-filter",
        "p2",
        "short1",
    ]);

    assert!(w.params.spellcheck_only);
    assert!(!w.params.docs_only);
    assert_eq!(w.params.package_filter, vec!["p1", "p2"]);
    assert_eq!(
        w.params.args_doc_builder(),
        vec![
            "--spellcheck-only",
            "--package-filter",
            "p1",
            "--package-filter",
            "p2",
            "short1"
        ]
    );
}
