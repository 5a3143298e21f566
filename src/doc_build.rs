//! Documentation-build parameters and their command-line rendering.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Value of `GITHUB_ACTIONS`, `"false"` when unset.
pub fn github_actions_from_env() -> String {
    std::env::var("GITHUB_ACTIONS").unwrap_or_else(|_| "false".to_string())
}

/// Options for a documentation build.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize, Deserialize)]
pub struct DocBuildParams {
    /// Only build packages matching this filter (repeatable)
    #[arg(long = "package-filter")]
    #[serde(default)]
    pub package_filter: Vec<String>,

    /// Only build documentation, skip spellcheck
    #[arg(long)]
    #[serde(default)]
    pub docs_only: bool,

    /// Only run spellcheck
    #[arg(long)]
    #[serde(default)]
    pub spellcheck_only: bool,

    /// Run a single pass instead of repeating until stable
    #[arg(long)]
    #[serde(default)]
    pub one_pass_only: bool,

    /// Include commit history in the generated pages
    #[arg(long)]
    #[serde(default)]
    pub include_commits: bool,

    /// Short package names to build
    #[serde(default)]
    pub short_doc_packages: Vec<String>,

    /// Whether the build runs under GitHub Actions. Not rendered.
    #[arg(skip = github_actions_from_env())]
    #[serde(default = "github_actions_from_env")]
    pub github_actions: String,
}

impl Default for DocBuildParams {
    fn default() -> Self {
        Self {
            package_filter: Vec::new(),
            docs_only: false,
            spellcheck_only: false,
            one_pass_only: false,
            include_commits: false,
            short_doc_packages: Vec::new(),
            github_actions: github_actions_from_env(),
        }
    }
}

impl DocBuildParams {
    /// Arguments for the doc builder: flags in fixed order, then one
    /// `--package-filter` pair per filter, then short package names.
    pub fn args_doc_builder(&self) -> Vec<String> {
        let flags = [
            (self.docs_only, "--docs-only"),
            (self.spellcheck_only, "--spellcheck-only"),
            (self.one_pass_only, "--one-pass-only"),
            (self.include_commits, "--include-commits"),
        ];

        let mut args: Vec<String> = flags
            .into_iter()
            .filter(|(set, _)| *set)
            .map(|(_, flag)| flag.to_string())
            .collect();

        for filter in &self.package_filter {
            args.push("--package-filter".to_string());
            args.push(filter.clone());
        }
        args.extend(self.short_doc_packages.iter().cloned());
        args
    }
}
