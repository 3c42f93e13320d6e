//! Branch-name lookup and `<branch_name>/` substitution in replace templates.

use std::path::PathBuf;

/// Placeholder that rule files use to template per-branch links.
pub const BRANCH_TOKEN: &str = "<branch_name>/";

/// Supplies the current version-control branch name, if one can be found.
/// Resolved once per build at build begin.
pub trait BranchProvider {
    /// The current branch, or `None` when it cannot be determined.
    fn current_branch(&self) -> Option<String>;
}

/// A branch name fixed up front: `--branch` on the CLI, or tests.
#[derive(Debug, Clone, Default)]
pub struct FixedBranch(
    /// The branch name to report, if any.
    pub Option<String>,
);

/// Reads the checked-out branch of the git repository containing `root`.
#[derive(Debug, Clone)]
pub struct GitBranch {
    /// Directory to start repository discovery from.
    root: PathBuf,
}

impl BranchProvider for FixedBranch {
    fn current_branch(&self) -> Option<String> {
        return self.0.clone();
    }
}

impl BranchProvider for GitBranch {
    /// Detached HEAD, unborn branches and "not a repository" all yield `None`.
    fn current_branch(&self) -> Option<String> {
        let repo = match git2::Repository::discover(&self.root) {
            Ok(repo) => repo,
            Err(e) => {
                tracing::debug!(target: crate::LOG_TAG, "no git repository at {}: {e}", self.root.display());
                return None;
            },
        };
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) => {
                tracing::debug!(target: crate::LOG_TAG, "git HEAD unavailable: {e}");
                return None;
            },
        };
        if !head.is_branch() {
            return None;
        }
        return head.shorthand().map(str::to_owned);
    }
}

impl GitBranch {
    /// Discover the repository from `root` upwards.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        return Self { root: root.into() };
    }
}

/// Replace every `<branch_name>/` in `template` with `"<branch>/"`.
/// Without a branch the token is dropped entirely, separator included.
pub fn substitute_branch_token(template: &str, branch: Option<&str>) -> String {
    let Some(branch) = branch else {
        return template.replace(BRANCH_TOKEN, "");
    };
    return template.replace(BRANCH_TOKEN, &format!("{branch}/"));
}
