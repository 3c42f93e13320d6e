//! Build lifecycle glue: load rules at build begin, rewrite at resolution end.

use std::path::Path;

use crate::branch::BranchProvider;
use crate::config::RewriteOptions;
use crate::rewriter::{RewriteSummary, SourceCollection, rewrite_all};
use crate::rules::load_rule_set;
use crate::types::RuleSet;
use crate::LOG_TAG;

/// A rewrite registered for the resolution-end signal of one build.
/// Holding one means a rule set was loaded; it is consumed by the pass,
/// so nothing outlives the build.
#[derive(Debug)]
pub struct PendingRewrite {
    /// The loaded rules, read-only from here on.
    rules: RuleSet,
}

/// Hooks a host generator calls on its two lifecycle signals.
#[derive(Debug, Clone)]
pub struct SourcefileUrlPlugin<B> {
    /// Asked for the branch name once per build.
    branch: B,
}

impl PendingRewrite {
    /// Resolution end: rewrite every source reference in the finished symbol set.
    pub fn on_resolve_end<C: SourceCollection>(self, collection: &mut C) -> RewriteSummary {
        let summary = rewrite_all(&self.rules, collection);
        tracing::debug!(
            target: LOG_TAG,
            titles = summary.titles,
            urls = summary.urls,
            unchanged = summary.unchanged,
            "source references rewritten"
        );
        return summary;
    }

    /// The rules this rewrite will apply.
    pub const fn rules(&self) -> &RuleSet {
        return &self.rules;
    }
}

impl<B: BranchProvider> SourcefileUrlPlugin<B> {
    /// Create a plugin that resolves the branch name through `branch`.
    pub const fn new(branch: B) -> Self {
        return Self { branch };
    }

    /// Build begin: resolve the branch, load the rule set, and register the
    /// rewrite. Configuration errors are logged and disable the rewrite; they
    /// never fail the build.
    pub fn on_build_begin(&self, options: &RewriteOptions, cwd: &Path) -> Option<PendingRewrite> {
        let branch = self.branch.current_branch();
        if branch.is_none() {
            tracing::info!(target: LOG_TAG, "current branch name unavailable, <branch_name>/ will be dropped");
        }

        return match load_rule_set(options, cwd, branch.as_deref()) {
            Ok(Some(rules)) => {
                tracing::debug!(target: LOG_TAG, rules = rules.len(), "source link rewrite registered");
                Some(PendingRewrite { rules })
            },
            Ok(None) => None,
            Err(e) => {
                tracing::error!(target: LOG_TAG, "{LOG_TAG}: {e}");
                None
            },
        };
    }
}
