//! Rewrite the source-file references of a documentation build so they point
//! at a hosted, browsable location instead of a local path.
//!
//! A host generator calls [`SourcefileUrlPlugin::on_build_begin`] when a build
//! starts and, if that returned a [`PendingRewrite`], calls
//! [`PendingRewrite::on_resolve_end`] once every symbol is resolved.

pub mod branch;
pub mod config;
pub mod error;
pub mod plugin;
pub mod rewriter;
pub mod rules;
pub mod types;

pub use crate::branch::{BranchProvider, FixedBranch, GitBranch};
pub use crate::config::RewriteOptions;
pub use crate::error::Error;
pub use crate::plugin::{PendingRewrite, SourcefileUrlPlugin};
pub use crate::rewriter::{RewriteSummary, SourceCollection, SourceSite};
pub use crate::types::{FileEntity, MappingRule, Project, Reflection, RuleSet, SourceReference};

/// Tag that prefixes every diagnostic this crate logs.
pub const LOG_TAG: &str = "sourcefile-url";
