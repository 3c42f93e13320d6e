/// Core domain types: mapping rules and the host's source-location records.
use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier of a file entity within a project.
pub type FileId = u64;

/// A documentation-generator object representing one source file as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntity {
    /// Generator fields this crate does not read, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Path of the file as the generator saw it.
    pub file_name: String,
    /// Precomputed navigable link for the whole file, if the generator made one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One pattern/replace rule. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct MappingRule {
    /// Rewrite the display title (`fileName`) instead of the link (`url`).
    pub only_title: bool,
    /// Matching criterion.
    pub pattern: Regex,
    /// Replacement template, branch token already substituted.
    /// `$1`/`${name}` refer to capture groups of `pattern`.
    pub replace: String,
}

/// The resolved symbol collection handed over by the generator.
/// `BTreeMap` keeps serialized output stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Generator fields this crate does not read, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// File entities keyed by id. Several source references may share one.
    #[serde(default)]
    pub files: BTreeMap<FileId, FileEntity>,
    /// Every documented symbol keyed by its identifier.
    #[serde(default)]
    pub reflections: BTreeMap<String, Reflection>,
}

/// A documented program entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    /// Generator fields this crate does not read, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Symbol name, carried through untouched.
    #[serde(default)]
    pub name: String,
    /// Declaration sites. Entries may be null in generator output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Option<SourceReference>>>,
}

/// Ordered rule list. An empty set is a valid no-op pass; an absent set
/// (`Option::None` at the call sites) means the pass is disabled.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Rules in declaration order.
    rules: Vec<MappingRule>,
}

/// Links a symbol to the file and line where it is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    /// Generator fields this crate does not read, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Linked file entity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileId>,
    /// Display path.
    pub file_name: String,
    /// One-based declaration line.
    #[serde(default)]
    pub line: u32,
    /// Computed navigable link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RuleSet {
    /// Whether there are no rules at all.
    pub fn is_empty(&self) -> bool {
        return self.rules.is_empty();
    }

    /// Rules in the order they are tried.
    pub fn iter(&self) -> std::slice::Iter<'_, MappingRule> {
        return self.rules.iter();
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        return self.rules.len();
    }

    /// Build a rule set from rules in declaration order.
    pub const fn new(rules: Vec<MappingRule>) -> Self {
        return Self { rules };
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type IntoIter = std::slice::Iter<'a, MappingRule>;
    type Item = &'a MappingRule;

    fn into_iter(self) -> Self::IntoIter {
        return self.rules.iter();
    }
}
