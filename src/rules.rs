//! Rule set loading: prefix shortcut or JSON rule file, validated all-or-nothing.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::branch::substitute_branch_token;
use crate::config::RewriteOptions;
use crate::error::Error;
use crate::types::{MappingRule, RuleSet};

/// One element of the rule file, after the shape check.
#[derive(Deserialize)]
struct RawRule {
    /// Display-title mode switch; `null` counts as absent.
    #[serde(default, rename = "onlyTitle")]
    only_title: Option<bool>,
    /// Regex source without enclosing slashes.
    pattern: String,
    /// Replacement template, may contain `<branch_name>/`.
    replace: String,
}

/// Build the rule set described by `options`.
///
/// Returns `Ok(None)` when neither option is set: the rewrite pass stays off.
/// The map file path is resolved against `cwd`.
///
/// # Errors
///
/// Returns `Error::ConfigConflict` if both options are set, or any error from
/// [`load_rule_file`].
pub fn load_rule_set(
    options: &RewriteOptions,
    cwd: &Path,
    branch: Option<&str>,
) -> Result<Option<RuleSet>, Error> {
    return match (options.map_file.as_deref(), options.url_prefix.as_deref()) {
        (None, None) => Ok(None),
        (Some(_), Some(_)) => Err(Error::ConfigConflict),
        (None, Some(prefix)) => Ok(Some(RuleSet::new(vec![prefix_rule(prefix)]))),
        (Some(map_file), None) => load_rule_file(&cwd.join(map_file), branch).map(Some),
    };
}

/// Read and validate a JSON rule file.
///
/// # Errors
///
/// Returns `Error::RuleFileRead` if the file can't be read,
/// `Error::RuleFileSyntax` if it isn't JSON,
/// `Error::JsonShape` if the root isn't an array or an element has the wrong shape,
/// or `Error::PatternCompile` if a pattern isn't a valid regex.
pub fn load_rule_file(path: &Path, branch: Option<&str>) -> Result<RuleSet, Error> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        return Error::RuleFileRead { path: path.to_path_buf(), source };
    })?;
    let json: serde_json::Value = serde_json::from_str(&content).map_err(|source| {
        return Error::RuleFileSyntax { path: path.to_path_buf(), source };
    })?;
    return parse_rules(json, branch);
}

/// Validate an already-parsed rule document. Stops at the first bad element.
///
/// # Errors
///
/// Returns `Error::JsonShape` or `Error::PatternCompile`.
pub fn parse_rules(json: serde_json::Value, branch: Option<&str>) -> Result<RuleSet, Error> {
    let serde_json::Value::Array(elements) = json else {
        return Err(Error::JsonShape {
            reason: "has to have Array as root element".to_string(),
        });
    };

    let mut rules = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        let raw: RawRule = serde_json::from_value(element).map_err(|e| {
            return Error::JsonShape {
                reason: format!("element {index} is invalid ({e})"),
            };
        })?;
        let pattern = Regex::new(&raw.pattern).map_err(|source| {
            return Error::PatternCompile { pattern: raw.pattern.clone(), source };
        })?;
        rules.push(MappingRule {
            only_title: raw.only_title.unwrap_or(false),
            pattern,
            replace: brace_numbered_groups(&substitute_branch_token(&raw.replace, branch)),
        });
    }

    return Ok(RuleSet::new(rules));
}

/// Rewrite `$N` directly followed by a letter or `_` as `${N}`, so `$1_repo`
/// means group 1 then `_repo` instead of a group named `1_repo`. `$$` is kept.
///
/// # Panics
///
/// Panics if the hardcoded group-reference regex is invalid (compile-time invariant).
#[allow(clippy::expect_used, reason = "hardcoded pattern always compiles")]
fn brace_numbered_groups(replace: &str) -> String {
    let group_ref = Regex::new(r"\$\$|\$([0-9]+)([A-Za-z_])").expect("valid regex");
    return group_ref
        .replace_all(replace, |caps: &regex::Captures<'_>| {
            return match (caps.get(1), caps.get(2)) {
                (Some(group), Some(next)) => format!("${{{}}}{}", group.as_str(), next.as_str()),
                _ => "$$".to_string(),
            };
        })
        .into_owned();
}

/// The shortcut rule: match at the start of every path and prepend `prefix`
/// to the link. `$` is escaped so the prefix is inserted literally.
///
/// # Panics
///
/// Panics if the hardcoded anchor regex is invalid (compile-time invariant).
#[allow(clippy::expect_used, reason = "hardcoded pattern always compiles")]
fn prefix_rule(prefix: &str) -> MappingRule {
    return MappingRule {
        only_title: false,
        pattern: Regex::new("^").expect("valid regex"),
        replace: prefix.replace('$', "$$"),
    };
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn opts(map_file: Option<&str>, url_prefix: Option<&str>) -> RewriteOptions {
        RewriteOptions {
            map_file: map_file.map(str::to_string),
            url_prefix: url_prefix.map(str::to_string),
        }
    }

    #[test]
    fn no_options_disables_rewriting() {
        let loaded = load_rule_set(&opts(None, None), Path::new("."), None).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn both_options_conflict() {
        let err = load_rule_set(&opts(Some("map.json"), Some("https://x/")), Path::new("."), None)
            .unwrap_err();
        assert!(matches!(err, Error::ConfigConflict));
        assert!(err.to_string().contains("use either"));
    }

    #[test]
    fn prefix_becomes_single_link_rule() {
        let rules = load_rule_set(&opts(None, Some("https://example.com/src/")), Path::new("."), None)
            .unwrap()
            .unwrap();
        assert_eq!(rules.len(), 1);
        let rule = rules.iter().next().unwrap();
        assert!(!rule.only_title);
        assert_eq!(rule.pattern.replace("lib/foo.ts", rule.replace.as_str()), "https://example.com/src/lib/foo.ts");
    }

    #[test]
    fn prefix_dollar_signs_are_literal() {
        let rules = load_rule_set(&opts(None, Some("https://x/$1/")), Path::new("."), None)
            .unwrap()
            .unwrap();
        let rule = rules.iter().next().unwrap();
        assert_eq!(rule.pattern.replace("a.ts", rule.replace.as_str()), "https://x/$1/a.ts");
    }

    #[test]
    fn map_file_resolved_against_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("conf")).unwrap();
        std::fs::write(
            dir.path().join("conf/map.json"),
            r#"[{"pattern": "^src/", "replace": "https://host/<branch_name>/src/"},
                {"pattern": "^old/", "replace": "new/", "onlyTitle": true}]"#,
        )
        .unwrap();

        let rules = load_rule_set(&opts(Some("conf/map.json"), None), dir.path(), Some("main"))
            .unwrap()
            .unwrap();
        let collected: Vec<_> = rules.iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].replace, "https://host/main/src/");
        assert!(!collected[0].only_title);
        assert!(collected[1].only_title);
    }

    #[test]
    fn missing_map_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rule_set(&opts(Some("nope.json"), None), dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::RuleFileRead { .. }), "got {err:?}");
    }

    #[test]
    fn invalid_json_is_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, "[{").unwrap();
        let err = load_rule_file(&path, None).unwrap_err();
        assert!(matches!(err, Error::RuleFileSyntax { .. }), "got {err:?}");
    }

    #[test]
    fn object_root_is_shape_error() {
        let err = parse_rules(json!({"pattern": "a", "replace": "b"}), None).unwrap_err();
        assert!(matches!(err, Error::JsonShape { .. }), "got {err:?}");
        assert!(err.to_string().contains("Array as root element"));
    }

    #[test]
    fn element_missing_replace_is_shape_error() {
        let err = parse_rules(json!([{"pattern": "a", "replace": "b"}, {"pattern": "c"}]), None)
            .unwrap_err();
        let Error::JsonShape { reason } = &err else {
            panic!("expected JsonShape, got {err:?}");
        };
        assert!(reason.contains("element 1"), "reason: {reason}");
        assert!(err.to_string().contains("\"pattern\""));
    }

    #[test]
    fn non_string_pattern_is_shape_error() {
        let err = parse_rules(json!([{"pattern": 3, "replace": "b"}]), None).unwrap_err();
        assert!(matches!(err, Error::JsonShape { .. }), "got {err:?}");
    }

    #[test]
    fn non_object_element_is_shape_error() {
        let err = parse_rules(json!(["^src/"]), None).unwrap_err();
        assert!(matches!(err, Error::JsonShape { .. }), "got {err:?}");
    }

    #[test]
    fn bad_pattern_names_the_pattern() {
        let err = parse_rules(json!([{"pattern": "(unclosed", "replace": "x"}]), None).unwrap_err();
        let Error::PatternCompile { pattern, .. } = &err else {
            panic!("expected PatternCompile, got {err:?}");
        };
        assert_eq!(pattern, "(unclosed");
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn null_only_title_means_link_rule() {
        let rules = parse_rules(json!([{"pattern": "^", "replace": "x", "onlyTitle": null}]), None).unwrap();
        assert!(!rules.iter().next().unwrap().only_title);
    }

    #[test]
    fn numbered_group_before_word_character_keeps_its_suffix() {
        let rules = parse_rules(
            json!([{"pattern": r"^packages/(\w+)/", "replace": "https://h/$1_repo/"}]),
            None,
        )
        .unwrap();
        let rule = rules.iter().next().unwrap();
        assert_eq!(rule.replace, "https://h/${1}_repo/");
        assert_eq!(rule.pattern.replace("packages/core/a.ts", rule.replace.as_str()), "https://h/core_repo/a.ts");
    }

    #[test]
    fn escaped_dollars_and_named_groups_are_untouched() {
        assert_eq!(brace_numbered_groups("$$1a/${name}/$1/$2"), "$$1a/${name}/$1/$2");
    }

    #[test]
    fn empty_array_is_valid_empty_rule_set() {
        let rules = parse_rules(json!([]), None).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn branch_token_without_branch_is_dropped() {
        let rules = parse_rules(json!([{"pattern": "^", "replace": "https://h/<branch_name>/x/"}]), None)
            .unwrap();
        assert_eq!(rules.iter().next().unwrap().replace, "https://h/x/");
    }

    #[test]
    fn rules_keep_declaration_order() {
        let rules = parse_rules(
            json!([
                {"pattern": "a", "replace": "1"},
                {"pattern": "b", "replace": "2"},
                {"pattern": "c", "replace": "3"}
            ]),
            None,
        )
        .unwrap();
        let replaces: Vec<&str> = rules.iter().map(|r| r.replace.as_str()).collect();
        assert_eq!(replaces, ["1", "2", "3"]);
    }
}
