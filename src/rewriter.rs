//! Reference rewriting: apply the first effective rule to every source reference.

use crate::types::{MappingRule, Project, RuleSet, SourceReference};

/// What a rule did to one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The display title (`fileName`) was rewritten.
    Title,
    /// No rule changed anything.
    Unchanged,
    /// The navigable link (`url`) was rewritten.
    Url,
}

/// Counts of what a rewrite pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// References whose title was rewritten.
    pub titles: usize,
    /// References no rule changed.
    pub unchanged: usize,
    /// References whose link was rewritten.
    pub urls: usize,
}

/// Anything that can hand out every source reference it holds, mutably.
/// Lets the traversal be tested without a real generator project.
pub trait SourceCollection {
    /// Every non-null source reference of every symbol, in any order.
    fn source_sites(&mut self) -> impl Iterator<Item = SourceSite<'_>>;
}

/// One source reference plus the link of the file entity it points to.
#[derive(Debug)]
pub struct SourceSite<'a> {
    /// Resolved `url` of the linked file entity, if both exist.
    pub file_url: Option<&'a str>,
    /// The record to rewrite in place.
    pub reference: &'a mut SourceReference,
}

impl SourceCollection for Project {
    fn source_sites(&mut self) -> impl Iterator<Item = SourceSite<'_>> {
        let files = &self.files;
        return self
            .reflections
            .values_mut()
            .filter_map(|reflection| return reflection.sources.as_mut())
            .flatten()
            .filter_map(Option::as_mut)
            .map(move |reference| {
                let file_url = reference
                    .file
                    .and_then(|id| return files.get(&id))
                    .and_then(|file| return file.url.as_deref());
                return SourceSite { file_url, reference };
            });
    }
}

impl std::ops::AddAssign<Outcome> for RewriteSummary {
    fn add_assign(&mut self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Title => &mut self.titles,
            Outcome::Unchanged => &mut self.unchanged,
            Outcome::Url => &mut self.urls,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Apply `rules` to every source reference in `collection`.
pub fn rewrite_all<C: SourceCollection>(rules: &RuleSet, collection: &mut C) -> RewriteSummary {
    let mut summary = RewriteSummary::default();
    for mut site in collection.source_sites() {
        summary += rewrite_reference(rules, &mut site);
    }
    return summary;
}

/// Try rules in order until one changes the reference; later rules are not tried.
pub fn rewrite_reference(rules: &RuleSet, site: &mut SourceSite<'_>) -> Outcome {
    for rule in rules {
        let outcome = if rule.only_title {
            apply_title_rule(rule, site.reference)
        } else {
            apply_url_rule(rule, site.reference, site.file_url)
        };
        if outcome != Outcome::Unchanged {
            return outcome;
        }
    }
    return Outcome::Unchanged;
}

/// Rewrite `fileName` with the rule's first match.
fn apply_title_rule(rule: &MappingRule, reference: &mut SourceReference) -> Outcome {
    let renamed = rule.pattern.replace(&reference.file_name, rule.replace.as_str());
    if renamed == reference.file_name {
        return Outcome::Unchanged;
    }
    reference.file_name = renamed.into_owned();
    return Outcome::Title;
}

/// Rewrite `url`, starting from the current link or, failing that, `fileName`.
/// A resolved file-entity link always wins: the result is then
/// `<file url>#L<line>` whatever the rule's own replacement says.
fn apply_url_rule(rule: &MappingRule, reference: &mut SourceReference, file_url: Option<&str>) -> Outcome {
    let candidate = if let Some(file_url) = file_url {
        format!("{file_url}#L{}", reference.line)
    } else {
        let source = reference.url.as_deref().unwrap_or(&reference.file_name);
        let replaced = rule.pattern.replace(source, rule.replace.as_str());
        if replaced == source {
            return Outcome::Unchanged;
        }
        replaced.into_owned()
    };

    if reference.url.as_deref() == Some(candidate.as_str()) {
        return Outcome::Unchanged;
    }
    reference.url = Some(candidate);
    return Outcome::Url;
}
