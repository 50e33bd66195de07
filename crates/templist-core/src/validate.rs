//! Structural checks over a parsed catalog.
//!
//! Errors:
//! - a reference (an entry's name or author, or any `[label]` used in a
//!   description or in prose) has no definition
//! - a definition is empty or not a valid URL with an allowed scheme
//! - two entries share a name
//! - a list item does not follow the entry grammar
//!
//! Warnings cover things markdown tolerates but that are almost always
//! mistakes: duplicate definitions, unused definitions, empty descriptions,
//! and a missing title. Linked repositories are never fetched.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use url::Url;

use crate::catalog::{normalize_label, Catalog};
use crate::config::ValidationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    UndefinedReference { label: String },
    EmptyUrl { label: String },
    InvalidUrl { label: String, url: String, reason: String },
    DuplicateName { name: String, first_line: usize },
    DuplicateDefinition { label: String, first_line: usize },
    UnusedDefinition { label: String },
    MalformedEntry { text: String },
    EmptyDescription { name: String },
    MissingTitle,
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateDefinition { .. }
            | Self::UnusedDefinition { .. }
            | Self::EmptyDescription { .. }
            | Self::MissingTitle => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedReference { label } => write!(f, "[{label}] is used but never defined"),
            Self::EmptyUrl { label } => write!(f, "[{label}] is defined with an empty URL"),
            Self::InvalidUrl { label, url, reason } => {
                write!(f, "[{label}] has an invalid URL `{url}`: {reason}")
            }
            Self::DuplicateName { name, first_line } => {
                write!(f, "template [{name}] is already listed on line {first_line}")
            }
            Self::DuplicateDefinition { label, first_line } => write!(
                f,
                "[{label}] is already defined on line {first_line}; this definition is ignored"
            ),
            Self::UnusedDefinition { label } => write!(f, "[{label}] is defined but never used"),
            Self::MalformedEntry { text } => write!(
                f,
                "`{text}` does not match `* [name]: description, [author]`"
            ),
            Self::EmptyDescription { name } => write!(f, "template [{name}] has no description"),
            Self::MissingTitle => write!(f, "document has no heading"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// 1-based source line; 0 when the issue concerns the whole document.
    pub line: usize,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    fn new(line: usize, kind: IssueKind) -> Self {
        Self {
            severity: kind.severity(),
            line,
            kind,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: {}", self.line, self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// True when no error-severity issue was found.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

/// Check that `raw` parses as an absolute URL with one of `allowed_schemes`.
pub fn check_url(raw: &str, allowed_schemes: &[String]) -> std::result::Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !allowed_schemes.iter().any(|s| s.eq_ignore_ascii_case(url.scheme())) {
        return Err(format!(
            "scheme `{}` is not allowed (allowed: {})",
            url.scheme(),
            allowed_schemes.join(", ")
        ));
    }
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err("URL has no host".into());
    }
    Ok(url)
}

/// Run every check and return the issues ordered by line.
pub fn validate(catalog: &Catalog, config: &ValidationConfig) -> ValidationReport {
    let mut issues = Vec::new();

    if catalog.title.is_empty() {
        issues.push(Issue::new(0, IssueKind::MissingTitle));
    }

    for bad in &catalog.malformed {
        issues.push(Issue::new(
            bad.line,
            IssueKind::MalformedEntry {
                text: bad.text.clone(),
            },
        ));
    }

    // First definition of each label wins; later ones are flagged.
    let mut defined: HashMap<String, usize> = HashMap::new();
    for link in &catalog.links {
        let key = normalize_label(&link.label);
        if let Some(&first_line) = defined.get(&key) {
            issues.push(Issue::new(
                link.line,
                IssueKind::DuplicateDefinition {
                    label: link.label.clone(),
                    first_line,
                },
            ));
            continue;
        }
        defined.insert(key, link.line);

        let url = link.url.trim();
        if url.is_empty() {
            issues.push(Issue::new(
                link.line,
                IssueKind::EmptyUrl {
                    label: link.label.clone(),
                },
            ));
        } else if let Err(reason) = check_url(url, &config.allowed_schemes) {
            issues.push(Issue::new(
                link.line,
                IssueKind::InvalidUrl {
                    label: link.label.clone(),
                    url: url.to_string(),
                    reason,
                },
            ));
        }
    }

    let mut names: HashMap<String, usize> = HashMap::new();
    for entry in &catalog.entries {
        let key = normalize_label(&entry.name);
        if let Some(&first_line) = names.get(&key) {
            issues.push(Issue::new(
                entry.line,
                IssueKind::DuplicateName {
                    name: entry.name.clone(),
                    first_line,
                },
            ));
        } else {
            names.insert(key, entry.line);
        }

        for label in [&entry.name, &entry.author] {
            if !defined.contains_key(&normalize_label(label)) {
                issues.push(Issue::new(
                    entry.line,
                    IssueKind::UndefinedReference {
                        label: label.clone(),
                    },
                ));
            }
        }

        if entry.description.trim().is_empty() {
            issues.push(Issue::new(
                entry.line,
                IssueKind::EmptyDescription {
                    name: entry.name.clone(),
                },
            ));
        }
    }

    // Entry names and authors were checked above with the entry.
    let mut checked: HashSet<(usize, String)> = catalog
        .entries
        .iter()
        .flat_map(|e| {
            [
                (e.line, normalize_label(&e.name)),
                (e.line, normalize_label(&e.author)),
            ]
        })
        .collect();
    for reference in &catalog.references {
        let key = normalize_label(&reference.label);
        if defined.contains_key(&key) || !checked.insert((reference.line, key)) {
            continue;
        }
        issues.push(Issue::new(
            reference.line,
            IssueKind::UndefinedReference {
                label: reference.label.clone(),
            },
        ));
    }

    if config.warn_unused {
        let mut reported = Vec::new();
        for link in &catalog.links {
            let key = normalize_label(&link.label);
            if !catalog.is_referenced(&key) && !reported.contains(&key) {
                issues.push(Issue::new(
                    link.line,
                    IssueKind::UnusedDefinition {
                        label: link.label.clone(),
                    },
                ));
                reported.push(key);
            }
        }
    }

    issues.sort_by_key(|i| i.line);
    tracing::debug!(issues = issues.len(), "validated catalog");
    ValidationReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(source: &str) -> ValidationReport {
        validate(&parse(source), &ValidationConfig::default())
    }

    fn kinds(report: &ValidationReport) -> Vec<&IssueKind> {
        report.issues.iter().map(|i| &i.kind).collect()
    }

    #[test]
    fn test_valid_document() {
        let report = check(
            "# T\n\n* [PyO3]: Write a Python Library in Rust, [DD5HT]\n\n\
             [PyO3]: https://github.com/DD5HT/pyo3-template\n\
             [DD5HT]: https://github.com/DD5HT\n",
        );
        assert!(report.is_ok());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_undefined_author() {
        let report = check("# T\n\n* [PyO3]: Python, [DD5HT]\n\n[PyO3]: https://x.example\n");
        assert!(!report.is_ok());
        assert_eq!(
            kinds(&report),
            vec![&IssueKind::UndefinedReference {
                label: "DD5HT".into()
            }]
        );
        assert_eq!(report.issues[0].line, 3);
    }

    #[test]
    fn test_labels_match_case_insensitively() {
        let report = check("# T\n\n* [PyO3]: Python, [dd5ht]\n\n[pyo3]: https://x.example\n[DD5HT]: https://y.example\n");
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_empty_and_invalid_urls() {
        let report = check("# T\n\n* [a]: d, [b]\n\n[a]:\n[b]: not a url\n");
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0].kind, IssueKind::EmptyUrl { .. }));
        assert!(matches!(errors[1].kind, IssueKind::InvalidUrl { .. }));
    }

    #[test]
    fn test_disallowed_scheme() {
        let report = check("# T\n\n* [a]: d, [b]\n\n[a]: ftp://x.example/a\n[b]: https://x.example\n");
        assert!(matches!(
            &report.issues[0].kind,
            IssueKind::InvalidUrl { reason, .. } if reason.contains("ftp")
        ));

        let config = ValidationConfig {
            allowed_schemes: vec!["https".into(), "ftp".into()],
            warn_unused: true,
        };
        let report = validate(
            &parse("# T\n\n* [a]: d, [b]\n\n[a]: ftp://x.example/a\n[b]: https://x.example\n"),
            &config,
        );
        assert!(report.is_ok());
    }

    #[test]
    fn test_check_url_rejects_hostless() {
        let schemes = vec!["https".to_string(), "mailto".to_string()];
        assert!(check_url("https://github.com/x", &schemes).is_ok());
        assert!(check_url("mailto:someone@example.com", &schemes).is_err());
        assert!(check_url("github.com/x", &schemes).is_err());
    }

    #[test]
    fn test_duplicate_names() {
        let report = check(
            "# T\n\n* [a]: one, [b]\n* [A]: two, [b]\n\n[a]: https://a.example\n[b]: https://b.example\n",
        );
        assert_eq!(
            kinds(&report),
            vec![&IssueKind::DuplicateName {
                name: "A".into(),
                first_line: 3
            }]
        );
    }

    #[test]
    fn test_duplicate_and_unused_definitions_warn() {
        let report = check(
            "# T\n\n* [a]: one, [b]\n\n[a]: https://a.example\n[b]: https://b.example\n[a]: https://other.example\n[c]: https://c.example\n",
        );
        assert!(report.is_ok());
        let warnings: Vec<_> = report.warnings().map(|w| &w.kind).collect();
        assert_eq!(
            warnings,
            vec![
                &IssueKind::DuplicateDefinition {
                    label: "a".into(),
                    first_line: 5
                },
                &IssueKind::UnusedDefinition { label: "c".into() },
            ]
        );
    }

    #[test]
    fn test_unused_can_be_disabled() {
        let config = ValidationConfig {
            warn_unused: false,
            ..ValidationConfig::default()
        };
        let report = validate(&parse("# T\n\n[c]: https://c.example\n"), &config);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_malformed_and_missing_title() {
        let report = check("* [broken] entry\n");
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.issues[0].kind, IssueKind::MissingTitle);
        assert!(matches!(
            report.issues[1].kind,
            IssueKind::MalformedEntry { .. }
        ));
        assert_eq!(
            report.issues[2].kind,
            IssueKind::UndefinedReference {
                label: "broken".into()
            }
        );
        assert!(!report.is_ok());
    }

    #[test]
    fn test_references_in_descriptions_and_prose() {
        let report = check(
            "# T\n\nBuilt with [cargo-generate].\n\n* [a]: built on [serde] and [undefined-thing], [c]\n\n\
             [a]: https://a.example\n\
             [c]: https://c.example\n\
             [serde]: https://serde.rs\n",
        );
        assert!(!report.is_ok());
        let undefined: Vec<_> = report
            .errors()
            .map(|i| (i.line, i.kind.to_string()))
            .collect();
        assert_eq!(
            undefined,
            vec![
                (3, "[cargo-generate] is used but never defined".to_string()),
                (5, "[undefined-thing] is used but never defined".to_string()),
            ]
        );
        assert_eq!(report.warnings().count(), 0);
    }

    #[test]
    fn test_undefined_entry_label_reported_once() {
        let report = check("# T\n\n* [a]: see [a] again, [b]\n\n[b]: https://b.example\n");
        assert_eq!(
            kinds(&report),
            vec![&IssueKind::UndefinedReference { label: "a".into() }]
        );
    }

    #[test]
    fn test_reference_in_fenced_code_ignored() {
        let report = check(
            "# T\n\n```\n[not-a-reference]\n```\n\n* [a]: d, [b]\n\n[a]: https://a.example\n[b]: https://b.example\n",
        );
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_empty_description_warns() {
        let report = check("# T\n\n* [a]: , [b]\n\n[a]: https://a.example\n[b]: https://b.example\n");
        assert!(report.is_ok());
        assert_eq!(
            kinds(&report),
            vec![&IssueKind::EmptyDescription { name: "a".into() }]
        );
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue::new(
            4,
            IssueKind::UndefinedReference {
                label: "DD5HT".into(),
            },
        );
        assert_eq!(issue.to_string(), "line 4: [DD5HT] is used but never defined");
    }
}
