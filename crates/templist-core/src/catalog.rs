//! In-memory model of a template catalog document.
//!
//! A catalog is the parsed form of a `TEMPLATES.md` file:
//!
//! ```text
//! # List of templates
//!
//! * [PyO3]: Write a Python Library in Rust, [DD5HT]
//!
//! [PyO3]: https://github.com/DD5HT/pyo3-template
//! [DD5HT]: https://github.com/DD5HT
//! ```
//!
//! Entries refer to their template repository and to their author through
//! markdown link labels. Labels are matched the way markdown matches them:
//! case-insensitively, with runs of whitespace collapsed. When a label is
//! defined more than once, the first definition wins.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplistError};

/// One list item: `* [name]: description, [author]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    pub description: String,
    pub author: String,
    /// 1-based source line, or 0 for entries not read from a file.
    #[serde(default)]
    pub line: usize,
}

impl TemplateEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            author: author.into(),
            line: 0,
        }
    }
}

/// One link-reference definition: `[label]: url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDefinition {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub line: usize,
}

impl LinkDefinition {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            line: 0,
        }
    }
}

/// A list item that looks like an entry but does not follow the entry grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedLine {
    pub line: usize,
    /// The item exactly as written, continuation lines included.
    pub text: String,
    /// Number of entries listed before it.
    #[serde(default)]
    pub after: usize,
}

/// A block met once the list has started: a subheading, a paragraph, a code
/// block, or a list item that is not an entry. `text` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Number of entries listed before it.
    pub after: usize,
    #[serde(default)]
    pub line: usize,
    pub text: String,
}

/// A bracketed reference used somewhere in the text, e.g. `[serde]` in a
/// description. Covers shortcut, collapsed and full reference links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    pub label: String,
    pub line: usize,
}

/// An entry with both of its references looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTemplate {
    pub name: String,
    pub description: String,
    pub author: String,
    pub url: Option<String>,
    pub author_url: Option<String>,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    title: &'a str,
    templates: Vec<ResolvedTemplate>,
}

/// The parsed catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Text of the first heading, empty if the document has none.
    pub title: String,
    /// Blocks between the heading and the list, verbatim.
    pub preamble: Vec<String>,
    /// Blocks found after the list started, anchored to their place in it.
    pub notes: Vec<Note>,
    pub entries: Vec<TemplateEntry>,
    pub links: Vec<LinkDefinition>,
    pub malformed: Vec<MalformedLine>,
    /// Every reference link in the document, entry lines included.
    #[serde(default)]
    pub references: Vec<LinkReference>,
}

/// Reject values that `* [name]: description, [author]` cannot hold.
fn check_fields(entry: &TemplateEntry) -> Result<()> {
    for (field, value) in [("name", &entry.name), ("author", &entry.author)] {
        let reason = if value.trim().is_empty() {
            "must not be empty"
        } else if value.contains(['[', ']']) {
            "must not contain `[` or `]`"
        } else if value.contains(['\n', '\r']) {
            "must fit on one line"
        } else {
            continue;
        };
        return Err(TemplistError::InvalidEntry {
            field,
            value: value.clone(),
            reason: reason.into(),
        });
    }
    if entry.description.contains(['\n', '\r']) {
        return Err(TemplistError::InvalidEntry {
            field: "description",
            value: entry.description.clone(),
            reason: "must fit on one line".into(),
        });
    }
    Ok(())
}

/// Normalize a link label for matching: trim, collapse whitespace, lowercase.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Catalog {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Look up the effective definition of `label` (first definition wins).
    pub fn link(&self, label: &str) -> Option<&LinkDefinition> {
        let key = normalize_label(label);
        self.links.iter().find(|l| normalize_label(&l.label) == key)
    }

    /// Find an entry by name, using label matching rules.
    pub fn find(&self, name: &str) -> Option<&TemplateEntry> {
        let key = normalize_label(name);
        self.entries.iter().find(|e| normalize_label(&e.name) == key)
    }

    pub fn resolve(&self, entry: &TemplateEntry) -> ResolvedTemplate {
        ResolvedTemplate {
            name: entry.name.clone(),
            description: entry.description.clone(),
            author: entry.author.clone(),
            url: self.link(&entry.name).map(|l| l.url.clone()),
            author_url: self.link(&entry.author).map(|l| l.url.clone()),
        }
    }

    pub fn resolved(&self) -> Vec<ResolvedTemplate> {
        self.entries.iter().map(|e| self.resolve(e)).collect()
    }

    /// Entries whose name, description, or author contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&TemplateEntry> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                query.is_empty()
                    || e.name.to_lowercase().contains(&query)
                    || e.description.to_lowercase().contains(&query)
                    || e.author.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Append an entry together with the definitions it needs.
    ///
    /// Existing definitions are reused when they point at the same URL. The
    /// entry joins the last group of the list, ahead of any trailing notes.
    /// Nothing is modified if any check fails.
    pub fn add(&mut self, entry: TemplateEntry, template_url: &str, author_url: &str) -> Result<()> {
        check_fields(&entry)?;
        if self.find(&entry.name).is_some() {
            return Err(TemplistError::DuplicateTemplate(entry.name));
        }

        let mut pending = Vec::new();
        for (label, url) in [(&entry.name, template_url), (&entry.author, author_url)] {
            let url = url.trim();
            if url.is_empty() {
                return Err(TemplistError::InvalidUrl {
                    label: label.clone(),
                    reason: "URL is empty".into(),
                });
            }
            let key = normalize_label(label);
            let queued = pending
                .iter()
                .any(|l: &LinkDefinition| normalize_label(&l.label) == key);
            match self.link(label) {
                Some(existing) if existing.url != url => {
                    return Err(TemplistError::ConflictingLink {
                        label: label.clone(),
                        existing: existing.url.clone(),
                        requested: url.to_string(),
                    });
                }
                Some(_) => {}
                None if queued => {
                    if let Some(first) = pending.iter().find(|l| normalize_label(&l.label) == key) {
                        if first.url != url {
                            return Err(TemplistError::ConflictingLink {
                                label: label.clone(),
                                existing: first.url.clone(),
                                requested: url.to_string(),
                            });
                        }
                    }
                }
                None => pending.push(LinkDefinition::new(label.clone(), url)),
            }
        }

        tracing::debug!(name = %entry.name, new_links = pending.len(), "adding template");
        let end = self.entries.len();
        self.shift_anchors(|after| if after == end { after + 1 } else { after });
        self.entries.push(entry);
        self.links.extend(pending);
        Ok(())
    }

    /// Remove an entry and every definition that nothing references any more.
    pub fn remove(&mut self, name: &str) -> Result<TemplateEntry> {
        let key = normalize_label(name);
        let index = self
            .entries
            .iter()
            .position(|e| normalize_label(&e.name) == key)
            .ok_or_else(|| TemplistError::TemplateNotFound(name.to_string()))?;
        let entry = self.entries.remove(index);
        self.shift_anchors(|after| if after > index { after - 1 } else { after });
        if entry.line > 0 {
            self.references.retain(|r| r.line != entry.line);
        }

        for label in [&entry.name, &entry.author] {
            let label_key = normalize_label(label);
            if !self.is_referenced(&label_key) {
                self.links.retain(|l| normalize_label(&l.label) != label_key);
            }
        }

        tracing::debug!(name = %entry.name, "removed template");
        Ok(entry)
    }

    /// Whether `key` (already normalized) is an entry's name or author, or is
    /// referenced anywhere else in the text.
    pub fn is_referenced(&self, key: &str) -> bool {
        self.entries
            .iter()
            .any(|e| normalize_label(&e.name) == key || normalize_label(&e.author) == key)
            || self
                .references
                .iter()
                .any(|r| normalize_label(&r.label) == key)
    }

    /// Order entries by name, ignoring case.
    ///
    /// Notes and malformed items split the list into groups (a `## Embedded`
    /// subheading, say), and each group is sorted on its own.
    pub fn sort(&mut self) {
        let len = self.entries.len();
        let mut cuts: Vec<usize> = self
            .notes
            .iter()
            .map(|n| n.after)
            .chain(self.malformed.iter().map(|m| m.after))
            .map(|after| after.min(len))
            .chain([0, len])
            .collect();
        cuts.sort_unstable();
        cuts.dedup();
        for group in cuts.windows(2) {
            self.entries[group[0]..group[1]].sort_by_key(|e| e.name.to_lowercase());
        }
    }

    fn shift_anchors(&mut self, shift: impl Fn(usize) -> usize) {
        for note in &mut self.notes {
            note.after = shift(note.after);
        }
        for bad in &mut self.malformed {
            bad.after = shift(bad.after);
        }
    }

    /// Definitions in canonical order: template labels, then author labels
    /// (each in first use order), then everything else in source order.
    pub fn canonical_links(&self) -> Vec<&LinkDefinition> {
        let mut placed = vec![false; self.links.len()];
        let mut ordered = Vec::with_capacity(self.links.len());

        let labels = self
            .entries
            .iter()
            .map(|e| &e.name)
            .chain(self.entries.iter().map(|e| &e.author));
        for label in labels {
            let key = normalize_label(label);
            if let Some(i) = self
                .links
                .iter()
                .position(|l| normalize_label(&l.label) == key)
            {
                if !placed[i] {
                    placed[i] = true;
                    ordered.push(&self.links[i]);
                }
            }
        }

        for (i, link) in self.links.iter().enumerate() {
            if !placed[i] {
                ordered.push(link);
            }
        }
        ordered
    }

    /// Pretty JSON of the title and all resolved entries.
    pub fn to_json(&self) -> Result<String> {
        let doc = ExportDocument {
            title: &self.title,
            templates: self.resolved(),
        };
        serde_json::to_string_pretty(&doc).map_err(|e| TemplistError::Other(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new("Templates");
        catalog
            .add(
                TemplateEntry::new("PyO3", "Write a Python Library in Rust", "DD5HT"),
                "https://github.com/DD5HT/pyo3-template",
                "https://github.com/DD5HT",
            )
            .unwrap();
        catalog
            .add(
                TemplateEntry::new("wasm-pack-template", "Rust and WebAssembly", "rustwasm"),
                "https://github.com/rustwasm/wasm-pack-template",
                "https://github.com/rustwasm",
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  PyO3 "), "pyo3");
        assert_eq!(normalize_label("Some   Long\tName"), "some long name");
    }

    #[test]
    fn test_find_ignores_case() {
        let catalog = sample();
        assert_eq!(catalog.find("pyo3").unwrap().name, "PyO3");
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn test_first_definition_wins() {
        let mut catalog = Catalog::new("t");
        catalog.links.push(LinkDefinition::new("a", "https://one.example"));
        catalog.links.push(LinkDefinition::new("A", "https://two.example"));
        assert_eq!(catalog.link("a").unwrap().url, "https://one.example");
    }

    #[test]
    fn test_resolve_missing_reference() {
        let mut catalog = Catalog::new("t");
        catalog.entries.push(TemplateEntry::new("x", "desc", "nobody"));
        catalog.links.push(LinkDefinition::new("x", "https://x.example"));
        let resolved = catalog.resolve(&catalog.entries[0]);
        assert_eq!(resolved.url.as_deref(), Some("https://x.example"));
        assert!(resolved.author_url.is_none());
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut catalog = sample();
        let err = catalog
            .add(
                TemplateEntry::new("pyo3", "again", "DD5HT"),
                "https://example.com/a",
                "https://github.com/DD5HT",
            )
            .unwrap_err();
        assert!(matches!(err, TemplistError::DuplicateTemplate(_)));
        assert_eq!(catalog.entries.len(), 2);
    }

    #[test]
    fn test_add_reuses_author_link() {
        let mut catalog = sample();
        catalog
            .add(
                TemplateEntry::new("rust-webpack-template", "Webpack starter", "rustwasm"),
                "https://github.com/rustwasm/rust-webpack-template",
                "https://github.com/rustwasm",
            )
            .unwrap();
        let authors = catalog
            .links
            .iter()
            .filter(|l| l.label == "rustwasm")
            .count();
        assert_eq!(authors, 1);
        assert_eq!(catalog.links.len(), 5);
    }

    #[test]
    fn test_add_conflicting_author_leaves_catalog_untouched() {
        let mut catalog = sample();
        let before = catalog.clone();
        let err = catalog
            .add(
                TemplateEntry::new("other", "desc", "rustwasm"),
                "https://example.com/other",
                "https://example.com/not-rustwasm",
            )
            .unwrap_err();
        assert!(matches!(err, TemplistError::ConflictingLink { .. }));
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_add_empty_url_rejected() {
        let mut catalog = sample();
        let err = catalog
            .add(TemplateEntry::new("x", "d", "y"), "  ", "https://y.example")
            .unwrap_err();
        assert!(matches!(err, TemplistError::InvalidUrl { .. }));
    }

    #[test]
    fn test_remove_keeps_shared_author() {
        let mut catalog = sample();
        catalog
            .add(
                TemplateEntry::new("rust-webpack-template", "Webpack starter", "rustwasm"),
                "https://github.com/rustwasm/rust-webpack-template",
                "https://github.com/rustwasm",
            )
            .unwrap();

        catalog.remove("wasm-pack-template").unwrap();
        assert!(catalog.link("wasm-pack-template").is_none());
        assert!(catalog.link("rustwasm").is_some());

        catalog.remove("RUST-WEBPACK-TEMPLATE").unwrap();
        assert!(catalog.link("rustwasm").is_none());
        assert_eq!(catalog.entries.len(), 1);
    }

    #[test]
    fn test_remove_unknown() {
        let mut catalog = sample();
        assert!(matches!(
            catalog.remove("nope"),
            Err(TemplistError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_search() {
        let catalog = sample();
        assert_eq!(catalog.search("python").len(), 1);
        assert_eq!(catalog.search("RUST").len(), 2);
        assert_eq!(catalog.search("").len(), 2);
        assert!(catalog.search("haskell").is_empty());
    }

    #[test]
    fn test_canonical_links_order() {
        let mut catalog = Catalog::new("t");
        catalog.links.push(LinkDefinition::new("unused", "https://u.example"));
        catalog.links.push(LinkDefinition::new("DD5HT", "https://github.com/DD5HT"));
        catalog.links.push(LinkDefinition::new("PyO3", "https://github.com/DD5HT/pyo3-template"));
        catalog
            .entries
            .push(TemplateEntry::new("PyO3", "Python", "DD5HT"));

        let labels: Vec<_> = catalog
            .canonical_links()
            .iter()
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(labels, vec!["PyO3", "DD5HT", "unused"]);
    }

    #[test]
    fn test_sort_ignores_case() {
        let mut catalog = sample();
        catalog
            .entries
            .push(TemplateEntry::new("actix-template", "Web", "someone"));
        catalog.sort();
        let names: Vec<_> = catalog.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["actix-template", "PyO3", "wasm-pack-template"]);
    }

    #[test]
    fn test_add_rejects_unrepresentable_fields() {
        let mut catalog = sample();
        let before = catalog.clone();
        for entry in [
            TemplateEntry::new("foo]bar", "d", "me"),
            TemplateEntry::new("", "d", "me"),
            TemplateEntry::new("x", "d", "  "),
            TemplateEntry::new("x", "d", "[me"),
            TemplateEntry::new("x", "two\nlines", "me"),
        ] {
            let err = catalog
                .add(entry, "https://x.example", "https://me.example")
                .unwrap_err();
            assert!(matches!(err, TemplistError::InvalidEntry { .. }), "{err}");
        }
        assert_eq!(catalog, before);
    }

    fn note(after: usize, text: &str) -> Note {
        Note {
            after,
            line: 0,
            text: text.into(),
        }
    }

    #[test]
    fn test_sort_keeps_groups() {
        let mut catalog = Catalog::new("t");
        for name in ["c", "a", "z", "b"] {
            catalog.entries.push(TemplateEntry::new(name, "d", "me"));
        }
        catalog.notes.push(note(2, "## Embedded"));
        catalog.sort();
        let names: Vec<_> = catalog.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b", "z"]);
        assert_eq!(catalog.notes[0].after, 2);
    }

    #[test]
    fn test_add_and_remove_move_notes() {
        let mut catalog = sample();
        catalog.notes.push(note(1, "## Web"));
        catalog.notes.push(note(2, "Closing words."));

        catalog
            .add(
                TemplateEntry::new("rust-webpack-template", "Webpack starter", "rustwasm"),
                "https://github.com/rustwasm/rust-webpack-template",
                "https://github.com/rustwasm",
            )
            .unwrap();
        assert_eq!(catalog.notes[0].after, 1);
        assert_eq!(catalog.notes[1].after, 3);

        catalog.remove("PyO3").unwrap();
        assert_eq!(catalog.notes[0].after, 0);
        assert_eq!(catalog.notes[1].after, 2);
    }

    #[test]
    fn test_remove_keeps_link_referenced_in_prose() {
        let mut catalog = sample();
        catalog.references.push(LinkReference {
            label: "DD5HT".into(),
            line: 1,
        });
        catalog.remove("PyO3").unwrap();
        assert!(catalog.link("PyO3").is_none());
        assert!(catalog.link("dd5ht").is_some());
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Templates");
        assert_eq!(value["templates"][0]["name"], "PyO3");
        assert_eq!(
            value["templates"][0]["author_url"],
            "https://github.com/DD5HT"
        );
    }
}
