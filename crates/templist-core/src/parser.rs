//! Markdown parser for catalog documents.
//!
//! Block structure comes from [`pulldown_cmark`] with source offsets, so
//! fenced code, nested lists and HTML are recognized the way any markdown
//! renderer sees them. Within that structure:
//! - the first heading becomes the catalog title
//! - list items shaped `[name]: description, [author]` become entries
//! - `[label]: destination` definitions become [`LinkDefinition`]s
//! - every other block is kept verbatim, as preamble before the list or as a
//!   [`Note`] anchored to its place in it
//!
//! A list item that starts with `[` but does not match the entry grammar is
//! kept as a [`MalformedLine`] so the validator can report it and the
//! formatter does not drop it. A second pass records every reference link
//! ([`LinkReference`]) for the validator.

use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

use once_cell::sync::Lazy;
use pulldown_cmark::{BrokenLink, CowStr, Event, LinkType, Options, Parser, Tag};
use regex::Regex;

use crate::catalog::{
    normalize_label, Catalog, LinkDefinition, LinkReference, MalformedLine, Note, TemplateEntry,
};
use crate::error::{Result, TemplistError};

static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[*+-]|\d{1,9}[.)])\s+(.*)$").expect("valid item regex"));
// The description is lazy so that the author is always the last bracketed label.
static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([^\]]+)\]:?\s*(.*?),\s*\[([^\]]+)\]\s*\.?\s*$").expect("valid entry regex")
});
static DEFINITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}\[([^\]]+)\]:\s*(.*)$").expect("valid definition regex"));

/// Read and parse a catalog file.
pub fn load(path: &Path) -> Result<Catalog> {
    let source = std::fs::read_to_string(path).map_err(|e| TemplistError::CatalogNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "loaded catalog");
    Ok(parse(&source))
}

/// Parse catalog markdown. Parsing never fails; problems surface through validation.
pub fn parse(source: &str) -> Catalog {
    let mut builder = Builder {
        source,
        lines: LineIndex::new(source),
        catalog: Catalog::default(),
        list_started: false,
    };
    let mut open: Option<Open> = None;
    let mut depth = 0usize;
    let mut cursor = 0;

    for (event, range) in Parser::new_ext(source, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if depth == 0 {
                    let range = builder.widen(range);
                    builder.gap(cursor..range.start);
                    open = Some(match tag {
                        Tag::Heading { .. } => Open::Heading(range, String::new()),
                        Tag::List(_) => Open::List(range, Vec::new()),
                        Tag::Paragraph => Open::Paragraph(range),
                        _ => Open::Block(range),
                    });
                } else if depth == 1 && matches!(tag, Tag::Item) {
                    if let Some(Open::List(_, items)) = open.as_mut() {
                        items.push(builder.widen(range));
                    }
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(block) = open.take() {
                        cursor = block.end();
                        builder.close(block);
                    }
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(Open::Heading(_, title)) = open.as_mut() {
                    title.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(Open::Heading(_, title)) = open.as_mut() {
                    title.push(' ');
                }
            }
            // Leaf blocks with no start/end pair, e.g. a thematic break.
            _ if depth == 0 => {
                let range = builder.widen(range);
                builder.gap(cursor..range.start);
                cursor = range.end;
                builder.block(range);
            }
            _ => {}
        }
    }
    builder.gap(cursor..source.len());

    let mut catalog = builder.catalog;
    let definition_lines: HashSet<usize> = catalog.links.iter().map(|l| l.line).collect();
    catalog.references = scan_references(source, &builder.lines, &definition_lines);

    tracing::debug!(
        entries = catalog.entries.len(),
        links = catalog.links.len(),
        malformed = catalog.malformed.len(),
        references = catalog.references.len(),
        "parsed catalog"
    );
    catalog
}

/// A top-level block whose end event has not been seen yet.
enum Open {
    Heading(Range<usize>, String),
    List(Range<usize>, Vec<Range<usize>>),
    Paragraph(Range<usize>),
    Block(Range<usize>),
}

impl Open {
    fn end(&self) -> usize {
        match self {
            Self::Heading(range, _)
            | Self::List(range, _)
            | Self::Paragraph(range)
            | Self::Block(range) => range.end,
        }
    }
}

/// Byte offset to 1-based line number.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

struct Builder<'a> {
    source: &'a str,
    lines: LineIndex,
    catalog: Catalog,
    list_started: bool,
}

impl<'a> Builder<'a> {
    /// Extend `range` back to the start of its line when only indentation
    /// precedes it, so verbatim blocks keep their leading whitespace.
    fn widen(&self, range: Range<usize>) -> Range<usize> {
        let line_start = self.source[..range.start].rfind('\n').map_or(0, |i| i + 1);
        if self.source[line_start..range.start].trim().is_empty() {
            line_start..range.end
        } else {
            range
        }
    }

    fn close(&mut self, block: Open) {
        match block {
            Open::Heading(range, title) => {
                if self.catalog.title.is_empty() && !self.list_started && !title.trim().is_empty() {
                    self.catalog.title = title.trim().to_string();
                } else {
                    self.block(range);
                }
            }
            Open::List(range, items) => self.list(range, items),
            Open::Paragraph(range) => {
                let text = &self.source[range.clone()];
                // `[a]:` with nothing after it is a paragraph to CommonMark,
                // but it is still a (broken) definition here.
                if text
                    .lines()
                    .all(|l| l.trim().is_empty() || DEFINITION_RE.is_match(l))
                {
                    self.gap(range);
                } else {
                    self.block(range);
                }
            }
            Open::Block(range) => self.block(range),
        }
    }

    /// Keep `range` verbatim, minus trailing whitespace.
    fn block(&mut self, range: Range<usize>) {
        let text = self.source[range.clone()].trim_end();
        if text.trim().is_empty() {
            return;
        }
        if self.list_started {
            self.catalog.notes.push(Note {
                after: self.catalog.entries.len(),
                line: self.lines.line(range.start),
                text: text.to_string(),
            });
        } else {
            self.catalog.preamble.push(text.to_string());
        }
    }

    /// Text between blocks: blank lines and link definitions.
    fn gap(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let source = self.source;
        let mut offset = range.start;
        let mut after_definition = false;
        for raw in source[range].split_inclusive('\n') {
            let start = offset;
            offset += raw.len();
            let text = raw.trim_end();
            if text.trim().is_empty() {
                after_definition = false;
            } else if self.definition(text, start) {
                after_definition = true;
            } else if after_definition && text.trim_start().starts_with(['"', '\'', '(']) {
                // title of the definition above, on its own line
            } else {
                after_definition = false;
                self.block(start..offset);
            }
        }
    }

    fn definition(&mut self, text: &str, offset: usize) -> bool {
        let Some(caps) = DEFINITION_RE.captures(text) else {
            return false;
        };
        self.catalog.links.push(LinkDefinition {
            label: caps[1].trim().to_string(),
            url: destination(&caps[2]),
            line: self.lines.line(offset),
        });
        true
    }

    /// A list holding at least one entry-like item is the catalog list; any
    /// other list is prose.
    fn list(&mut self, range: Range<usize>, items: Vec<Range<usize>>) {
        let source = self.source;
        let is_catalog = items
            .iter()
            .any(|item| entry_like(source[item.clone()].lines().next().unwrap_or_default()).is_some());
        if !is_catalog {
            self.block(range);
            return;
        }
        for item in items {
            self.item(item);
        }
    }

    fn item(&mut self, range: Range<usize>) {
        let source = self.source;
        let text = source[range.clone()].trim_end();
        let mut rows = Vec::new();
        let mut offset = range.start;
        for raw in text.split_inclusive('\n') {
            rows.push((offset, raw.trim_end()));
            offset += raw.len();
        }
        let Some(&(_, first)) = rows.first() else {
            return;
        };
        let Some(content) = entry_like(first) else {
            self.block(range);
            return;
        };

        self.list_started = true;
        let line = self.lines.line(range.start);
        // Definitions written right under the last item are lazy continuation
        // lines of that item; they are still definitions.
        let continuation = &rows[1..];
        let definitions_only = continuation
            .iter()
            .all(|(_, row)| row.trim().is_empty() || DEFINITION_RE.is_match(row));

        match ENTRY_RE.captures(content) {
            Some(caps) if definitions_only => {
                self.catalog.entries.push(TemplateEntry {
                    name: caps[1].trim().to_string(),
                    description: caps[2].trim().to_string(),
                    author: caps[3].trim().to_string(),
                    line,
                });
                for &(start, row) in continuation {
                    self.definition(row, start);
                }
            }
            _ => {
                tracing::warn!(line, "list item does not match `[name]: description, [author]`");
                self.catalog.malformed.push(MalformedLine {
                    line,
                    text: text.to_string(),
                    after: self.catalog.entries.len(),
                });
            }
        }
    }
}

/// Item text after the list marker, if it starts with `[`.
fn entry_like(line: &str) -> Option<&str> {
    let caps = ITEM_RE.captures(line)?;
    let content = caps.get(1)?.as_str().trim_end();
    content.starts_with('[').then_some(content)
}

/// Every shortcut, collapsed and full reference link, resolved or not,
/// except the ones on definition lines.
fn scan_references<'a>(
    source: &'a str,
    lines: &LineIndex,
    skip: &HashSet<usize>,
) -> Vec<LinkReference> {
    let mut broken = Vec::new();
    let mut callback = |link: BrokenLink<'a>| -> Option<(CowStr<'a>, CowStr<'a>)> {
        broken.push((link.span.start, link.reference.to_string()));
        None
    };

    let mut found = Vec::new();
    let parser =
        Parser::new_with_broken_link_callback(source, Options::empty(), Some(&mut callback));
    for (event, range) in parser.into_offset_iter() {
        if let Event::Start(Tag::Link { link_type, id, .. } | Tag::Image { link_type, id, .. }) =
            event
        {
            if matches!(
                link_type,
                LinkType::Reference | LinkType::Collapsed | LinkType::Shortcut
            ) {
                found.push((range.start, id.to_string()));
            }
        }
    }
    found.extend(broken);

    let mut references: Vec<LinkReference> = found
        .into_iter()
        .filter(|(_, label)| !normalize_label(label).is_empty())
        .map(|(offset, label)| LinkReference {
            label,
            line: lines.line(offset),
        })
        .filter(|r| !skip.contains(&r.line))
        .collect();
    references.sort_by_key(|r| r.line);
    references
}

/// Extract a link destination, dropping angle brackets and any trailing title.
fn destination(rest: &str) -> String {
    let rest = rest.trim();
    if let Some(inner) = rest.strip_prefix('<') {
        return inner
            .split('>')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
    }
    rest.split_whitespace().next().unwrap_or_default().to_string()
}
