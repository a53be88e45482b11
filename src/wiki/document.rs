//! Wiki page model
//!
//! A [`WikiDocument`] is an immutable title/body pair. Sections, the
//! aggregate block and categories are computed from the body on demand, so
//! offsets can never go stale between transformation steps. Every
//! transformation returns a new document.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::constants::{PHOTOS_HEADING, REVIEWS_HEADING};

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^==[ \t]*([^=\n]+?)[ \t]*==[ \t]*\r?$").expect("static regex")
});

static CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[Category:([^\]|]+)(?:\|[^\]]*)?\]\]").expect("static regex")
});

static AGGREGATE_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div class=['"]h-review-aggregate['"]>"#).expect("static regex")
});

const DIV_CLOSE: &str = "</div>";

/// Identity of a level-2 section, derived from its heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    /// Text before the first heading
    Lead,
    Reviews,
    Photos,
    Other(String),
}

impl SectionKind {
    fn from_heading(heading: &str) -> Self {
        match heading.trim() {
            REVIEWS_HEADING => SectionKind::Reviews,
            PHOTOS_HEADING => SectionKind::Photos,
            other => SectionKind::Other(other.to_string()),
        }
    }
}

/// A located section of a document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub kind: SectionKind,
    /// Whole section, heading line included
    pub span: Range<usize>,
    /// First byte after the heading line
    pub content_start: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiDocument {
    title: String,
    body: String,
}

impl WikiDocument {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Stand-in for a page the wiki does not have yet
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, String::new())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Level-2 sections in body order
    ///
    /// Only headings at the start of a line count, so look-alike text inside
    /// prose or review quotes never opens a section.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let headings: Vec<(usize, usize, SectionKind)> = HEADING
            .captures_iter(&self.body)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                let mut content_start = whole.end();
                if self.body[content_start..].starts_with('\n') {
                    content_start += 1;
                }
                Some((whole.start(), content_start, SectionKind::from_heading(name.as_str())))
            })
            .collect();

        let mut sections = Vec::with_capacity(headings.len() + 1);
        let lead_end = headings.first().map_or(self.body.len(), |(start, ..)| *start);
        if lead_end > 0 {
            sections.push(self.section_at(SectionKind::Lead, 0..lead_end, 0));
        }

        for (index, (start, content_start, kind)) in headings.iter().enumerate() {
            let end = headings
                .get(index + 1)
                .map_or(self.body.len(), |(next, ..)| *next);
            sections.push(self.section_at(kind.clone(), *start..end, *content_start));
        }

        sections
    }

    fn section_at(&self, kind: SectionKind, span: Range<usize>, content_start: usize) -> Section<'_> {
        Section {
            kind,
            text: &self.body[span.clone()],
            span,
            content_start,
        }
    }

    /// First section of the given kind
    pub fn section(&self, kind: &SectionKind) -> Option<Section<'_>> {
        self.sections().into_iter().find(|section| &section.kind == kind)
    }

    pub fn has_section(&self, kind: &SectionKind) -> bool {
        self.section(kind).is_some()
    }

    /// Byte range of the aggregate-rating block inside the reviews section,
    /// closing tag included
    pub fn aggregate_block(&self) -> Option<Range<usize>> {
        let reviews = self.section(&SectionKind::Reviews)?;
        let open = AGGREGATE_OPEN.find(reviews.text)?;
        let close = reviews.text[open.end()..].find(DIV_CLOSE)?;
        let start = reviews.span.start + open.start();
        let end = reviews.span.start + open.end() + close + DIV_CLOSE.len();
        Some(start..end)
    }

    /// Category names in order of first appearance
    pub fn categories(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in CATEGORY.captures_iter(&self.body) {
            let name = caps[1].trim().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories().iter().any(|existing| existing == name.trim())
    }

    /// Add a category link at the end of the body; a no-op when present
    ///
    /// Categories are append-only.
    pub fn with_category(&self, name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || self.has_category(name) {
            return self.clone();
        }
        let separator = if self.body.is_empty() || self.body.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        self.appended(&format!("{separator}[[Category:{name}]]"))
    }

    /// Append text at the end of the body
    ///
    /// Leading blank lines are dropped when the body is empty so a new page
    /// does not start with whitespace.
    pub fn appended(&self, text: &str) -> Self {
        let text = if self.body.is_empty() {
            text.trim_start_matches(['\n', '\r'])
        } else {
            text
        };
        Self::new(self.title.clone(), format!("{}{}", self.body, text))
    }

    /// Insert text at a byte offset, shifting what follows
    pub fn inserted(&self, offset: usize, text: &str) -> Self {
        let offset = offset.min(self.body.len());
        let mut body = String::with_capacity(self.body.len() + text.len());
        body.push_str(&self.body[..offset]);
        body.push_str(text);
        body.push_str(&self.body[offset..]);
        Self::new(self.title.clone(), body)
    }

    /// Replace a byte range with new text
    pub fn replaced(&self, range: Range<usize>, text: &str) -> Self {
        let mut body = self.body.clone();
        body.replace_range(range, text);
        Self::new(self.title.clone(), body)
    }
}
