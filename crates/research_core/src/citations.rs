//! crates/research_core/src/citations.rs
//!
//! Splits a free-text answer into paragraphs and attaches to each paragraph
//! the citation markers that close it.
//!
//! A citation marker is any parenthesised span mentioning "page", for
//! example `(Smith 2020, page 4)`. Markers are found left to right without
//! overlap, stripped from the text and attached to the paragraph right before
//! them. Segmentation never fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Citation;

static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\([^()]*page[^()]*\)").expect("marker pattern is valid"));

/// Characters left dangling at a paragraph start once a marker is cut out.
const DANGLING: &[char] = &['.', ',', ';', ':', '!', '?', '-'];

/// One paragraph of an answer and the raw markers that cite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub citation_texts: Vec<String>,
}

/// A marker joined against the structured citations of its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationRef<'a> {
    Resolved(&'a Citation),
    /// No citation carries this exact text. Rendered as an inert label.
    Raw(&'a str),
}

impl<'a> CitationRef<'a> {
    pub fn marker(&self) -> &'a str {
        match *self {
            CitationRef::Resolved(citation) => &citation.full_citation_text,
            CitationRef::Raw(marker) => marker,
        }
    }
}

/// Segments `answer` into paragraphs. With no citations the answer comes
/// back whole and no markers are scanned.
pub fn segment(answer: &str, citations: &[Citation]) -> Vec<Paragraph> {
    if citations.is_empty() {
        return vec![Paragraph {
            text: answer.to_string(),
            citation_texts: Vec::new(),
        }];
    }

    let mut paragraphs: Vec<Paragraph> = Vec::new();
    let mut cursor = 0;

    for marker in CITATION_MARKER.find_iter(answer) {
        let text = clean(&answer[cursor..marker.start()], cursor > 0);
        let marker_text = marker.as_str().to_string();
        cursor = marker.end();

        if !text.is_empty() {
            paragraphs.push(Paragraph {
                text,
                citation_texts: vec![marker_text],
            });
            continue;
        }

        match paragraphs.last_mut() {
            Some(previous) => previous.citation_texts.push(marker_text),
            None => paragraphs.push(Paragraph {
                text: String::new(),
                citation_texts: vec![marker_text],
            }),
        }
    }

    let tail = clean(&answer[cursor..], cursor > 0);
    if !tail.is_empty() {
        paragraphs.push(Paragraph {
            text: tail,
            citation_texts: Vec::new(),
        });
    }

    paragraphs
}

/// Joins each marker of `paragraph` with the citation whose full text matches exactly.
pub fn resolve<'a>(paragraph: &'a Paragraph, citations: &'a [Citation]) -> Vec<CitationRef<'a>> {
    paragraph
        .citation_texts
        .iter()
        .map(|marker| {
            citations
                .iter()
                .find(|c| c.full_citation_text == *marker)
                .map(CitationRef::Resolved)
                .unwrap_or(CitationRef::Raw(marker.as_str()))
        })
        .collect()
}

/// Rebuilds a readable answer from paragraphs, each followed by its markers.
pub fn reassemble(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| {
            std::iter::once(p.text.as_str())
                .chain(p.citation_texts.iter().map(String::as_str))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// All markers in `text`, in order.
pub fn markers(text: &str) -> Vec<&str> {
    CITATION_MARKER.find_iter(text).map(|m| m.as_str()).collect()
}

/// Trims a fragment. Punctuation is only dangling when a marker was cut out right before it.
fn clean(fragment: &str, follows_marker: bool) -> String {
    let fragment = if follows_marker {
        fragment.trim_start_matches(|c: char| c.is_whitespace() || DANGLING.contains(&c))
    } else {
        fragment.trim_start()
    };
    fragment.trim_end().to_string()
}
