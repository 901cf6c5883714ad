//! crates/research_core/src/highlight.rs
//!
//! Hover-driven highlight state for a response table.
//!
//! Two signals are kept apart: the selector names the one citation a user is
//! pointing at, the hovered group holds every citation of the paragraph under
//! the pointer. Neither overwrites the other.

/// The single citation currently being pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSelector {
    pub document_id: String,
    pub citation_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct HighlightCoordinator {
    active: Option<HighlightSelector>,
    hovered_group: Option<Vec<String>>,
}

impl HighlightCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes this citation the only active target.
    pub fn set_active(&mut self, document_id: impl Into<String>, citation_text: impl Into<String>) {
        self.active = Some(HighlightSelector {
            document_id: document_id.into(),
            citation_text: citation_text.into(),
        });
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&HighlightSelector> {
        self.active.as_ref()
    }

    /// The group is view-wide: it carries no document id, so an entry of any
    /// row whose text is in the group lights up.
    pub fn set_hovered_group(&mut self, citation_texts: Vec<String>) {
        self.hovered_group = Some(citation_texts);
    }

    pub fn clear_hovered_group(&mut self) {
        self.hovered_group = None;
    }

    pub fn hovered_group(&self) -> Option<&[String]> {
        self.hovered_group.as_deref()
    }

    /// True when the active citation belongs to `document_id` and to this paragraph.
    pub fn is_paragraph_highlighted(
        &self,
        document_id: &str,
        paragraph_citation_texts: &[String],
    ) -> bool {
        self.active.as_ref().is_some_and(|selector| {
            selector.document_id == document_id
                && paragraph_citation_texts.contains(&selector.citation_text)
        })
    }

    /// True when this exact citation is active, or when it belongs to `hovered_group`.
    pub fn is_citation_entry_highlighted(
        &self,
        document_id: &str,
        citation_text: &str,
        hovered_group: Option<&[String]>,
    ) -> bool {
        let selected = self.active.as_ref().is_some_and(|selector| {
            selector.document_id == document_id && selector.citation_text == citation_text
        });
        let grouped =
            hovered_group.is_some_and(|group| group.iter().any(|text| text == citation_text));
        selected || grouped
    }

    /// Same as [`is_citation_entry_highlighted`](Self::is_citation_entry_highlighted)
    /// using the coordinator's own hovered group.
    pub fn is_entry_highlighted(&self, document_id: &str, citation_text: &str) -> bool {
        self.is_citation_entry_highlighted(document_id, citation_text, self.hovered_group())
    }
}
