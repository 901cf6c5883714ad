//! services/api/src/web/render.rs
//!
//! Turns session state into the payloads the client renders. Answers are
//! segmented here, per request, so highlight flags always reflect the
//! coordinator's current state.

use crate::web::rest::{
    CitationEntryView, CitationRefView, DocumentView, MessageView, ParagraphView,
    ResponseRowView, ThemeOverviewView, ThemeView,
};
use research_core::{
    citations::{self, CitationRef},
    domain::{ChatMessage, ChatRole, Document, DocumentResponse, Theme},
    highlight::HighlightCoordinator,
    store::DocumentStore,
    themes::ThemeOverview,
};

pub fn document_view(document: &Document, selected: bool) -> DocumentView {
    DocumentView {
        id: document.id.clone(),
        name: document.name.clone(),
        kind: document.kind.clone(),
        upload_timestamp: document.upload_timestamp.clone(),
        size_bytes: document.size_bytes,
        status: document.status.as_str().to_string(),
        error: document.status.error_detail().map(str::to_string),
        selected,
        page_count: document.meta.as_ref().map(|m| m.page_count),
        word_count: document.meta.as_ref().map(|m| m.word_count),
        confidence: document.meta.as_ref().map(|m| m.confidence),
    }
}

pub fn document_views<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
    store: &DocumentStore,
) -> Vec<DocumentView> {
    documents
        .into_iter()
        .map(|d| document_view(d, store.is_selected(&d.id)))
        .collect()
}

fn citation_ref_view(citation: CitationRef<'_>) -> CitationRefView {
    match citation {
        CitationRef::Resolved(c) => CitationRefView::Resolved {
            page: c.page.clone(),
            paragraph: c.paragraph.clone(),
            full_citation_text: c.full_citation_text.clone(),
        },
        CitationRef::Raw(marker) => CitationRefView::Raw {
            marker: marker.to_string(),
        },
    }
}

pub fn response_row(response: &DocumentResponse, highlight: &HighlightCoordinator) -> ResponseRowView {
    let paragraphs = citations::segment(&response.answer, &response.citations)
        .iter()
        .map(|paragraph| ParagraphView {
            text: paragraph.text.clone(),
            citations: citations::resolve(paragraph, &response.citations)
                .into_iter()
                .map(citation_ref_view)
                .collect(),
            highlighted: highlight
                .is_paragraph_highlighted(&response.document_id, &paragraph.citation_texts),
        })
        .collect();

    let citations = response
        .citations
        .iter()
        .map(|c| CitationEntryView {
            page: c.page.clone(),
            paragraph: c.paragraph.clone(),
            full_citation_text: c.full_citation_text.clone(),
            highlighted: highlight.is_entry_highlighted(&response.document_id, &c.full_citation_text),
        })
        .collect();

    ResponseRowView {
        document_id: response.document_id.clone(),
        document_name: response.document_name.clone(),
        answer: response.answer.clone(),
        paragraphs,
        citations,
    }
}

pub fn response_rows<'a>(
    responses: impl IntoIterator<Item = &'a DocumentResponse>,
    highlight: &HighlightCoordinator,
) -> Vec<ResponseRowView> {
    responses
        .into_iter()
        .map(|r| response_row(r, highlight))
        .collect()
}

fn theme_view(theme: &Theme) -> ThemeView {
    ThemeView {
        id: theme.id.clone(),
        title: theme.title.clone(),
        description: theme.description.clone(),
        document_ids: theme.document_ids.clone(),
    }
}

pub fn message_view(message: &ChatMessage, highlight: &HighlightCoordinator) -> MessageView {
    let role = match message.role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    };
    MessageView {
        id: message.id,
        role: role.to_string(),
        content: message.content.clone(),
        timestamp: message.timestamp,
        responses: message
            .document_responses
            .as_ref()
            .map(|responses| response_rows(responses, highlight)),
        themes: message
            .themes
            .as_ref()
            .map(|themes| themes.iter().map(theme_view).collect()),
    }
}

pub fn theme_overview_view(overview: ThemeOverview) -> ThemeOverviewView {
    ThemeOverviewView {
        id: overview.id,
        title: overview.title,
        description: overview.description,
        document_count: overview.document_count,
        preview_names: overview.preview_names,
        remaining: overview.remaining,
        coverage_percent: overview.coverage_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_core::domain::Citation;

    fn response() -> DocumentResponse {
        DocumentResponse {
            document_id: "d1".into(),
            document_name: "report.pdf".into(),
            answer: "Intro (page 1). Growth slowed (page 2).".into(),
            citations: vec![Citation {
                page: "1".into(),
                paragraph: "1".into(),
                full_citation_text: "(page 1)".into(),
            }],
        }
    }

    #[test]
    fn rows_flag_the_active_citation() {
        let mut highlight = HighlightCoordinator::new();
        highlight.set_active("d1", "(page 1)");

        let row = response_row(&response(), &highlight);
        assert_eq!(row.paragraphs.len(), 2);
        assert!(row.paragraphs[0].highlighted);
        assert!(!row.paragraphs[1].highlighted);
        assert!(row.citations[0].highlighted);
    }

    #[test]
    fn unmatched_markers_render_raw() {
        let row = response_row(&response(), &HighlightCoordinator::new());
        assert_eq!(
            row.paragraphs[1].citations,
            vec![CitationRefView::Raw {
                marker: "(page 2)".into()
            }]
        );
        assert!(matches!(
            row.paragraphs[0].citations[0],
            CitationRefView::Resolved { ref page, .. } if page == "1"
        ));
    }

    #[test]
    fn hovered_group_flags_entries_only() {
        let mut highlight = HighlightCoordinator::new();
        highlight.set_hovered_group(vec!["(page 1)".into()]);

        let row = response_row(&response(), &highlight);
        assert!(row.citations[0].highlighted);
        assert!(row.paragraphs.iter().all(|p| !p.highlighted));
    }
}
