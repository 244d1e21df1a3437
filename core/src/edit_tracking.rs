use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How far the text an agent actually sent drifted from the generated draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EditMetrics {
    /// Levenshtein distance in characters
    pub edit_distance: usize,
    /// 1.0 for identical texts, 0.0 for nothing in common
    pub normalized_similarity: f64,
    pub unchanged: bool,
}

pub fn measure_edit(draft_text: &str, final_text: &str) -> EditMetrics {
    EditMetrics {
        edit_distance: strsim::levenshtein(draft_text, final_text),
        normalized_similarity: strsim::normalized_levenshtein(draft_text, final_text),
        unchanged: draft_text == final_text,
    }
}

/// Holds the most recent draft shown to an agent. Owned by the caller; there
/// is no shared or global draft state.
#[derive(Debug, Clone, Default)]
pub struct DraftEditTracker {
    current: Option<String>,
}

impl DraftEditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, draft_text: impl Into<String>) {
        self.current = Some(draft_text.into());
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// `None` when no draft has been recorded.
    pub fn measure(&self, final_text: &str) -> Option<EditMetrics> {
        self.current
            .as_deref()
            .map(|draft| measure_edit(draft, final_text))
    }
}
