use crate::models::{FusedHit, Filters};
use chrono::{DateTime, Utc};

/// Post-Filter (C5, spec §4.5): applied over the fused list in a fixed order.
/// Stable — preserves the incoming order of surviving hits.
pub fn apply(hits: Vec<FusedHit>, filters: &Filters) -> Vec<FusedHit> {
    let mut hits = hits;

    if !filters.document_ids.is_empty() {
        hits.retain(|h| filters.document_ids.contains(&h.document_id));
    }

    if !filters.document_types.is_empty() {
        hits.retain(|h| filters.document_types.contains(&h.document_type));
    }

    if let Some(range) = &filters.date_range {
        if let Some(start) = range.start {
            hits.retain(|h| match chunk_date(h) {
                Some(date) => date >= start,
                None => true,
            });
        }
        if let Some(end) = range.end {
            hits.retain(|h| match chunk_date(h) {
                Some(date) => date <= end,
                None => true,
            });
        }
    }

    hits
}

/// Chunk metadata may carry either `created_at` or `date`; hits lacking both
/// pass every date-range check untouched (spec §4.5 step 3/4).
fn chunk_date(hit: &FusedHit) -> Option<DateTime<Utc>> {
    for key in ["created_at", "date"] {
        if let Some(value) = hit.metadata.get(key).and_then(|v| v.as_str()) {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
                return Some(parsed.with_timezone(&Utc));
            }
        }
    }
    None
}
