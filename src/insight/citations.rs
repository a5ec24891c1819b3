use crate::models::DocumentResultView;

const MARKER: &str = "[Source:";

/// Citation Resolver (C11, spec §4.11). A hand-written scanner rather than a
/// regex (spec §9 design note): unterminated `[Source:` sequences are left as
/// literal text instead of causing a parse failure.
pub fn resolve(answer: &str, documents: &[DocumentResultView]) -> Vec<String> {
    let titles = extract_titles(answer);

    let mut ids = Vec::new();
    for title in &titles {
        if let Some(doc) = documents.iter().find(|d| d.document_title == *title) {
            if !ids.contains(&doc.document_id) {
                ids.push(doc.document_id.clone());
            }
        }
    }

    if ids.is_empty() {
        return documents.iter().map(|d| d.document_id.clone()).collect();
    }

    ids
}

/// Scans for `[Source: TITLE]`, where TITLE runs to the next unescaped `]`.
/// Non-overlapping: resumes scanning right after a matched closing bracket.
fn extract_titles(answer: &str) -> Vec<String> {
    let bytes = answer.as_bytes();
    let mut titles = Vec::new();
    let mut cursor = 0;

    while let Some(marker_offset) = answer[cursor..].find(MARKER) {
        let marker_start = cursor + marker_offset;
        let mut title_start = marker_start + MARKER.len();

        // Allow (and skip) a single space after the colon.
        if bytes.get(title_start) == Some(&b' ') {
            title_start += 1;
        }

        match find_unescaped_close(answer, title_start) {
            Some(close_idx) => {
                let title = answer[title_start..close_idx].trim();
                if !title.is_empty() {
                    titles.push(title.to_string());
                }
                cursor = close_idx + 1;
            }
            None => {
                // Unterminated marker: treat as literal text, resume right after it.
                cursor = title_start;
            }
        }
    }

    titles
}

fn find_unescaped_close(s: &str, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b']' && (i == 0 || bytes[i - 1] != b'\\') {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str) -> DocumentResultView {
        DocumentResultView {
            document_id: id.to_string(),
            document_title: title.to_string(),
            document_type: "article".to_string(),
            chunks: Vec::new(),
            best_rrf_score: 0.0,
            best_raw_similarity: 0.0,
            relevance_density: 0.0,
        }
    }

    #[test]
    fn resolves_known_citation_and_drops_unknown() {
        // spec §8 scenario 6.
        let answer = "X is true [Source: Intro to ML]. Y follows [Source: Unknown Doc].";
        let documents = vec![doc("doc-1", "Intro to ML"), doc("doc-2", "Advanced RAG")];

        let ids = resolve(answer, &documents);
        assert_eq!(ids, vec!["doc-1".to_string()]);
    }

    #[test]
    fn falls_back_to_all_contributing_documents_when_no_citations() {
        let answer = "No citations here.";
        let documents = vec![doc("doc-1", "Intro to ML"), doc("doc-2", "Advanced RAG")];

        let ids = resolve(answer, &documents);
        assert_eq!(ids, vec!["doc-1".to_string(), "doc-2".to_string()]);
    }

    #[test]
    fn unterminated_marker_is_treated_as_literal() {
        let answer = "Something [Source: truncated without a closing bracket";
        let documents = vec![doc("doc-1", "truncated without a closing bracket")];
        let ids = resolve(answer, &documents);
        // No closing bracket, so no title is extracted; falls back to all documents.
        assert_eq!(ids, vec!["doc-1".to_string()]);
    }

    #[test]
    fn duplicate_citations_are_deduplicated_and_ordered() {
        let answer = "[Source: A] then again [Source: A] then [Source: B]";
        let documents = vec![doc("id-a", "A"), doc("id-b", "B")];
        let ids = resolve(answer, &documents);
        assert_eq!(ids, vec!["id-a".to_string(), "id-b".to_string()]);
    }
}
