/// A coarse classification of the incoming query, attached to the response
/// only when `debug=true` (spec §4.13 supplement). Purely advisory: it never
/// changes retrieval or insight behavior, only what gets logged/returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryComplexityHint {
    /// Single short clause, likely a lookup ("what is X").
    Simple,
    /// Multiple clauses or comparison language ("compare X and Y").
    Compound,
    /// Carries summarization/overview language ("summarize", "overview of").
    Broad,
}

const BROAD_MARKERS: &[&str] = &["summarize", "summary", "overview", "overall", "tell me about"];
const COMPOUND_MARKERS: &[&str] = &[" and ", " vs ", " versus ", " compare", "difference between"];

/// Pattern-matches surface language in the query text; no ML involved, same
/// as the reference implementation's `query_analyzer.rs` heuristics.
pub fn classify(query: &str) -> QueryComplexityHint {
    let lower = query.to_lowercase();

    if BROAD_MARKERS.iter().any(|m| lower.contains(m)) {
        return QueryComplexityHint::Broad;
    }

    if COMPOUND_MARKERS.iter().any(|m| lower.contains(m)) {
        return QueryComplexityHint::Compound;
    }

    QueryComplexityHint::Simple
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_broad_queries() {
        assert_eq!(classify("Can you summarize the onboarding guide?"), QueryComplexityHint::Broad);
        assert_eq!(classify("Give me an overview of Q3 results"), QueryComplexityHint::Broad);
    }

    #[test]
    fn detects_compound_queries() {
        assert_eq!(
            classify("Compare the pricing of plan A and plan B"),
            QueryComplexityHint::Compound
        );
        assert_eq!(classify("What is the difference between staging and prod?"), QueryComplexityHint::Compound);
    }

    #[test]
    fn falls_back_to_simple() {
        assert_eq!(classify("What is the refund window?"), QueryComplexityHint::Simple);
    }
}
