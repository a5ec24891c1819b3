use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Content-addressed cache key derivation (C12, spec §4.12).
pub fn derive(insight_type_prefix: &str, query: &str, document_ids: &[String]) -> String {
    let encoded_query = URL_SAFE_NO_PAD.encode(query.as_bytes());

    let mut sorted_ids: Vec<&str> = document_ids.iter().map(String::as_str).collect();
    sorted_ids.sort_unstable();
    let joined_ids = sorted_ids.join(",");

    format!("{insight_type_prefix}:{encoded_query}:{joined_ids}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_independent_of_document_id_order() {
        let a = derive("direct_answer", "hello", &["b".to_string(), "a".to_string()]);
        let b = derive("direct_answer", "hello", &["a".to_string(), "b".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_for_different_queries() {
        let a = derive("direct_answer", "hello", &[]);
        let b = derive("direct_answer", "world", &[]);
        assert_ne!(a, b);
    }
}
