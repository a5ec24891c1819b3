use crate::models::DocumentResultView;
use crate::ports::llm::ChatMessage;

const MAX_SUMMARY_CHUNKS_PER_DOC: usize = 6;
const MAX_ANSWER_CHUNKS_PER_DOC: usize = 4;
const MAX_ANSWER_CHUNKS_TOTAL: usize = 16;

/// Prompt Assembler (C9, spec §4.9). Pure, deterministic — no I/O.
pub struct PromptAssembler;

impl PromptAssembler {
    /// One prompt per document: the top chunks for that document alone.
    pub fn document_summary_prompt(query: &str, document: &DocumentResultView) -> Vec<ChatMessage> {
        let mut chunks = document.chunks.clone();
        chunks.sort_by(|a, b| b.rrf_score.partial_cmp(&a.rrf_score).unwrap());
        chunks.truncate(MAX_SUMMARY_CHUNKS_PER_DOC);

        let context = chunks.iter().map(|c| c.chunk_text.as_str()).collect::<Vec<_>>().join("\n\n");

        let system = ChatMessage::system(
            "You summarize how a single document relates to a user's question. \
             Respond with strict JSON: {\"relevance_summary\": string, \"confidence_score\": number between 0 and 1}. \
             The summary must be exactly one sentence.",
        );
        let user = ChatMessage::user(format!(
            "User query: {query}\n\nDocument title: {title}\n\nDocument excerpts:\n{context}",
            title = document.document_title,
        ));

        vec![system, user]
    }

    /// Global context: the top chunks across all documents, capped at 16.
    pub fn direct_answer_prompt(query: &str, documents: &[DocumentResultView]) -> Vec<ChatMessage> {
        let context = Self::global_context(documents);

        let system = ChatMessage::system(
            "You answer a user's question using only the provided excerpts. \
             Every claim must be followed by a citation marker in the exact form \
             `[Source: <document title>]`, using the title verbatim as given. \
             Respond with strict JSON: {\"answer_markdown\": string, \"confidence\": number between 0 and 1, \
             \"source_document_titles\": [string]}.",
        );
        let user = ChatMessage::user(format!("User query: {query}\n\nExcerpts:\n{context}"));

        vec![system, user]
    }

    /// Reuses the same 16-chunk global context as direct_answer (spec §4.9).
    pub fn related_questions_prompt(query: &str, documents: &[DocumentResultView]) -> Vec<ChatMessage> {
        let context = Self::global_context(documents);

        let system = ChatMessage::system(
            "Given the user's query and the excerpts below, propose exactly three follow-up \
             questions a curious reader would ask next. Each must be tagged with a category of \
             Strategic, Technical, or Adoption, and a relevance score strictly between 0.5 and 0.95 \
             (avoid round numbers like 0.7 or 0.8 exactly, to keep scores realistic). \
             Respond with strict JSON: {\"questions\": [{\"question\": string, \"relevance\": number, \
             \"category\": \"Strategic\"|\"Technical\"|\"Adoption\"}]}.",
        );
        let user = ChatMessage::user(format!("User query: {query}\n\nExcerpts:\n{context}"));

        vec![system, user]
    }

    fn global_context(documents: &[DocumentResultView]) -> String {
        let mut picks: Vec<(String, String, f32)> = Vec::new();
        for doc in documents {
            let mut chunks = doc.chunks.clone();
            chunks.sort_by(|a, b| b.rrf_score.partial_cmp(&a.rrf_score).unwrap());
            chunks.truncate(MAX_ANSWER_CHUNKS_PER_DOC);
            for chunk in chunks {
                picks.push((doc.document_title.clone(), chunk.chunk_text, chunk.rrf_score));
            }
        }

        picks.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap());
        picks.truncate(MAX_ANSWER_CHUNKS_TOTAL);

        picks
            .into_iter()
            .map(|(title, text, _)| format!("[Source: {title}]\n{text}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
