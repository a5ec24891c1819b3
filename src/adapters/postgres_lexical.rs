use crate::adapters::pool::DbPool;
use crate::models::ChunkHit;
use crate::ports::LexicalRetriever;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::debug;

/// Concrete C3 (spec §4.3): English full-text search via `chunks.lexical_index`,
/// ranked with `ts_rank_cd` (cover density, sensitive to proximity of terms).
pub struct PostgresLexicalRetriever {
    pool: DbPool,
}

impl PostgresLexicalRetriever {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct LexicalRow {
    chunk_id: String,
    document_id: String,
    document_title: String,
    document_type: String,
    chunk_text: String,
    chunk_order: i32,
    metadata: Json<HashMap<String, serde_json::Value>>,
    score: f32,
    total_chunks_in_document: i32,
}

impl From<LexicalRow> for ChunkHit {
    fn from(row: LexicalRow) -> Self {
        ChunkHit {
            chunk_id: row.chunk_id,
            document_id: row.document_id,
            document_title: row.document_title,
            document_type: row.document_type,
            chunk_text: row.chunk_text,
            order: row.chunk_order,
            metadata: row.metadata.0,
            score: row.score,
            total_chunks_in_document: row.total_chunks_in_document,
        }
    }
}

#[async_trait]
impl LexicalRetriever for PostgresLexicalRetriever {
    async fn search_lexical(
        &self,
        query_text: &str,
        max_results: usize,
        caller_id: Option<&str>,
        public_only: bool,
    ) -> Result<Vec<ChunkHit>> {
        let use_caller = !public_only && caller_id.is_some();

        let rows = sqlx::query_as::<_, LexicalRow>(
            r#"SELECT
                c.id AS chunk_id,
                c.document_id AS document_id,
                d.title AS document_title,
                d.doc_type AS document_type,
                c.chunk_text AS chunk_text,
                c."order" AS chunk_order,
                c.metadata AS metadata,
                ts_rank_cd(c.lexical_index, websearch_to_tsquery('english', $1))::real AS score,
                c.total_chunks_in_document AS total_chunks_in_document
               FROM chunks c
               JOIN documents d ON d.id = c.document_id
               WHERE d.status = 'indexed'
                 AND (d.is_public = true OR ($4 AND d.owner_id = $3))
                 AND c.lexical_index @@ websearch_to_tsquery('english', $1)
               ORDER BY score DESC
               LIMIT $2"#,
        )
        .bind(query_text)
        .bind(max_results as i64)
        .bind(caller_id)
        .bind(use_caller)
        .fetch_all(self.pool.get_pool())
        .await?;

        debug!(count = rows.len(), op = "lexical_search", "lexical_search_complete");

        Ok(rows.into_iter().map(ChunkHit::from).collect())
    }
}
