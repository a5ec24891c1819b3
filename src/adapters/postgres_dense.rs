use crate::adapters::pool::DbPool;
use crate::models::ChunkHit;
use crate::ports::DenseRetriever;
use anyhow::Result;
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::debug;

/// Concrete C2 (spec §4.2): cosine similarity search over `chunks.embedding`,
/// restricted to indexed documents visible to the caller.
pub struct PostgresDenseRetriever {
    pool: DbPool,
}

impl PostgresDenseRetriever {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DenseRow {
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

impl From<DenseRow> for ChunkHit {
    fn from(row: DenseRow) -> Self {
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
impl DenseRetriever for PostgresDenseRetriever {
    async fn search_dense(
        &self,
        query_vec: &[f32],
        similarity_threshold: f32,
        max_results: usize,
        caller_id: Option<&str>,
        public_only: bool,
    ) -> Result<Vec<ChunkHit>> {
        let vector = Vector::from(query_vec.to_vec());
        let use_caller = !public_only && caller_id.is_some();

        let rows = sqlx::query_as::<_, DenseRow>(
            r#"SELECT
                c.id AS chunk_id,
                c.document_id AS document_id,
                d.title AS document_title,
                d.doc_type AS document_type,
                c.chunk_text AS chunk_text,
                c."order" AS chunk_order,
                c.metadata AS metadata,
                (1.0 - (c.embedding <=> $1))::real AS score,
                c.total_chunks_in_document AS total_chunks_in_document
               FROM chunks c
               JOIN documents d ON d.id = c.document_id
               WHERE d.status = 'indexed'
                 AND (d.is_public = true OR ($5 AND d.owner_id = $4))
                 AND (1.0 - (c.embedding <=> $1)) >= $2
               ORDER BY c.embedding <=> $1
               LIMIT $3"#,
        )
        .bind(&vector)
        .bind(similarity_threshold)
        .bind(max_results as i64)
        .bind(caller_id)
        .bind(use_caller)
        .fetch_all(self.pool.get_pool())
        .await?;

        debug!(count = rows.len(), op = "dense_search", "dense_search_complete");

        Ok(rows.into_iter().map(ChunkHit::from).collect())
    }
}
