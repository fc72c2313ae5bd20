use arrow_array::{
    types::Float32Type, Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray, TimestampMillisecondArray,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::sync::Arc;

use kbase_core::error::{Error, Result};
use kbase_core::traits::VectorStore;
use kbase_core::types::{StoredChunk, VectorHit};

use crate::schema::build_chunk_schema;
use crate::table::{ensure_table, index_err, open_db};

/// Chunks and their vectors in a LanceDB table, searched by cosine distance.
pub struct LanceVectorStore {
    table: Table,
    dim: usize,
}

impl LanceVectorStore {
    pub async fn open(uri: &str, table_name: &str, dim: usize) -> Result<Self> {
        let conn = open_db(uri).await?;
        ensure_table(&conn, table_name, build_chunk_schema(dim)).await?;
        let table = conn.open_table(table_name).execute().await.map_err(index_err)?;
        tracing::debug!(uri, table = table_name, dim, "opened vector store");
        Ok(Self { table, dim })
    }

    pub async fn count(&self) -> Result<usize> {
        self.table.count_rows(None).await.map_err(index_err)
    }

    fn to_record_batch(&self, chunks: &[StoredChunk], vectors: &[Vec<f32>]) -> Result<RecordBatch> {
        let now = Utc::now().timestamp_millis();
        let mut ids = Vec::with_capacity(chunks.len());
        let mut doc_ids = Vec::with_capacity(chunks.len());
        let mut ordinals = Vec::with_capacity(chunks.len());
        let mut contents = Vec::with_capacity(chunks.len());
        let mut hashes = Vec::with_capacity(chunks.len());
        let mut rows: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(chunks.len());
        for (chunk, vector) in chunks.iter().zip(vectors) {
            ids.push(chunk.id.clone());
            doc_ids.push(chunk.doc_id.clone());
            ordinals.push(i32::try_from(chunk.ordinal).map_err(|_| Error::InvalidInput(format!("ordinal {} too large", chunk.ordinal)))?);
            contents.push(chunk.content.clone());
            hashes.push(blake3::hash(chunk.content.as_bytes()).to_hex().to_string());
            rows.push(Some(vector.iter().map(|&x| Some(x)).collect()));
        }
        let created_at = vec![now; chunks.len()];
        RecordBatch::try_new(
            build_chunk_schema(self.dim),
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(doc_ids)),
                Arc::new(Int32Array::from(ordinals)),
                Arc::new(StringArray::from(contents)),
                Arc::new(StringArray::from(hashes)),
                Arc::new(TimestampMillisecondArray::from(created_at)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(rows, self.dim as i32)),
            ],
        )
        .map_err(index_err)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| index_err(format!("result column '{name}' missing")))
}

fn hits_from_batch(batch: &RecordBatch, out: &mut Vec<VectorHit>) -> Result<()> {
    let ids = string_column(batch, "id")?;
    let doc_ids = string_column(batch, "doc_id")?;
    let contents = string_column(batch, "content")?;
    let distances = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| index_err("result column '_distance' missing"))?;
    for i in 0..batch.num_rows() {
        let distance = if distances.is_null(i) { 1.0 } else { distances.value(i) };
        out.push(VectorHit {
            id: ids.value(i).to_string(),
            doc_id: doc_ids.value(i).to_string(),
            content: contents.value(i).to_string(),
            score: 1.0 - distance,
        });
    }
    Ok(())
}

pub(crate) fn check_upsert(chunks: &[StoredChunk], vectors: &[Vec<f32>], dim: usize) -> Result<()> {
    if chunks.len() != vectors.len() {
        return Err(Error::InvalidInput(format!(
            "{} chunks but {} vectors",
            chunks.len(),
            vectors.len()
        )));
    }
    if let Some(v) = vectors.iter().find(|v| v.len() != dim) {
        return Err(Error::InvalidInput(format!("vector has {} dimensions, index expects {dim}", v.len())));
    }
    Ok(())
}

#[async_trait]
impl VectorStore for LanceVectorStore {
    async fn upsert(&self, chunks: &[StoredChunk], vectors: &[Vec<f32>]) -> Result<()> {
        check_upsert(chunks, vectors, self.dim)?;
        if chunks.is_empty() {
            return Ok(());
        }
        let batch = self.to_record_batch(chunks, vectors)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        let mut merge = self.table.merge_insert(&["id"]);
        merge.when_matched_update_all(None).when_not_matched_insert_all();
        merge.execute(reader).await.map_err(index_err)?;
        tracing::debug!(rows = chunks.len(), "upserted chunks");
        Ok(())
    }

    async fn search(&self, query_vec: &[f32], top_k: usize) -> Result<Vec<VectorHit>> {
        if query_vec.len() != self.dim {
            return Err(Error::InvalidInput(format!(
                "query vector has {} dimensions, index expects {}",
                query_vec.len(),
                self.dim
            )));
        }
        if top_k == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }
        let mut stream = self
            .table
            .vector_search(query_vec.to_vec())
            .map_err(index_err)?
            .distance_type(DistanceType::Cosine)
            .limit(top_k)
            .execute()
            .await
            .map_err(index_err)?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(index_err)? {
            hits_from_batch(&batch, &mut hits)?;
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete_by_document(&self, doc_id: &str) -> Result<()> {
        let predicate = format!("doc_id = '{}'", doc_id.replace('\'', "''"));
        self.table.delete(&predicate).await.map_err(index_err)?;
        tracing::debug!(doc_id, "deleted document chunks");
        Ok(())
    }
}
