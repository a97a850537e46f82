use crate::embedding_service::{l2_distance, Embedder};
use crate::models::*;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const INDEX_FILE: &str = "index.json";

/// Flat (exact) vector index over document chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStore {
    metadata: IndexMetadata,
    entries: Vec<IndexEntry>,
}

impl VectorStore {
    /// Embeds every chunk and builds the index, one entry per chunk.
    pub async fn from_texts(
        chunks: &[DocumentChunk],
        embedder: &dyn Embedder,
        mut metadata: IndexMetadata,
    ) -> Result<Self> {
        log::info!("Creating vector database...");

        if chunks.is_empty() {
            return Err(anyhow::anyhow!(
                "Error creating vector database: the document produced no text chunks"
            ));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder
            .embed_documents(&texts)
            .await
            .map_err(|e| anyhow::anyhow!("Error creating vector database: {}", e))?;

        if embeddings.len() != chunks.len() {
            return Err(anyhow::anyhow!(
                "Error creating vector database: got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            ));
        }

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                chunk_id: chunk.id.clone(),
                content: chunk.content.clone(),
                embedding,
            })
            .collect();

        metadata.dimension = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        metadata.embedding_model = embedder.model_name().to_string();

        let store = Self { metadata, entries };
        store
            .check_invariants()
            .map_err(|e| anyhow::anyhow!("Error creating vector database: {}", e))?;

        log::info!("Vector database created successfully ({} entries)", store.len());
        Ok(store)
    }

    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<SearchHit>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = embedder.embed_query(query).await?;
        if query_embedding.len() != self.metadata.dimension {
            return Err(anyhow::anyhow!(
                "Query embedding has dimension {}, index expects {}",
                query_embedding.len(),
                self.metadata.dimension
            ));
        }

        Ok(self.search_by_vector(&query_embedding, k))
    }

    /// Nearest entries by L2 distance; equal distances keep insertion order.
    pub fn search_by_vector(&self, query_embedding: &[f32], k: usize) -> Vec<SearchHit> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(position, entry)| (position, l2_distance(query_embedding, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .take(k)
            .map(|(position, distance)| SearchHit {
                position,
                content: self.entries[position].content.clone(),
                distance,
            })
            .collect();

        log::debug!("Found {} relevant chunks", hits.len());
        hits
    }

    pub fn save_local(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory {}", dir.display()))?;

        let path = dir.join(INDEX_FILE);
        let json = serde_json::to_string(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write vector index {}", path.display()))?;

        log::info!("Vector database saved to {}", dir.display());
        Ok(())
    }

    pub fn load_local(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read vector index {}", path.display()))?;
        let store: Self = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt vector index {}", path.display()))?;

        store.check_invariants()?;

        log::info!("Loaded vector database from {}", dir.display());
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    fn check_invariants(&self) -> Result<()> {
        for (position, entry) in self.entries.iter().enumerate() {
            if entry.embedding.is_empty() {
                return Err(anyhow::anyhow!("entry {} has an empty embedding", position));
            }
            if entry.embedding.len() != self.metadata.dimension {
                return Err(anyhow::anyhow!(
                    "entry {} has dimension {}, index expects {}",
                    position,
                    entry.embedding.len(),
                    self.metadata.dimension
                ));
            }
        }
        Ok(())
    }
}
