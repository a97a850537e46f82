//! Deterministic stand-ins for the hosted models, shared by unit tests.

use crate::embedding_service::Embedder;
use crate::gemini_service::ChatModel;
use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Embeds text as counts of a fixed keyword vocabulary.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    const KEYWORDS: [&'static str; 10] = [
        "login", "password", "token", "bill", "invoice", "audit", "logs", "access", "report", "csv",
    ];
    pub const DIMENSION: usize = Self::KEYWORDS.len();

    fn embed(text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; Self::DIMENSION];
        for word in text.to_lowercase().split_whitespace() {
            for (i, keyword) in Self::KEYWORDS.iter().enumerate() {
                if word.starts_with(keyword) {
                    embedding[i] += 1.0;
                }
            }
        }
        embedding
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::embed(text))
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_documents(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow::anyhow!("quota exceeded"))
    }

    async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Err(anyhow::anyhow!("quota exceeded"))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}

/// Drops the last embedding of every batch.
pub struct ShortEmbedder;

#[async_trait]
impl Embedder for ShortEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = KeywordEmbedder.embed_documents(texts).await?;
        embeddings.pop();
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        KeywordEmbedder.embed_query(text).await
    }

    fn model_name(&self) -> &str {
        "short-test"
    }
}

/// Records every prompt and answers with a canned reply.
#[derive(Default)]
pub struct RecordingChat {
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for RecordingChat {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        Ok(format!("reply {}", prompts.len()))
    }
}

pub fn chunks_from(texts: &[&str]) -> Vec<DocumentChunk> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| DocumentChunk {
            id: format!("chunk-{}", index),
            index,
            content: text.to_string(),
        })
        .collect()
}

pub fn metadata() -> IndexMetadata {
    IndexMetadata {
        embedding_model: String::new(),
        dimension: 0,
        chunk_size: 1000,
        chunk_overlap: 200,
        source: "design.pdf".to_string(),
    }
}
