use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Gemini accepts at most this many requests per batchEmbedContents call.
const MAX_BATCH_SIZE: usize = 100;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds chunk texts for storage in the index, preserving order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str;
}

pub struct GeminiEmbeddings {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiEmbeddings {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Self {
        log::info!("Initializing embedding model {}", model);

        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}:{}?key={}", self.api_base, self.model, method, self.api_key)
    }

    fn content_request(&self, text: &str, task_type: &str) -> EmbedContentRequest {
        EmbedContentRequest {
            model: self.model.clone(),
            content: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: text.to_string(),
                }],
            },
            task_type: task_type.to_string(),
        }
    }

    fn batch_request(&self, texts: &[String]) -> BatchEmbedRequest {
        BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| self.content_request(text, "RETRIEVAL_DOCUMENT"))
                .collect(),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(self.endpoint("batchEmbedContents"))
            .json(&self.batch_request(texts))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("Gemini embedding API error: {}", error_text));
        }

        let batch: BatchEmbedResponse = response.json().await?;
        batch_values(batch, texts.len())
    }
}

fn batch_values(batch: BatchEmbedResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    if batch.embeddings.len() != expected {
        return Err(anyhow::anyhow!(
            "Gemini embedding API returned {} embeddings for {} texts",
            batch.embeddings.len(),
            expected
        ));
    }

    Ok(batch.embeddings.into_iter().map(|e| e.values).collect())
}

#[async_trait]
impl Embedder for GeminiEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_BATCH_SIZE) {
            embeddings.extend(self.embed_batch(batch).await?);
            log::debug!("Embedded {}/{} chunks", embeddings.len(), texts.len());
        }

        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(self.endpoint("embedContent"))
            .json(&self.content_request(text, "RETRIEVAL_QUERY"))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("Gemini embedding API error: {}", error_text));
        }

        let embedded: EmbedContentResponse = response.json().await?;
        Ok(embedded.embedding.values)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

pub fn l2_distance(embedding1: &[f32], embedding2: &[f32]) -> f32 {
    embedding1
        .iter()
        .zip(embedding2.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}

pub fn cosine_similarity(embedding1: &[f32], embedding2: &[f32]) -> f32 {
    let min_len = embedding1.len().min(embedding2.len());

    let dot_product: f32 = embedding1[..min_len]
        .iter()
        .zip(embedding2[..min_len].iter())
        .map(|(a, b)| a * b)
        .sum();

    let norm1: f32 = embedding1[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm2: f32 = embedding2[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm1 == 0.0 || norm2 == 0.0 {
        0.0
    } else {
        dot_product / (norm1 * norm2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_shape() {
        let embeddings = GeminiEmbeddings::new(
            "https://example.test/v1beta/",
            "secret",
            "models/embedding-001",
        );
        let request = embeddings.batch_request(&["alpha".to_string(), "beta".to_string()]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["requests"].as_array().unwrap().len(), 2);
        assert_eq!(json["requests"][0]["model"], "models/embedding-001");
        assert_eq!(json["requests"][0]["taskType"], "RETRIEVAL_DOCUMENT");
        assert_eq!(json["requests"][1]["content"]["parts"][0]["text"], "beta");
        assert!(json["requests"][0]["content"].get("role").is_none());
    }

    #[test]
    fn test_endpoint() {
        let embeddings = GeminiEmbeddings::new(
            "https://example.test/v1beta/",
            "secret",
            "models/embedding-001",
        );
        assert_eq!(
            embeddings.endpoint("embedContent"),
            "https://example.test/v1beta/models/embedding-001:embedContent?key=secret"
        );
    }

    #[test]
    fn test_parse_batch_response() {
        let body = r#"{"embeddings":[{"values":[0.1,0.2]},{"values":[0.3,0.4]}]}"#;
        let parsed: BatchEmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
        assert_eq!(parsed.embeddings[1].values, vec![0.3, 0.4]);
    }

    #[test]
    fn test_batch_with_missing_embeddings_is_rejected() {
        let body = r#"{"embeddings":[{"values":[0.1,0.2]}]}"#;
        let parsed: BatchEmbedResponse = serde_json::from_str(body).unwrap();
        let err = batch_values(parsed, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gemini embedding API returned 1 embeddings for 2 texts"
        );

        let parsed: BatchEmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(batch_values(parsed, 1).unwrap(), vec![vec![0.1, 0.2]]);
    }

    #[test]
    fn test_cosine_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[0.5, 2.0], &[0.5, 2.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_l2_distance() {
        assert_eq!(l2_distance(&[0.0, 3.0], &[4.0, 0.0]), 5.0);
        assert_eq!(l2_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }
}
