use crate::models::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiService {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
}

impl GeminiService {
    pub fn new(api_base: &str, api_key: &str, model: &str, temperature: f32, top_p: f32) -> Self {
        log::info!("Initializing chat model {}", model);

        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
            top_p,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        )
    }

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.temperature,
                top_p: self.top_p,
            }),
        }
    }
}

#[async_trait]
impl ChatModel for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url())
            .json(&self.build_request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("Gemini API error: {}", error_text));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        Ok(response_text(gemini_response))
    }
}

/// Concatenates the text parts of the first candidate.
fn response_text(response: GeminiResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "No response generated".to_string())
}
