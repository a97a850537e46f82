use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DB_PATH: &str = "vectorstore";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub pdf_path: PathBuf,
    pub model_name: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub api_base: String,
    pub api_key: String,
}

impl AgentConfig {
    /// Builds a config with the default pipeline settings, reading the
    /// credential from the environment.
    pub fn new(pdf_path: impl Into<PathBuf>, model_name: &str) -> Result<Self> {
        let api_key = api_key_from(env::var(API_KEY_VAR).ok())?;
        Ok(Self::with_api_key(pdf_path, model_name, api_key))
    }

    pub fn with_api_key(pdf_path: impl Into<PathBuf>, model_name: &str, api_key: String) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            model_name: model_path(model_name),
            embedding_model: model_path(DEFAULT_EMBEDDING_MODEL),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            temperature: 0.2,
            top_p: 0.95,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(anyhow::anyhow!("chunk size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(anyhow::anyhow!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap,
                self.chunk_size
            ));
        }
        if self.top_k == 0 {
            return Err(anyhow::anyhow!("top-k must be greater than zero"));
        }
        Ok(())
    }
}

fn api_key_from(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(anyhow::anyhow!(
            "{} not found in environment. Please set it.",
            API_KEY_VAR
        )),
    }
}

/// Gemini addresses models as `models/<name>`; accept either form.
pub fn model_path(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("models/") {
        name.to_string()
    } else {
        format!("models/{}", name)
    }
}
