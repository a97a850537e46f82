pub mod agent;
pub mod config;
pub mod document_processor;
pub mod embedding_service;
pub mod gemini_service;
pub mod interactive;
pub mod models;
pub mod prompts;
pub mod query_service;
pub mod text_splitter;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use agent::RagAgent;
pub use config::AgentConfig;
pub use document_processor::DocumentProcessor;
pub use embedding_service::{Embedder, GeminiEmbeddings};
pub use gemini_service::{ChatModel, GeminiService};
pub use interactive::{run_interactive, UserRequest};
pub use models::*;
pub use query_service::QueryService;
pub use text_splitter::RecursiveCharacterSplitter;
pub use vector_store::VectorStore;
