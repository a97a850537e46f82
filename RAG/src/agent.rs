use crate::config::AgentConfig;
use crate::document_processor::DocumentProcessor;
use crate::embedding_service::{Embedder, GeminiEmbeddings};
use crate::gemini_service::{ChatModel, GeminiService};
use crate::models::*;
use crate::query_service::QueryService;
use crate::vector_store::VectorStore;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Question answering and BDD scenario generation over one design document.
pub struct RagAgent {
    document: Document,
    query_service: QueryService,
}

impl RagAgent {
    /// Extracts the PDF, chunks and embeds it, and wires the QA and BDD chains.
    pub async fn setup(config: AgentConfig) -> Result<Self> {
        config.validate()?;
        log::info!("Initializing Smart RAG Agent with {}", config.pdf_path.display());

        let processor = DocumentProcessor::new(config.chunk_size, config.chunk_overlap);
        let document = processor.extract_pdf_text(&config.pdf_path)?;
        let (embedder, chat_model) = gemini_models(&config);

        let agent = Self::from_document(&config, document, embedder, chat_model).await?;

        log::info!("Smart RAG Agent setup complete!");
        Ok(agent)
    }

    /// Reuses an index written by [`RagAgent::save_vector_db`] instead of
    /// re-embedding the document.
    pub async fn load_from_saved(config: AgentConfig, vector_db_path: &Path) -> Result<Self> {
        config.validate()?;
        log::info!("Initializing Smart RAG Agent with {}", config.pdf_path.display());

        let processor = DocumentProcessor::new(config.chunk_size, config.chunk_overlap);
        let document = processor.extract_pdf_text(&config.pdf_path)?;
        let (embedder, chat_model) = gemini_models(&config);

        Self::from_saved_index(&config, document, vector_db_path, embedder, chat_model)
    }

    pub async fn from_document(
        config: &AgentConfig,
        document: Document,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        let processor = DocumentProcessor::new(config.chunk_size, config.chunk_overlap);
        let chunks = processor.create_chunks(&document.content);

        let metadata = IndexMetadata {
            embedding_model: embedder.model_name().to_string(),
            dimension: 0,
            chunk_size: processor.splitter().chunk_size(),
            chunk_overlap: processor.splitter().chunk_overlap(),
            source: document.filename.clone(),
        };
        let vector_store = VectorStore::from_texts(&chunks, embedder.as_ref(), metadata).await?;

        Ok(Self::from_components(
            document,
            vector_store,
            embedder,
            chat_model,
            config.top_k,
        ))
    }

    pub fn from_saved_index(
        config: &AgentConfig,
        document: Document,
        vector_db_path: &Path,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        let vector_store = VectorStore::load_local(vector_db_path)?;
        let metadata = vector_store.metadata();

        if metadata.embedding_model != embedder.model_name() {
            log::warn!(
                "Index was built with {}, queries will be embedded with {}",
                metadata.embedding_model,
                embedder.model_name()
            );
        }
        if metadata.source != document.filename {
            log::warn!(
                "Index was built from {}, not {}",
                metadata.source,
                document.filename
            );
        }
        if metadata.chunk_size != config.chunk_size || metadata.chunk_overlap != config.chunk_overlap {
            log::warn!(
                "Index uses chunk size {} / overlap {}, ignoring configured {} / {}",
                metadata.chunk_size,
                metadata.chunk_overlap,
                config.chunk_size,
                config.chunk_overlap
            );
        }

        Ok(Self::from_components(
            document,
            vector_store,
            embedder,
            chat_model,
            config.top_k,
        ))
    }

    pub fn from_components(
        document: Document,
        vector_store: VectorStore,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        let query_service = QueryService::new(vector_store, embedder, chat_model, top_k);
        log::info!("Chains set up successfully");

        Self {
            document,
            query_service,
        }
    }

    pub fn save_vector_db(&self, path: &Path) -> Result<()> {
        self.query_service.vector_store().save_local(path)
    }

    pub async fn answer_question(&self, question: &str) -> Result<String> {
        self.query_service.answer_question(question).await
    }

    pub async fn generate_bdd_scenarios(&self, feature: &str) -> Result<String> {
        self.query_service.generate_bdd_scenarios(feature).await
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn chunk_count(&self) -> usize {
        self.query_service.vector_store().len()
    }
}

fn gemini_models(config: &AgentConfig) -> (Arc<dyn Embedder>, Arc<dyn ChatModel>) {
    let embedder = GeminiEmbeddings::new(&config.api_base, &config.api_key, &config.embedding_model);
    let chat_model = GeminiService::new(
        &config.api_base,
        &config.api_key,
        &config.model_name,
        config.temperature,
        config.top_p,
    );
    (Arc::new(embedder), Arc::new(chat_model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;
    use crate::testing::{KeywordEmbedder, RecordingChat};

    const DESIGN_TEXT: &str = "Authentication\n\nThe login service validates passwords and issues session tokens.\n\nBilling\n\nA nightly job turns usage into invoices and exports CSV reports.\n\nAuditing\n\nEvery access is written to the audit logs.";

    fn config() -> AgentConfig {
        let mut config = AgentConfig::with_api_key("design.pdf", DEFAULT_MODEL, "key".to_string());
        config.chunk_size = 80;
        config.chunk_overlap = 10;
        config.top_k = 1;
        config
    }

    fn document() -> Document {
        Document {
            id: "doc-1".to_string(),
            filename: "design.pdf".to_string(),
            content: DESIGN_TEXT.to_string(),
        }
    }

    #[tokio::test]
    async fn test_from_document_indexes_every_chunk() {
        let config = config();
        let chat = Arc::new(RecordingChat::default());
        let agent = RagAgent::from_document(&config, document(), Arc::new(KeywordEmbedder), chat.clone())
            .await
            .unwrap();

        let expected = DocumentProcessor::new(80, 10).create_chunks(DESIGN_TEXT).len();
        assert_eq!(agent.chunk_count(), expected);
        assert_eq!(agent.document().filename, "design.pdf");

        agent.answer_question("where do audit logs go?").await.unwrap();
        assert!(chat.prompts()[0].contains("Every access is written to the audit logs."));
    }

    #[tokio::test]
    async fn test_saved_index_answers_like_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let config = config();

        let chat = Arc::new(RecordingChat::default());
        let agent = RagAgent::from_document(&config, document(), Arc::new(KeywordEmbedder), chat.clone())
            .await
            .unwrap();
        agent.save_vector_db(dir.path()).unwrap();
        agent.generate_bdd_scenarios("invoice export").await.unwrap();

        let reloaded_chat = Arc::new(RecordingChat::default());
        let reloaded = RagAgent::from_saved_index(
            &config,
            document(),
            dir.path(),
            Arc::new(KeywordEmbedder),
            reloaded_chat.clone(),
        )
        .unwrap();
        assert_eq!(reloaded.chunk_count(), agent.chunk_count());

        reloaded.generate_bdd_scenarios("invoice export").await.unwrap();
        assert_eq!(chat.prompts(), reloaded_chat.prompts());
    }

    #[tokio::test]
    async fn test_setup_fails_without_pdf() {
        let mut config = config();
        config.pdf_path = "/nonexistent/design.pdf".into();
        let err = RagAgent::setup(config).await.err().unwrap();
        assert!(err.to_string().starts_with("Error extracting text from PDF:"));
    }
}
