use crate::embedding_service::Embedder;
use crate::gemini_service::ChatModel;
use crate::models::*;
use crate::prompts::{build_bdd_prompt, build_context, build_qa_prompt};
use crate::vector_store::VectorStore;
use anyhow::Result;
use std::sync::Arc;

/// Retrieves context from the index and forwards prompts to the chat model.
pub struct QueryService {
    vector_store: VectorStore,
    embedder: Arc<dyn Embedder>,
    chat_model: Arc<dyn ChatModel>,
    top_k: usize,
}

impl QueryService {
    pub fn new(
        vector_store: VectorStore,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        log::info!("Setting up QA and BDD generation chains...");

        Self {
            vector_store,
            embedder,
            chat_model,
            top_k,
        }
    }

    pub fn vector_store(&self) -> &VectorStore {
        &self.vector_store
    }

    pub async fn answer_question(&self, question: &str) -> Result<String> {
        log::info!("Answering question: {}", question);

        let hits = self.retrieve(question).await?;
        let prompt = build_qa_prompt(question, &build_context(&hits));
        self.chat_model.generate(&prompt).await
    }

    pub async fn generate_bdd_scenarios(&self, feature: &str) -> Result<String> {
        log::info!("Generating BDD scenarios for: {}", feature);

        let hits = self.retrieve(feature).await?;
        let prompt = build_bdd_prompt(feature, &build_context(&hits));
        self.chat_model.generate(&prompt).await
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.vector_store
            .similarity_search(query, self.top_k, self.embedder.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{chunks_from, metadata, KeywordEmbedder, RecordingChat};

    async fn service(top_k: usize) -> (QueryService, Arc<RecordingChat>) {
        let chunks = chunks_from(&[
            "The login service validates passwords.",
            "Invoices are generated by the billing job.",
            "CSV reports are emailed weekly.",
        ]);
        let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder);
        let store = VectorStore::from_texts(&chunks, embedder.as_ref(), metadata())
            .await
            .unwrap();
        let chat = Arc::new(RecordingChat::default());
        (
            QueryService::new(store, embedder, chat.clone(), top_k),
            chat,
        )
    }

    #[tokio::test]
    async fn test_answer_question_uses_retrieved_context() {
        let (service, chat) = service(1).await;

        let answer = service.answer_question("Who checks the password?").await.unwrap();
        assert_eq!(answer, "reply 1");

        let prompts = chat.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("The login service validates passwords."));
        assert!(!prompts[0].contains("billing job"));
        assert!(prompts[0].contains("Question: Who checks the password?"));
    }

    #[tokio::test]
    async fn test_generate_bdd_scenarios_uses_bdd_prompt() {
        let (service, chat) = service(5).await;

        let scenarios = service.generate_bdd_scenarios("invoice billing").await.unwrap();
        assert_eq!(scenarios, "reply 1");

        let prompts = chat.prompts();
        let prompt = &prompts[0];
        assert!(prompt.contains("Feature or component to create BDD scenarios for: invoice billing"));
        let billing = prompt.find("billing job").unwrap();
        let login = prompt.find("login service").unwrap();
        assert!(billing < login, "closest chunk comes first");
    }
}
