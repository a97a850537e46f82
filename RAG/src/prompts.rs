use crate::models::SearchHit;

pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_qa_prompt(question: &str, context: &str) -> String {
    format!(
        r#"You are an expert in software design documents, acting as a smart agent to provide accurate information.
Answer the user's question based on the retrieved context from the software design document.
If you don't know the answer based on the context, say so clearly without making up information.

Context from the design document:
{context}

Question: {question}

Answer:"#
    )
}

pub fn build_bdd_prompt(feature: &str, context: &str) -> String {
    format!(
        r#"You are an expert in behavior-driven development (BDD) and software design documents.
Generate detailed BDD scenarios in Gherkin syntax based on the context from a software design document.
Focus on creating scenarios that validate the core functionality described in the document.

Context from the design document:
{context}

Feature or component to create BDD scenarios for: {feature}

Generate 3-5 BDD scenarios in proper Gherkin format (Feature, Scenario, Given, When, Then) that test the functionality of this component or feature:"#
    )
}
