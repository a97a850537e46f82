use crate::models::*;
use crate::text_splitter::RecursiveCharacterSplitter;
use anyhow::Result;
use pdf_extract::extract_text;
use regex::Regex;
use std::panic::{self, UnwindSafe};
use std::path::Path;
use uuid::Uuid;

pub struct DocumentProcessor {
    splitter: RecursiveCharacterSplitter,
}

impl DocumentProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            splitter: RecursiveCharacterSplitter::new(chunk_size, chunk_overlap),
        }
    }

    pub fn splitter(&self) -> &RecursiveCharacterSplitter {
        &self.splitter
    }

    pub fn extract_pdf_text(&self, file_path: &Path) -> Result<Document> {
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());

        log::info!("Extracting text from {}...", file_path.display());

        if !file_path.is_file() {
            return Err(anyhow::anyhow!(
                "Error extracting text from PDF: {} is not a readable file",
                file_path.display()
            ));
        }

        let raw = guard_extraction(|| extract_text(file_path))?;
        let content = self.clean_text(&raw)?;

        log::info!("Extracted {} characters from PDF", content.chars().count());

        Ok(Document {
            id: Uuid::new_v4().to_string(),
            filename,
            content,
        })
    }

    pub fn create_chunks(&self, content: &str) -> Vec<DocumentChunk> {
        let chunks: Vec<DocumentChunk> = self
            .splitter
            .split_text(content)
            .into_iter()
            .enumerate()
            .map(|(index, content)| DocumentChunk {
                id: Uuid::new_v4().to_string(),
                index,
                content,
            })
            .collect();

        log::info!("Split document into {} chunks", chunks.len());
        chunks
    }

    /// Collapses runs of horizontal whitespace and excess blank lines left by
    /// PDF layout, keeping paragraph breaks for the splitter.
    fn clean_text(&self, text: &str) -> Result<String> {
        let re_spaces = Regex::new(r"[ \t\u{a0}\u{c}]+")?;
        let re_trailing = Regex::new(r" *\n *")?;
        let re_blank_lines = Regex::new(r"\n{3,}")?;

        let cleaned = re_spaces.replace_all(text, " ");
        let cleaned = re_trailing.replace_all(&cleaned, "\n");
        let cleaned = re_blank_lines.replace_all(&cleaned, "\n\n");

        Ok(cleaned.trim().to_string())
    }
}

/// pdf-extract panics on some malformed files; report those like any other
/// extraction failure.
fn guard_extraction<F, E>(extract: F) -> Result<String>
where
    F: FnOnce() -> std::result::Result<String, E> + UnwindSafe,
    E: std::fmt::Display,
{
    match panic::catch_unwind(extract) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(anyhow::anyhow!("Error extracting text from PDF: {}", e)),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "parser panicked".to_string());
            Err(anyhow::anyhow!("Error extracting text from PDF: {}", reason))
        }
    }
}
