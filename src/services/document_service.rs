use std::sync::Arc;

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;

use crate::constants::prompts::{
    CATEGORIZE_DOCUMENT_PROMPT, VALIDATE_DOCUMENT_PROMPT, VOCABULARY_EXTRACTION_PROMPT,
};
use crate::errors::{AppError, AppResult};
use crate::models::domain::{Document, DocumentCategory};
use crate::repositories::DocumentRepository;
use crate::services::backend::{invoke_with_retry, GenerationBackend, RetryPolicy};
use crate::services::generation_service::{truncate_chars, DOCUMENT_CHAR_BUDGET};

/// Documents shorter than this are rejected before any backend call.
pub const MIN_DOCUMENT_CHARS: usize = 50;

const TOO_SHORT_REASON: &str =
    "The document is too short. Please provide at least 50 characters of text.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub reason: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CategoryReply {
    category: DocumentCategory,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct VocabularyReply {
    vocabulary_list: Vec<String>,
}

/// The document ingestion pipeline: validate, categorize and
/// vocabulary-extract uploaded text through the generation backend, then
/// persist the result.
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
    backend: Arc<dyn GenerationBackend>,
    retry: RetryPolicy,
}

impl DocumentService {
    pub fn new(repository: Arc<dyn DocumentRepository>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            repository,
            backend,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn ingest_document(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
    ) -> AppResult<Document> {
        let verdict = self.validate_document(content).await?;
        if !verdict.is_valid {
            return Err(AppError::ValidationError(verdict.reason));
        }

        let category = self.categorize_document(content).await?;
        let vocabulary = self.extract_vocabulary(content).await?;
        log::info!(
            "ingested document '{}' for owner {}: category={} vocabulary_terms={}",
            title,
            owner_id,
            category.label(),
            vocabulary.len()
        );

        let document = Document::new(owner_id, title, category, content, vocabulary);
        self.repository.create(document).await
    }

    /// Judge whether the text is suitable for generating learning games.
    /// Trivially short documents are refused locally without a backend call.
    pub async fn validate_document(&self, content: &str) -> AppResult<ValidationVerdict> {
        if content.chars().count() < MIN_DOCUMENT_CHARS {
            return Ok(ValidationVerdict {
                is_valid: false,
                reason: TOO_SHORT_REASON.to_string(),
            });
        }

        let instructions = format!("{}\n\nDocument Text: {}", VALIDATE_DOCUMENT_PROMPT, content);
        let schema = schema_value::<ValidationVerdict>()?;
        let value = self
            .backend
            .invoke(&instructions, &schema)
            .await
            .map_err(|e| {
                log::error!("document validation call failed: {}", e);
                AppError::GenerationFailure
            })?;

        serde_json::from_value(value).map_err(|e| {
            log::error!("document validation reply did not match contract: {}", e);
            AppError::GenerationFailure
        })
    }

    /// Classify the text into one of the closed subject categories.
    pub async fn categorize_document(&self, content: &str) -> AppResult<DocumentCategory> {
        let truncated = truncate_chars(content, DOCUMENT_CHAR_BUDGET);
        let instructions = format!(
            "{}\n\nDocument Text (truncated): {}",
            CATEGORIZE_DOCUMENT_PROMPT, truncated
        );
        let schema = schema_value::<CategoryReply>()?;
        let value = self
            .backend
            .invoke(&instructions, &schema)
            .await
            .map_err(|e| {
                log::error!("document categorization call failed: {}", e);
                AppError::GenerationFailure
            })?;

        let reply: CategoryReply = serde_json::from_value(value).map_err(|e| {
            log::error!("categorization reply did not match contract: {}", e);
            AppError::GenerationFailure
        })?;
        Ok(reply.category)
    }

    /// Extract key vocabulary for game personalization, retried like session
    /// generation.
    pub async fn extract_vocabulary(&self, content: &str) -> AppResult<Vec<String>> {
        let instructions = format!(
            "{}\n\nDocument Text: {}",
            VOCABULARY_EXTRACTION_PROMPT, content
        );
        let schema = schema_value::<VocabularyReply>()?;
        let value = invoke_with_retry(self.backend.as_ref(), self.retry, &instructions, &schema)
            .await
            .map_err(|e| {
                log::error!("vocabulary extraction failed after retries: {}", e);
                AppError::GenerationFailure
            })?;

        let reply: VocabularyReply = serde_json::from_value(value).map_err(|e| {
            log::error!("vocabulary reply did not match contract: {}", e);
            AppError::GenerationFailure
        })?;
        Ok(reply.vocabulary_list)
    }

    pub async fn get_document(&self, id: &str) -> AppResult<Document> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document with id '{}' not found", id)))
    }

    pub async fn list_documents(&self, owner_id: &str) -> AppResult<Vec<Document>> {
        self.repository.list_by_owner(owner_id).await
    }

    pub async fn delete_document(&self, id: &str) -> AppResult<()> {
        self.repository.delete(id).await
    }
}

fn schema_value<T: JsonSchema>() -> AppResult<serde_json::Value> {
    serde_json::to_value(schema_for!(T))
        .map_err(|e| AppError::InternalError(format!("schema serialization failed: {}", e)))
}
