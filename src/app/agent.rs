//! The dispatch facade used by the CLI and by embedding applications.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::domain::{Draft, DraftId, Email, EmailId, NewDraft, PromptName, PromptTemplate};
use crate::providers::ai::{LlmProvider, OpenAiCompatibleProvider, OPENAI_BASE_URL};
use crate::services::{
    ConversationalAssistant, DraftComposer, GeneratedDraft, LlmGateway, ProcessingMode,
    ProcessingOrchestrator, ProcessingResult, ProcessingStep, PromptCatalog, UnconfiguredProvider,
};
use crate::storage::{mock_inbox, queries, Database, KeychainAccess, StorageLayer};

use super::error::{ServiceError, ServiceResult};

/// Owns the record store and every service, and validates incoming requests.
#[derive(Debug, Clone)]
pub struct AgentApp {
    storage: StorageLayer,
    catalog: PromptCatalog,
    processor: ProcessingOrchestrator,
    assistant: ConversationalAssistant,
    composer: DraftComposer,
    mock_inbox_path: PathBuf,
}

impl AgentApp {
    /// Wires the services around an opened store and a configured gateway.
    pub fn new(storage: StorageLayer, gateway: LlmGateway) -> Self {
        let catalog = PromptCatalog::new(storage.db().clone());

        Self {
            processor: ProcessingOrchestrator::new(catalog.clone(), gateway.clone()),
            assistant: ConversationalAssistant::new(gateway.clone()),
            composer: DraftComposer::new(catalog.clone(), gateway),
            catalog,
            storage,
            mock_inbox_path: crate::config::data_dir().join("mock_inbox.json"),
        }
    }

    /// Opens the store and builds the provider described by `settings`.
    pub async fn from_settings(settings: &Settings) -> ServiceResult<Self> {
        let storage = StorageLayer::new(&settings.database.path).await?;
        let provider = build_provider(settings, storage.keychain()).await?;
        let gateway = LlmGateway::new(provider)
            .with_temperature(settings.ai.temperature)
            .with_max_tokens(settings.ai.max_tokens);

        Ok(Self::new(storage, gateway)
            .with_mock_inbox_path(&settings.inbox.mock_inbox_path)
            .with_digest_limit(settings.inbox.chat_digest_limit))
    }

    pub fn with_mock_inbox_path(mut self, path: impl AsRef<Path>) -> Self {
        self.mock_inbox_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_digest_limit(mut self, limit: usize) -> Self {
        self.assistant = self.assistant.with_digest_limit(limit);
        self
    }

    fn db(&self) -> &Database {
        self.storage.db()
    }

    // ===== Emails =====

    /// All emails, newest first.
    pub async fn list_emails(&self) -> ServiceResult<Vec<Email>> {
        Ok(queries::emails::list(self.db()).await?)
    }

    pub async fn get_email(&self, id: &EmailId) -> ServiceResult<Email> {
        queries::emails::get_by_id(self.db(), id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Email".to_string()))
    }

    /// Imports the mock inbox file, writing the sample first if it is missing.
    ///
    /// Returns the number of emails imported. Re-importing an id replaces it.
    pub async fn load_mock_inbox(&self) -> ServiceResult<usize> {
        let imported = mock_inbox::load_or_create(&self.mock_inbox_path).await?;
        let emails: Vec<Email> = imported.into_iter().map(Email::from).collect();
        let count = queries::emails::upsert_all(self.db(), emails).await?;

        tracing::info!(count, path = %self.mock_inbox_path.display(), "Mock inbox loaded");
        Ok(count)
    }

    /// Runs the processing steps selected by `mode` and stores the results.
    ///
    /// Fields from failed steps are returned but not stored, so a transient
    /// model failure never overwrites an earlier good result.
    pub async fn process_email(
        &self,
        id: &EmailId,
        mode: ProcessingMode,
    ) -> ServiceResult<ProcessingResult> {
        let email = self.get_email(id).await?;
        let result = self.processor.process(&email, mode).await;

        let failed = |step: ProcessingStep| result.failures.iter().any(|f| f.step == step);
        let category = result
            .category
            .clone()
            .filter(|_| !failed(ProcessingStep::Categorize));
        let actions = result
            .actions
            .clone()
            .filter(|_| !failed(ProcessingStep::Actions));
        let summary = result
            .summary
            .clone()
            .filter(|_| !failed(ProcessingStep::Summary));

        if category.is_some() || actions.is_some() || summary.is_some() {
            queries::emails::update_processing(self.db(), id, category, actions, summary).await?;
        } else {
            tracing::warn!(email_id = %id, "No processing step succeeded, nothing stored");
        }

        Ok(result)
    }

    // ===== Prompts =====

    pub async fn list_prompts(&self) -> ServiceResult<BTreeMap<PromptName, PromptTemplate>> {
        Ok(self.catalog.list().await?)
    }

    pub async fn get_prompt(&self, name: &str) -> ServiceResult<PromptTemplate> {
        let name = parse_prompt_name(name)?;
        self.catalog
            .get(name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Prompt '{name}'")))
    }

    /// Replaces a template's content. Both fields are required.
    pub async fn update_prompt(&self, name: &str, content: &str) -> ServiceResult<()> {
        if name.is_empty() || content.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Name and content are required".to_string(),
            ));
        }
        let name = parse_prompt_name(name)?;
        Ok(self.catalog.set(name, content).await?)
    }

    // ===== Chat =====

    /// Answers a question about one email, or about the inbox when no id is given.
    pub async fn chat(&self, query: &str, email_id: Option<&EmailId>) -> ServiceResult<String> {
        if query.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("Query is required".to_string()));
        }

        let response = match email_id {
            Some(id) => {
                let email = self.get_email(id).await?;
                self.assistant.chat_about_email(&email, query).await?
            }
            None => {
                let emails = self.list_emails().await?;
                self.assistant.chat_about_inbox(&emails, query).await?
            }
        };
        Ok(response)
    }

    // ===== Drafts =====

    /// Stores a draft and returns it with its new id.
    pub async fn save_draft(&self, draft: NewDraft) -> ServiceResult<Draft> {
        let draft = draft.into_draft();
        queries::drafts::insert(self.db(), &draft).await?;
        tracing::info!(draft_id = %draft.id, "Draft saved");
        Ok(draft)
    }

    pub async fn get_draft(&self, id: &DraftId) -> ServiceResult<Draft> {
        queries::drafts::get_by_id(self.db(), id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Draft".to_string()))
    }

    /// All drafts, newest first.
    pub async fn list_drafts(&self) -> ServiceResult<Vec<Draft>> {
        Ok(queries::drafts::list(self.db()).await?)
    }

    /// Generates a draft, as a reply when an email id is given. Nothing is stored.
    pub async fn generate_draft(
        &self,
        email_id: Option<&EmailId>,
        instructions: &str,
    ) -> ServiceResult<GeneratedDraft> {
        let original = match email_id {
            Some(id) => Some(self.get_email(id).await?),
            None => None,
        };
        Ok(self
            .composer
            .generate_draft(original.as_ref(), instructions)
            .await?)
    }

    // ===== Credentials =====

    /// Stores the API key for `provider` in the OS keychain.
    pub async fn store_api_key(&self, provider: &str, api_key: &str) -> ServiceResult<()> {
        if api_key.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("API key is required".to_string()));
        }
        self.storage
            .keychain()
            .store(&KeychainAccess::ai_api_key(provider), api_key.trim())
            .await?;
        tracing::info!(provider, "API key stored in keychain");
        Ok(())
    }
}

fn parse_prompt_name(name: &str) -> ServiceResult<PromptName> {
    name.parse()
        .map_err(|e: crate::domain::UnknownPromptName| ServiceError::InvalidRequest(e.to_string()))
}

/// Looks up the API key in the environment, then in the keychain.
pub async fn resolve_api_key(settings: &Settings, keychain: &KeychainAccess) -> Option<String> {
    if let Ok(key) = std::env::var(&settings.ai.api_key_env) {
        if !key.trim().is_empty() {
            tracing::debug!(var = %settings.ai.api_key_env, "Using API key from environment");
            return Some(key.trim().to_string());
        }
    }

    keychain
        .retrieve(&KeychainAccess::ai_api_key(&settings.ai.provider))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Keychain lookup failed");
            None
        })
}

/// Builds the configured provider.
///
/// Without an API key the official endpoint cannot be used, so every call
/// fails as unavailable. Custom endpoints (local servers) are used without a key.
async fn build_provider(
    settings: &Settings,
    keychain: &KeychainAccess,
) -> ServiceResult<Arc<dyn LlmProvider>> {
    let api_key = resolve_api_key(settings, keychain).await;
    let is_official = settings.ai.base_url.trim_end_matches('/') == OPENAI_BASE_URL;

    if api_key.is_none() && is_official {
        tracing::warn!(
            var = %settings.ai.api_key_env,
            "No API key configured; model calls will fail"
        );
        return Ok(Arc::new(UnconfiguredProvider::new(format!(
            "no API key found in {} or the keychain",
            settings.ai.api_key_env
        ))));
    }

    let provider =
        OpenAiCompatibleProvider::custom(&settings.ai.base_url, api_key, &settings.ai.model)
            .with_timeout(settings.ai.timeout())?;
    tracing::info!(model = %settings.ai.model, base_url = %settings.ai.base_url, "LLM provider configured");
    Ok(Arc::new(provider))
}
