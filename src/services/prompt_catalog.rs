//! Prompt catalog: the editable instruction templates.
//!
//! Reads and writes go straight through to the record store; there is no
//! cache, so an edit is visible to the next processing call.

use std::collections::BTreeMap;

use crate::domain::{PromptName, PromptTemplate};
use crate::storage::{queries, Database, DatabaseError};

use super::gateway::{FailureReason, GatewayFailure, GatewayResult};

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Handle to the prompt templates stored in a [`Database`].
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    db: Database,
}

impl PromptCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Gets a template, or `None` if its row is missing.
    pub async fn get(&self, name: PromptName) -> Result<Option<PromptTemplate>> {
        queries::prompts::get(&self.db, name).await
    }

    /// Gets only the instruction text of a template.
    pub async fn content(&self, name: PromptName) -> Result<Option<String>> {
        Ok(self.get(name).await?.map(|t| t.content))
    }

    /// Gets the instruction text a gateway call cannot run without.
    ///
    /// A missing row or an unreadable store is reported as an
    /// [`FailureReason::Unavailable`] failure so it travels with the other
    /// per-step failures.
    pub async fn required_content(&self, name: PromptName) -> GatewayResult<String> {
        match self.content(name).await {
            Ok(Some(content)) => Ok(content),
            Ok(None) => Err(GatewayFailure::new(
                FailureReason::Unavailable,
                format!("prompt template '{name}' is missing"),
            )),
            Err(e) => Err(GatewayFailure::new(
                FailureReason::Unavailable,
                format!("could not read prompt template '{name}': {e}"),
            )),
        }
    }

    /// Overwrites a template's content and timestamp.
    ///
    /// The content is stored verbatim; placeholders are not checked. A missing
    /// row is recreated with the static description.
    pub async fn set(&self, name: PromptName, content: &str) -> Result<()> {
        if !queries::prompts::set_content(&self.db, name, content).await? {
            tracing::warn!(%name, "Prompt row missing, restoring defaults before update");
            self.db
                .with_conn(|conn| Ok(queries::prompts::seed_defaults(conn)?))
                .await?;
            queries::prompts::set_content(&self.db, name, content).await?;
        }

        tracing::info!(%name, chars = content.len(), "Prompt template updated");
        Ok(())
    }

    /// All templates keyed by name.
    pub async fn list(&self) -> Result<BTreeMap<PromptName, PromptTemplate>> {
        Ok(queries::prompts::list(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.name, t))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn catalog() -> PromptCatalog {
        PromptCatalog::new(Database::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn list_contains_every_name() {
        let catalog = catalog().await;
        let templates = catalog.list().await.unwrap();

        let names: Vec<PromptName> = templates.keys().copied().collect();
        let mut expected = PromptName::ALL.to_vec();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn set_then_get() {
        let catalog = catalog().await;
        catalog
            .set(PromptName::Summary, "One sentence, please.")
            .await
            .unwrap();

        assert_eq!(
            catalog.content(PromptName::Summary).await.unwrap().as_deref(),
            Some("One sentence, please.")
        );
    }

    #[tokio::test]
    async fn set_does_not_validate_content() {
        let catalog = catalog().await;
        catalog
            .set(PromptName::Categorization, "{{unclosed placeholder")
            .await
            .unwrap();

        let template = catalog.get(PromptName::Categorization).await.unwrap().unwrap();
        assert_eq!(template.content, "{{unclosed placeholder");
    }

    #[tokio::test]
    async fn set_recreates_missing_row() {
        let db = Database::open_in_memory().await.unwrap();
        db.with_conn(|conn| {
            conn.execute("DELETE FROM prompts", [])?;
            Ok(())
        })
        .await
        .unwrap();

        let catalog = PromptCatalog::new(db);
        assert!(catalog.get(PromptName::AutoReply).await.unwrap().is_none());

        catalog.set(PromptName::AutoReply, "Reply warmly.").await.unwrap();

        let template = catalog.get(PromptName::AutoReply).await.unwrap().unwrap();
        assert_eq!(template.content, "Reply warmly.");
        assert_eq!(template.description, "Generate automatic email replies");
    }

    #[tokio::test]
    async fn required_content_reports_missing_row() {
        let db = Database::open_in_memory().await.unwrap();
        db.with_conn(|conn| {
            conn.execute("DELETE FROM prompts WHERE name = 'auto_reply'", [])?;
            Ok(())
        })
        .await
        .unwrap();
        let catalog = PromptCatalog::new(db);

        let failure = catalog
            .required_content(PromptName::AutoReply)
            .await
            .unwrap_err();
        assert_eq!(failure.reason, FailureReason::Unavailable);
        assert!(failure.detail.contains("auto_reply"));
        assert!(catalog
            .required_content(PromptName::Summary)
            .await
            .is_ok());
    }
}
