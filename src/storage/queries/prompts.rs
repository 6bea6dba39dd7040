//! Prompt template queries.
//!
//! One row per [`PromptName`]; rows are seeded at open and only ever updated.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{PromptName, PromptTemplate};
use crate::storage::database::{Database, Result};

/// Inserts every default template that is not already present.
///
/// Returns the number of rows inserted. Existing (possibly edited) templates
/// are left untouched.
pub fn seed_defaults(conn: &Connection) -> rusqlite::Result<usize> {
    let now = Utc::now().to_rfc3339();
    let mut inserted = 0;

    for name in PromptName::ALL {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO prompts (name, content, description, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                name.as_str(),
                name.default_content(),
                name.description(),
                now
            ],
        )?;
    }

    Ok(inserted)
}

/// Retrieves a template by name.
pub async fn get(db: &Database, name: PromptName) -> Result<Option<PromptTemplate>> {
    db.with_conn(move |conn| {
        let template = conn
            .query_row(
                "SELECT name, content, description, updated_at FROM prompts WHERE name = ?1",
                params![name.as_str()],
                row_to_template,
            )
            .optional()?;
        Ok(template.flatten())
    })
    .await
}

/// Retrieves every known template, ordered by name.
///
/// Rows whose name is not a known template are skipped.
pub async fn list(db: &Database) -> Result<Vec<PromptTemplate>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT name, content, description, updated_at FROM prompts ORDER BY name",
        )?;

        let rows = stmt.query_map([], row_to_template)?;
        let mut templates = Vec::new();
        for row in rows {
            if let Some(template) = row? {
                templates.push(template);
            }
        }
        Ok(templates)
    })
    .await
}

/// Overwrites a template's content and bumps its timestamp.
///
/// Returns `false` if no row exists for the name.
pub async fn set_content(db: &Database, name: PromptName, content: &str) -> Result<bool> {
    let content = content.to_string();

    db.with_conn(move |conn| {
        let updated = conn.execute(
            "UPDATE prompts SET content = ?1, updated_at = ?2 WHERE name = ?3",
            params![content, Utc::now().to_rfc3339(), name.as_str()],
        )?;
        Ok(updated > 0)
    })
    .await
}

fn row_to_template(row: &Row<'_>) -> rusqlite::Result<Option<PromptTemplate>> {
    let name: String = row.get(0)?;
    let Ok(name) = name.parse::<PromptName>() else {
        tracing::warn!(%name, "Ignoring unknown prompt template row");
        return Ok(None);
    };

    let updated_at: String = row.get(3)?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(Some(PromptTemplate {
        name,
        content: row.get(1)?,
        description: row.get(2)?,
        updated_at,
    }))
}
