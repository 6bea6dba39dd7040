//! Draft database queries.
//!
//! Drafts are insert-only: there is no update or delete.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::domain::{Draft, DraftId, EmailId};
use crate::storage::database::{Database, Result};

/// Inserts a new draft.
pub async fn insert(db: &Database, draft: &Draft) -> Result<()> {
    let draft = draft.clone();

    db.with_conn(move |conn| {
        conn.execute(
            "INSERT INTO drafts (id, subject, body, to_email, in_reply_to, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                draft.id.0,
                draft.subject,
                draft.body,
                draft.to,
                draft.in_reply_to.as_ref().map(|id| &id.0),
                // Fixed width so text order matches time order.
                draft.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Gets a draft by ID.
pub async fn get_by_id(db: &Database, id: &DraftId) -> Result<Option<Draft>> {
    let id = id.clone();

    db.with_conn(move |conn| {
        let draft = conn
            .query_row(
                "SELECT id, subject, body, to_email, in_reply_to, created_at
                 FROM drafts WHERE id = ?1",
                params![id.0],
                row_to_draft,
            )
            .optional()?;
        Ok(draft)
    })
    .await
}

/// Gets all drafts, newest first.
pub async fn list(db: &Database) -> Result<Vec<Draft>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, subject, body, to_email, in_reply_to, created_at
             FROM drafts ORDER BY created_at DESC",
        )?;
        let drafts = stmt.query_map([], row_to_draft)?;
        Ok(drafts.collect::<std::result::Result<Vec<_>, _>>()?)
    })
    .await
}

fn row_to_draft(row: &Row<'_>) -> rusqlite::Result<Draft> {
    let created_at: String = row.get(5)?;

    Ok(Draft {
        id: DraftId::from(row.get::<_, String>(0)?),
        subject: row.get(1)?,
        body: row.get(2)?,
        to: row.get(3)?,
        in_reply_to: row.get::<_, Option<String>>(4)?.map(EmailId::from),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}
