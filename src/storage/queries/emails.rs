//! Email CRUD operations.
//!
//! Provides database operations for email entities. Action items are stored as
//! JSON text; anything that does not decode to `{"tasks": [...]}` reads back
//! as an empty task list.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::domain::{ActionItems, Email, EmailId};
use crate::storage::database::{Database, Result};

const SELECT_COLUMNS: &str = "id, sender, subject, body, date, category, actions, summary, \
                              is_processed, created_at";

/// Inserts or replaces a batch of emails in one transaction.
///
/// Replacing an email resets its processing fields, matching a fresh import.
pub async fn upsert_all(db: &Database, emails: Vec<Email>) -> Result<usize> {
    db.transaction(move |tx| {
        let now = Utc::now().to_rfc3339();
        let mut stmt = tx.prepare(
            r#"
            INSERT OR REPLACE INTO emails (id, sender, subject, body, date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;

        for email in &emails {
            stmt.execute(params![
                email.id.0,
                email.sender,
                email.subject,
                email.body,
                email.date,
                now,
            ])?;
        }

        Ok(emails.len())
    })
    .await
}

/// Retrieves an email by its ID.
pub async fn get_by_id(db: &Database, email_id: &EmailId) -> Result<Option<Email>> {
    let email_id = email_id.clone();

    db.with_conn(move |conn| {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM emails WHERE id = ?1");
        let result = conn
            .query_row(&sql, [&email_id.0], row_to_email)
            .optional()?;
        Ok(result)
    })
    .await
}

/// Retrieves all emails, ordered by date descending.
///
/// Dates are display strings, so the ordering is lexicographic.
pub async fn list(db: &Database) -> Result<Vec<Email>> {
    db.with_conn(|conn| {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM emails ORDER BY date DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_email)?;
        let emails: std::result::Result<Vec<_>, _> = rows.collect();
        Ok(emails?)
    })
    .await
}

/// Writes processing results and marks the email processed.
///
/// `None` fields keep their stored value. Returns `false` if the email does
/// not exist.
pub async fn update_processing(
    db: &Database,
    email_id: &EmailId,
    category: Option<String>,
    actions: Option<ActionItems>,
    summary: Option<String>,
) -> Result<bool> {
    let email_id = email_id.clone();
    let actions_json = actions.map(|a| serde_json::to_string(&a)).transpose()?;

    db.with_conn(move |conn| {
        let updated = conn.execute(
            r#"
            UPDATE emails
            SET category = COALESCE(?1, category),
                actions = COALESCE(?2, actions),
                summary = COALESCE(?3, summary),
                is_processed = 1
            WHERE id = ?4
            "#,
            params![category, actions_json, summary, email_id.0],
        )?;
        Ok(updated > 0)
    })
    .await
}

/// Counts stored emails.
pub async fn count(db: &Database) -> Result<u32> {
    db.with_conn(|conn| {
        let count = conn.query_row("SELECT COUNT(*) FROM emails", [], |row| row.get(0))?;
        Ok(count)
    })
    .await
}

fn row_to_email(row: &Row<'_>) -> rusqlite::Result<Email> {
    let actions: Option<String> = row.get(6)?;
    let created_at: Option<String> = row.get(9)?;

    Ok(Email {
        id: EmailId::from(row.get::<_, String>(0)?),
        sender: row.get(1)?,
        subject: row.get(2)?,
        body: row.get(3)?,
        date: row.get(4)?,
        category: row.get(5)?,
        actions: actions.as_deref().map(ActionItems::parse_or_empty),
        summary: row.get(7)?,
        is_processed: row.get(8)?,
        created_at: created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}
