//! SQL schema definitions as const strings.
//!
//! Contains the complete SQLite schema for the inbox agent.

/// SQL to create the emails table.
pub const CREATE_EMAILS: &str = r#"
CREATE TABLE IF NOT EXISTS emails (
    id TEXT PRIMARY KEY,
    sender TEXT NOT NULL,
    subject TEXT NOT NULL,
    body TEXT NOT NULL,
    date TEXT NOT NULL,
    category TEXT,
    actions TEXT,
    summary TEXT,
    is_processed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT
)
"#;

/// SQL to create email indexes.
pub const CREATE_EMAIL_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_emails_date ON emails(date DESC)
"#;

/// SQL to create the prompts table.
pub const CREATE_PROMPTS: &str = r#"
CREATE TABLE IF NOT EXISTS prompts (
    name TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    description TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the drafts table.
pub const CREATE_DRAFTS: &str = r#"
CREATE TABLE IF NOT EXISTS drafts (
    id TEXT PRIMARY KEY,
    subject TEXT NOT NULL,
    body TEXT NOT NULL,
    to_email TEXT NOT NULL,
    in_reply_to TEXT,
    created_at TEXT NOT NULL
)
"#;

/// Returns all schema creation statements in order.
pub fn all_migrations() -> Vec<&'static str> {
    vec![
        CREATE_EMAILS,
        CREATE_EMAIL_INDEXES,
        CREATE_PROMPTS,
        CREATE_DRAFTS,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_migrations_returns_statements() {
        let migrations = all_migrations();
        assert_eq!(migrations.len(), 4);
    }

    #[test]
    fn create_emails_has_processing_columns() {
        assert!(CREATE_EMAILS.contains("category TEXT"));
        assert!(CREATE_EMAILS.contains("actions TEXT"));
        assert!(CREATE_EMAILS.contains("summary TEXT"));
        assert!(CREATE_EMAILS.contains("is_processed INTEGER NOT NULL DEFAULT 0"));
    }

    #[test]
    fn statements_use_if_not_exists() {
        for migration in all_migrations() {
            assert!(migration.contains("IF NOT EXISTS"));
        }
    }
}
