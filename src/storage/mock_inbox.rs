//! Sample inbox used for bulk import.
//!
//! The import file is a JSON array of `{id, from, subject, body, date}`
//! objects. When the file does not exist, the built-in sample is written to
//! that path first so it can be edited for later imports.

use std::path::Path;

use crate::domain::ImportedEmail;
use crate::storage::database::Result;

/// Reads the import file, creating it from the built-in sample if missing.
pub async fn load_or_create(path: impl AsRef<Path>) -> Result<Vec<ImportedEmail>> {
    let path = path.as_ref();

    if !tokio::fs::try_exists(path).await? {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&sample())?;
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), "Wrote sample inbox");
    }

    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// The built-in ten-email sample inbox.
pub fn sample() -> Vec<ImportedEmail> {
    const SAMPLE: [(&str, &str, &str, &str, &str); 10] = [
        (
            "1",
            "project.manager@company.com",
            "Weekly Project Sync Meeting",
            "Hi team,\n\nLet's schedule our weekly project sync for Thursday at 2 PM. Please come prepared with updates on your respective tasks.\n\nAlso, remember that the Q3 report deadline is next Friday. Please submit your sections by EOD Thursday.\n\nBest regards,\nSarah",
            "2024-01-15 09:30:00",
        ),
        (
            "2",
            "hr@company.com",
            "Benefits Enrollment Reminder",
            "Dear Employee,\n\nThis is a reminder that benefits enrollment closes this Friday. Please log into the portal and make your selections.\n\nIf you have any questions, contact HR.\n\nThank you,\nHR Department",
            "2024-01-15 11:15:00",
        ),
        (
            "3",
            "tech-news@newsletter.com",
            "AI Developments Weekly",
            "This week in AI: New breakthroughs in language models, industry updates, and more...",
            "2024-01-15 08:00:00",
        ),
        (
            "4",
            "client@clientcompany.com",
            "Urgent: Website Issue",
            "Hello,\n\nWe're experiencing a critical issue with our website. The payment gateway is not working. Can you please look into this immediately?\n\nWe need this fixed by end of day today.\n\nThanks,\nJohn Client",
            "2024-01-15 10:45:00",
        ),
        (
            "5",
            "marketing@company.com",
            "Q1 Marketing Campaign Results",
            "Team,\n\nAttached are the Q1 marketing campaign results. We exceeded our KPIs by 15%. Great work everyone!\n\nOur next campaign planning session is scheduled for next Monday.\n\nRegards,\nMarketing Team",
            "2024-01-14 16:20:00",
        ),
        (
            "6",
            "noreply@bank.com",
            "Your statement is ready",
            "Your monthly account statement is now available for download.",
            "2024-01-14 14:30:00",
        ),
        (
            "7",
            "ceo@company.com",
            "All Hands Meeting Next Week",
            "Hello everyone,\n\nWe'll have an all-hands meeting next Wednesday at 10 AM to discuss company strategy and upcoming initiatives.\n\nPlease block your calendars.\n\nBest,\nCEO",
            "2024-01-14 13:15:00",
        ),
        (
            "8",
            "colleague@company.com",
            "Need your feedback on design mockups",
            "Hi,\n\nCould you please review the attached design mockups and provide feedback by tomorrow? We need to finalize the designs for the client presentation on Friday.\n\nThanks!",
            "2024-01-14 11:45:00",
        ),
        (
            "9",
            "updates@linkedin.com",
            "Weekly digest from your network",
            "See what's happening in your professional network this week...",
            "2024-01-14 10:00:00",
        ),
        (
            "10",
            "it-support@company.com",
            "System Maintenance Tonight",
            "Important: There will be system maintenance tonight from 10 PM to 2 AM. Some services may be unavailable during this time.\n\nPlan your work accordingly.\n\nIT Department",
            "2024-01-14 09:30:00",
        ),
    ];

    SAMPLE
        .iter()
        .map(|(id, from, subject, body, date)| ImportedEmail {
            id: id.to_string(),
            from: from.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            date: date.to_string(),
        })
        .collect()
}
