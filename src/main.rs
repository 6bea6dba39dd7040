//! inbox-agent - Command-line entry point for the email productivity agent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use inbox_agent::config::{default_settings_path, Settings};
use inbox_agent::domain::{DraftId, EmailId, NewDraft};
use inbox_agent::services::ProcessingMode;
use inbox_agent::{AgentApp, ServiceError};

#[derive(Parser)]
#[command(name = "inbox-agent")]
#[command(about = "LLM-assisted inbox triage, chat and drafting", long_about = None)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import the mock inbox file, creating it from the sample if missing
    LoadMock,

    /// List all emails, newest first
    List,

    /// Show one email with its processing results
    Show { id: String },

    /// Categorize, extract actions from and/or summarize an email
    Process {
        id: String,

        /// all, categorize, actions or summary
        #[arg(long, default_value_t = ProcessingMode::All)]
        mode: ProcessingMode,
    },

    /// List prompt templates
    Prompts,

    /// Replace a prompt template's content
    SetPrompt { name: String, content: String },

    /// Ask about one email, or about the whole inbox
    Chat {
        query: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Generate a draft, as a reply when --email is given
    Draft {
        #[arg(long)]
        email: Option<String>,

        #[arg(long, default_value = "")]
        instructions: String,

        /// Save the generated draft
        #[arg(long)]
        save: bool,
    },

    /// Save a hand-written draft
    SaveDraft {
        #[arg(long, default_value = "")]
        subject: String,

        #[arg(long, default_value = "")]
        body: String,

        #[arg(long, default_value = "")]
        to: String,

        #[arg(long)]
        in_reply_to: Option<String>,
    },

    /// List saved drafts, or show one by id
    Drafts { id: Option<String> },

    /// Store the LLM API key in the OS keychain (read from stdin)
    SetApiKey {
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings_path = cli.config.unwrap_or_else(default_settings_path);
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;

    let app = AgentApp::from_settings(&settings)
        .await
        .context("starting inbox agent")?;

    if let Err(e) = run(&app, &settings, cli.cmd).await {
        tracing::error!("Command failed: {}", e);
        println!("{}", serde_json::to_string_pretty(&e.to_error_json())?);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(app: &AgentApp, settings: &Settings, cmd: Command) -> Result<(), ServiceError> {
    match cmd {
        Command::LoadMock => {
            let count = app.load_mock_inbox().await?;
            print_json(&json!({
                "message": "Mock data loaded successfully",
                "count": count,
            }));
        }
        Command::List => print_json(&app.list_emails().await?),
        Command::Show { id } => print_json(&app.get_email(&EmailId::from(id)).await?),
        Command::Process { id, mode } => {
            print_json(&app.process_email(&EmailId::from(id), mode).await?)
        }
        Command::Prompts => print_json(&app.list_prompts().await?),
        Command::SetPrompt { name, content } => {
            app.update_prompt(&name, &content).await?;
            print_json(&json!({ "message": "Prompt updated successfully" }));
        }
        Command::Chat { query, email } => {
            let email = email.map(EmailId::from);
            let response = app.chat(&query, email.as_ref()).await?;
            print_json(&json!({ "response": response }));
        }
        Command::Draft {
            email,
            instructions,
            save,
        } => {
            let email = email.map(EmailId::from);
            let generated = app.generate_draft(email.as_ref(), &instructions).await?;
            if save {
                let draft = app.save_draft(generated.into()).await?;
                print_json(&draft);
            } else {
                print_json(&generated);
            }
        }
        Command::SaveDraft {
            subject,
            body,
            to,
            in_reply_to,
        } => {
            let draft = app
                .save_draft(NewDraft {
                    subject,
                    body,
                    to,
                    in_reply_to: in_reply_to.map(EmailId::from),
                })
                .await?;
            print_json(&json!({
                "draft_id": draft.id,
                "message": "Draft saved successfully",
            }));
        }
        Command::Drafts { id: Some(id) } => print_json(&app.get_draft(&DraftId::from(id)).await?),
        Command::Drafts { id: None } => print_json(&app.list_drafts().await?),
        Command::SetApiKey { provider } => {
            let provider = provider.unwrap_or_else(|| settings.ai.provider.clone());
            eprintln!("Paste API key for {provider} (end with Ctrl-D):");
            let mut key = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut key)
                .map_err(|e| ServiceError::InvalidRequest(format!("could not read API key: {e}")))?;
            app.store_api_key(&provider, &key).await?;
            print_json(&json!({ "message": format!("Saved API key for {provider}") }));
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("Could not serialize output: {}", e),
    }
}
