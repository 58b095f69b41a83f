use std::io::{self, Write};

use flow_api::{new_session_id, AssistantTurn, FlowApiClient, FlowApiError};
use settings_store::{SettingsStore, SettingsStoreError, StoredSettings};
use thiserror::Error;
use tracing::info;

use crate::cli::{Args, Command, ConfigAction};
use crate::config::EnvOverrides;
use crate::output::{message_lines, next_output, session_line, tool_step_lines};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] FlowApiError),

    #[error(transparent)]
    Settings(#[from] SettingsStoreError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("{0}")]
    Failed(String),
}

impl AppError {
    /// Message shown to the user on exit.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

pub async fn run(args: Args) -> Result<(), AppError> {
    let store = SettingsStore::open_default()?;
    let stored = store.load()?;

    match args.command {
        Command::Config { action } => run_config(&store, stored, action),
        command => {
            let client = FlowApiClient::new(EnvOverrides::from_env().resolve(&stored))?;
            run_remote(&client, &stored, command).await
        }
    }
}

async fn run_remote(
    client: &FlowApiClient,
    stored: &StoredSettings,
    command: Command,
) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();

    match command {
        Command::Send { message, session } => {
            let session = session.unwrap_or_else(new_session_id);
            info!(%session, "sending message");
            send(client, &message, &session, stored.display_name(), &mut stdout).await
        }
        Command::Sessions { limit } => {
            let sessions = client.list_sessions(limit).await?;
            if sessions.is_empty() {
                writeln!(stdout, "No sessions yet.")?;
            }
            for session in &sessions {
                writeln!(stdout, "{}", session_line(session))?;
            }
            Ok(())
        }
        Command::Show { session } => {
            let messages = client.get_session_messages(&session).await?;
            for message in &messages {
                for line in message_lines(message, stored.display_name()) {
                    writeln!(stdout, "{line}")?;
                }
            }
            Ok(())
        }
        Command::Delete { session } => {
            let outcome = client.delete_session(&session).await;
            if outcome.success {
                writeln!(stdout, "Deleted session {session}.")?;
                Ok(())
            } else {
                Err(AppError::Failed(format!(
                    "Could not delete session {session} (status {}): {}",
                    outcome.status,
                    outcome.message.unwrap_or_default()
                )))
            }
        }
        Command::Ping => {
            let check = client.test_connection().await;
            if check.success {
                writeln!(stdout, "{}", check.message)?;
                Ok(())
            } else {
                Err(AppError::Failed(check.message))
            }
        }
        Command::Config { .. } => Ok(()),
    }
}

async fn send(
    client: &FlowApiClient,
    message: &str,
    session: &str,
    ai_name: &str,
    out: &mut impl Write,
) -> Result<(), AppError> {
    writeln!(out, "{ai_name}:")?;
    let mut turn = AssistantTurn::new(message);
    let mut printed = String::new();
    let mut write_error = None;

    let result = client
        .send_message_stream(message, Some(session), |chunk| {
            if !turn.apply(&chunk) {
                return;
            }
            if let Some(text) = next_output(&printed, turn.text()) {
                if let Err(error) = write!(out, "{text}").and_then(|()| out.flush()) {
                    write_error.get_or_insert(error);
                }
                printed = turn.text().to_owned();
            }
        })
        .await?;
    if let Some(error) = write_error {
        return Err(error.into());
    }

    turn.finish(&result);
    if let Some(text) = next_output(&printed, turn.text()) {
        write!(out, "{text}")?;
    }
    writeln!(out)?;

    if let Some(blocks) = turn.content_blocks() {
        for line in tool_step_lines(blocks) {
            writeln!(out, "{line}")?;
        }
    }
    writeln!(out, "(session {session})")?;
    Ok(())
}

fn run_config(
    store: &SettingsStore,
    stored: StoredSettings,
    action: ConfigAction,
) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    let settings = match action {
        ConfigAction::Show => stored,
        ConfigAction::Set(values) => {
            let patch = values.into_patch();
            if patch.is_empty() {
                return Err(AppError::Failed(
                    "Nothing to change; pass --base-url, --api-key, --flow-id or --ai-name."
                        .to_owned(),
                ));
            }
            let updated = store.update(&patch)?;
            writeln!(stdout, "Saved {}", store.path().display())?;
            updated
        }
    };

    let effective = EnvOverrides::from_env().resolve(&settings);
    writeln!(stdout, "base_url = {}", effective.base_url)?;
    writeln!(stdout, "flow_id  = {}", effective.flow_id)?;
    writeln!(
        stdout,
        "api_key  = {}",
        if effective.api_key().is_some() { "(set)" } else { "(none)" }
    )?;
    writeln!(stdout, "ai_name  = {}", settings.display_name())?;
    Ok(())
}
