//! Command handlers. Each one wires a `Dashboard` to the configured
//! transport and credential file, runs one user intent and returns the text
//! to print.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use qrdash_core::{
    view, ApiError, ConfirmGate, Dashboard, DeleteOutcome, LoginRequest, RecordApi, RecordId, RegisterRequest,
    SessionContext,
};
use tracing::info;

use crate::cli::Command;
use crate::config::Config;
use crate::store::FileCredentialStore;
use crate::transport::UreqTransport;

/// Asks on stderr, reads the answer from stdin. Anything but y/yes is no.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl ConfirmGate for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{prompt} [y/N] ");
        let _ = stderr.flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Everything a command needs, built once from configuration.
#[derive(Debug)]
pub struct App {
    config: Config,
    session: SessionContext,
    transport: UreqTransport,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = FileCredentialStore::new(config.token_path());
        let session = SessionContext::new(Arc::new(store));
        let transport = UreqTransport::new(Duration::from_secs(config.api.timeout_secs));
        Self {
            config,
            session,
            transport,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn dashboard(&self) -> Dashboard<UreqTransport> {
        let api = RecordApi::new(&self.config.api.base_url, self.transport.clone(), self.session.clone());
        Dashboard::new(api, self.config.stale_edit_policy())
    }

    /// Run one command. `gate` answers the delete confirmation.
    pub async fn execute<G>(&self, command: Command, gate: &G) -> Result<String>
    where
        G: ConfirmGate + ?Sized,
    {
        let base_url = self.config.api.base_url.as_str();
        match command {
            Command::Register { name, email, password } => {
                let input = RegisterRequest {
                    name,
                    email: email.clone(),
                    password,
                };
                let credential = qrdash_core::register(base_url, &self.transport, &input)
                    .await
                    .map_err(|e| failure(&e, None))?;
                self.session.begin(credential);
                info!(%email, "registered");
                Ok(format!("Registered and logged in as {email}.\n"))
            }
            Command::Login { email, password } => {
                let input = LoginRequest {
                    email: email.clone(),
                    password,
                };
                let credential = qrdash_core::login(base_url, &self.transport, &input)
                    .await
                    .map_err(|e| failure(&e, None))?;
                self.session.begin(credential);
                Ok(format!("Logged in as {email}.\n"))
            }
            Command::Logout => {
                self.dashboard().logout();
                Ok("Logged out.\n".to_string())
            }
            Command::List => {
                let dashboard = self.mounted().await?;
                Ok(view::render(&dashboard))
            }
            Command::Create { kind, content, color } => {
                let mut dashboard = self.mounted().await?;
                dashboard.start_create().map_err(|e| failure(&e, Some(&dashboard)))?;
                dashboard.set_kind(kind).map_err(|e| failure(&e, Some(&dashboard)))?;
                dashboard.set_content(content).map_err(|e| failure(&e, Some(&dashboard)))?;
                dashboard.set_color(color).map_err(|e| failure(&e, Some(&dashboard)))?;
                dashboard.submit().await.map_err(|e| failure(&e, Some(&dashboard)))?;
                Ok(view::render(&dashboard))
            }
            Command::Edit { id, content, color } => {
                let mut dashboard = self.mounted().await?;
                let id = RecordId::new(id);
                dashboard.request_edit(&id).map_err(|e| failure(&e, Some(&dashboard)))?;
                if let Some(content) = content {
                    dashboard.set_content(content).map_err(|e| failure(&e, Some(&dashboard)))?;
                }
                if let Some(color) = color {
                    dashboard.set_color(color).map_err(|e| failure(&e, Some(&dashboard)))?;
                }
                dashboard.submit().await.map_err(|e| failure(&e, Some(&dashboard)))?;
                Ok(view::render(&dashboard))
            }
            Command::Delete { id, yes } => {
                let mut dashboard = self.mounted().await?;
                let id = RecordId::new(id);
                let result = if yes {
                    dashboard.request_delete(&id, &|_: &str| true).await
                } else {
                    dashboard.request_delete(&id, gate).await
                };
                match result.map_err(|e| failure(&e, Some(&dashboard)))? {
                    DeleteOutcome::Deleted => Ok(format!("Deleted {id}.\n\n{}", view::render(&dashboard))),
                    DeleteOutcome::Declined => Ok("Cancelled.\n".to_string()),
                    DeleteOutcome::Discarded => {
                        Err(anyhow!("delete of {id} was interrupted; run `qrdash list` to check"))
                    }
                }
            }
        }
    }

    async fn mounted(&self) -> Result<Dashboard<UreqTransport>> {
        let mut dashboard = self.dashboard();
        match dashboard.mount().await {
            Ok(()) => Ok(dashboard),
            Err(e) => Err(failure(&e, Some(&dashboard))),
        }
    }
}

/// Turn a surfaced error into the message the user sees. Record commands
/// that lost their session get a hint to log in again.
fn failure(err: &ApiError, dashboard: Option<&Dashboard<UreqTransport>>) -> anyhow::Error {
    let message = dashboard
        .and_then(|d| d.notice())
        .map(|n| n.message.clone())
        .or_else(|| err.message().map(str::to_string))
        .unwrap_or_else(|| err.to_string());
    let Some(dashboard) = dashboard else {
        return anyhow!("{message}");
    };
    if err.is_unauthenticated() || dashboard.session_ended() {
        anyhow!("{message}\nRun `qrdash login` to start a new session.")
    } else {
        anyhow!("{message}")
    }
}
