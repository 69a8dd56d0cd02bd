//! Line-oriented console host.
//!
//! Each input line is parsed into a [`Command`] and dispatched to the flow.
//! Notifications are printed as they arrive; flow errors are printed after
//! the command that caused them.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ma_app::{AccountFlow, FlowError, FlowMessage};
use ma_core::flow::StepName;
use ma_core::notification::{Notification, NotificationKind};
use ma_core::ports::NotificationPort;
use ma_core::tunnel::{FieldKind, FieldValue};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "\
commands:
  show                      print the account overview
  json                      print the account overview as JSON
  edit <section>            open personal, professional or password
  set <field> <value...>    change a field on the open step
  save                      submit the open step
  cancel                    discard edits and return to the overview
  license-invalid           report a failed license check
  fields                    list registered fields
  close                     close the flow and exit
  help                      show this text";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown section: {0} (expected personal, professional or password)")]
    UnknownSection(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("expected on/off for checkbox, got {0}")]
    InvalidToggle(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Json,
    Edit(StepName),
    Set { field: String, args: Vec<String> },
    Save,
    Cancel,
    LicenseInvalid,
    Fields,
    Close,
    Help,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let rest: Vec<String> = words.map(str::to_string).collect();

        match head {
            "show" => Ok(Self::Show),
            "json" => Ok(Self::Json),
            "edit" => {
                let section = rest.first().ok_or(CommandError::Usage("edit <section>"))?;
                parse_section(section).map(Self::Edit)
            }
            "set" => {
                let (field, args) = rest
                    .split_first()
                    .ok_or(CommandError::Usage("set <field> <value...>"))?;
                Ok(Self::Set {
                    field: field.clone(),
                    args: args.to_vec(),
                })
            }
            "save" => Ok(Self::Save),
            "cancel" => Ok(Self::Cancel),
            "license-invalid" => Ok(Self::LicenseInvalid),
            "fields" => Ok(Self::Fields),
            "close" | "quit" | "exit" => Ok(Self::Close),
            "help" | "?" => Ok(Self::Help),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_section(raw: &str) -> Result<StepName, CommandError> {
    match raw {
        "personal" => Ok(StepName::EditPersonal),
        "professional" => Ok(StepName::EditProfessional),
        "password" => Ok(StepName::EditPassword),
        other => other
            .parse()
            .map_err(|_| CommandError::UnknownSection(other.to_string())),
    }
}

/// Build a field value of `kind` from command arguments.
///
/// A license takes its number then its issuing authority.
pub fn field_value(kind: FieldKind, args: &[String]) -> Result<FieldValue, CommandError> {
    let joined = args.join(" ");
    match kind {
        FieldKind::Text | FieldKind::Email => Ok(FieldValue::Text(joined)),
        FieldKind::Select => Ok(FieldValue::Selection(joined)),
        FieldKind::Password => Ok(FieldValue::Secret(joined)),
        FieldKind::Checkbox => match joined.as_str() {
            "on" | "true" | "yes" => Ok(FieldValue::Toggle(true)),
            "off" | "false" | "no" => Ok(FieldValue::Toggle(false)),
            other => Err(CommandError::InvalidToggle(other.to_string())),
        },
        FieldKind::License => Ok(FieldValue::License {
            number: args.first().cloned().unwrap_or_default(),
            issuing_authority: args.get(1).cloned().unwrap_or_default(),
        }),
    }
}

/// Prints notifications to stdout.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotificationSink;

impl ConsoleNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationPort for ConsoleNotificationSink {
    async fn notify(&self, notification: Notification) {
        let prefix = match notification.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
        };
        println!("[{prefix}] {}", notification.message);
    }

    async fn clear(&self) {
        debug!("console notifications cleared");
    }
}

/// What the console loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Exit,
}

pub struct Console<W> {
    flow: Arc<AccountFlow>,
    out: W,
}

impl<W: AsyncWrite + Unpin> Console<W> {
    pub fn new(flow: Arc<AccountFlow>, out: W) -> Self {
        Self { flow, out }
    }

    /// Read commands from stdin until `close` or end of input.
    pub async fn run_stdin(&mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.write_line(HELP).await?;
        self.print_overview().await?;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if self.execute_line(&line).await? == Continuation::Exit {
                return Ok(());
            }
        }

        info!("console input ended, closing flow");
        self.flow.close().await;
        Ok(())
    }

    /// Parse and run one line. I/O errors are returned; everything else is
    /// printed.
    pub async fn execute_line(&mut self, line: &str) -> anyhow::Result<Continuation> {
        match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(err) => {
                self.write_line(&err.to_string()).await?;
                Ok(Continuation::Continue)
            }
        }
    }

    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Continuation> {
        debug!(command = ?command, "console command");
        let result = match command {
            Command::Show => return self.print_overview().await.map(|()| Continuation::Continue),
            Command::Json => return self.print_json().await.map(|()| Continuation::Continue),
            Command::Fields => return self.print_fields().await.map(|()| Continuation::Continue),
            Command::Help => return self.write_line(HELP).await.map(|()| Continuation::Continue),
            Command::Close => {
                self.flow.close().await;
                return Ok(Continuation::Exit);
            }
            Command::Edit(step) => self.flow.go_to(step, true).await,
            Command::Set { field, args } => match self.field_kind(&field) {
                Some(kind) => match field_value(kind, &args) {
                    Ok(value) => self.flow.input(&field, value).await,
                    Err(err) => return self.report(err).await,
                },
                None => return self.report(CommandError::UnknownField(field)).await,
            },
            Command::Save => match self.open_step() {
                Some(step) => self.flow.save(step).await,
                None => return self.report(CommandError::Usage("edit <section> first")).await,
            },
            Command::Cancel => match self.open_step() {
                Some(step) => self.flow.cancel(step).await,
                None => self.flow.go_to(StepName::Account, false).await,
            },
            Command::LicenseInvalid => {
                self.flow
                    .dispatch(FlowMessage::LicenseValidity { is_valid: false })
                    .await
            }
        };

        match result {
            Ok(()) => {
                if self.flow.current_step() == Some(StepName::Account) {
                    self.print_overview().await?;
                }
            }
            Err(FlowError::Validation { errors, .. }) => {
                for error in errors {
                    self.write_line(&format!("  {error}")).await?;
                }
            }
            Err(FlowError::Closed) => return Ok(Continuation::Exit),
            Err(err) => self.write_line(&err.to_string()).await?,
        }
        Ok(Continuation::Continue)
    }

    fn open_step(&self) -> Option<StepName> {
        self.flow
            .current_step()
            .filter(|step| step.section().is_some())
    }

    fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.flow
            .context()
            .with_tunnel(|tunnel| tunnel.get(field).map(|r| r.metadata.kind))
    }

    async fn report(&mut self, err: CommandError) -> anyhow::Result<Continuation> {
        self.write_line(&err.to_string()).await?;
        Ok(Continuation::Continue)
    }

    async fn print_overview(&mut self) -> anyhow::Result<()> {
        match self.flow.overview() {
            Some(overview) => self.write_line(&overview.render()).await,
            None => self.write_line("no account loaded").await,
        }
    }

    async fn print_json(&mut self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.flow.overview())?;
        self.write_line(&json).await
    }

    async fn print_fields(&mut self) -> anyhow::Result<()> {
        let lines: Vec<String> = self.flow.context().with_tunnel(|tunnel| {
            tunnel
                .registrations()
                .into_iter()
                .map(|r| {
                    let disabled = if r.accessor.is_disabled() { " (disabled)" } else { "" };
                    format!("  {} [{:?}] = {:?}{disabled}", r.name, r.metadata.kind, r.value())
                })
                .collect()
        });
        for line in lines {
            self.write_line(&line).await?;
        }
        Ok(())
    }

    async fn write_line(&mut self, text: &str) -> anyhow::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}
