use crate::db::ConnectionProvider;
use crate::model::client::ClientExportRecord;
use crate::repo::entity_repo::{
    AgentRepository, DriverRepository, EntityRepository, RepoError,
};
use crate::service::client_service::ClientService;
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

pub type ExportResult<T> = Result<T, ExportError>;

/// Export failure, keeping store and file-system causes apart.
#[derive(Debug)]
pub enum ExportError {
    /// Reading the records failed.
    Repo(RepoError),
    /// The export directory or file could not be written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Serialize(serde_json::Error),
    /// File name is empty or carries directory components.
    InvalidFileName(String),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "could not read records: {err}"),
            Self::Io { path, source } => {
                write!(f, "could not write `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "could not encode records: {err}"),
            Self::InvalidFileName(name) => write!(f, "invalid export file name `{name}`"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::InvalidFileName(_) => None,
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Which record list to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Clients merged with their details.
    Clients,
    Agents,
    Drivers,
}

impl ExportKind {
    pub const ALL: [ExportKind; 3] = [Self::Clients, Self::Agents, Self::Drivers];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Agents => "agents",
            Self::Drivers => "drivers",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Clients => "clients.json",
            Self::Agents => "agents.json",
            Self::Drivers => "drivers.json",
        }
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clients" | "client" => Ok(Self::Clients),
            "agents" | "agent" => Ok(Self::Agents),
            "drivers" | "driver" => Ok(Self::Drivers),
            other => Err(format!(
                "unknown export kind `{other}`; expected clients|agents|drivers"
            )),
        }
    }
}

/// Writes record lists as JSON files under one directory.
pub struct Exporter<P> {
    provider: P,
    dir: PathBuf,
}

impl<P: ConnectionProvider> Exporter<P> {
    pub fn new(provider: P, dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            dir: dir.into(),
        }
    }

    /// Exports `kind` to `<dir>/<file_name>`, replacing any existing file.
    ///
    /// Returns the absolute path of the written file.
    pub fn export(&self, kind: ExportKind, file_name: &str) -> ExportResult<PathBuf> {
        validate_file_name(file_name)?;
        let started_at = Instant::now();

        let (rows, body) = match kind {
            ExportKind::Clients => {
                let records: Vec<ClientExportRecord> = ClientService::new(&self.provider)
                    .list_with_details()?
                    .into_iter()
                    .map(ClientExportRecord::from)
                    .collect();
                (records.len(), render(&records)?)
            }
            ExportKind::Agents => {
                let records = AgentRepository::new(&self.provider).find_all()?;
                (records.len(), render(&records)?)
            }
            ExportKind::Drivers => {
                let records = DriverRepository::new(&self.provider).find_all()?;
                (records.len(), render(&records)?)
            }
        };

        let path = self.write(file_name, &body).inspect_err(|err| {
            error!(
                "event=export_write module=export status=error kind={} error={err}",
                kind.as_str()
            );
        })?;
        info!(
            "event=export_write module=export status=ok kind={} rows={rows} duration_ms={}",
            kind.as_str(),
            started_at.elapsed().as_millis()
        );
        Ok(path)
    }

    fn write(&self, file_name: &str, body: &str) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let target = self.dir.join(file_name);
        std::fs::write(&target, body).map_err(|source| ExportError::Io {
            path: target.clone(),
            source,
        })?;

        std::path::absolute(&target).map_err(|source| ExportError::Io {
            path: target.clone(),
            source,
        })
    }
}

fn render<T: Serialize>(records: &[T]) -> ExportResult<String> {
    let mut body = serde_json::to_string_pretty(records)?;
    body.push('\n');
    Ok(body)
}

fn validate_file_name(file_name: &str) -> ExportResult<()> {
    let is_plain = !file_name.trim().is_empty()
        && Path::new(file_name).file_name().and_then(|name| name.to_str()) == Some(file_name);
    if is_plain {
        Ok(())
    } else {
        Err(ExportError::InvalidFileName(file_name.to_string()))
    }
}
