//! Command-line front end for the Lamprea back office data core.
//!
//! # Responsibility
//! - Load settings, start logging and open the configured store.
//! - Map each subcommand onto one core operation and print its result.
//! - Report failures on stderr with their error category; exit code 1.

use clap::{Args, Parser, Subcommand};
use lamprea_core::logging::LoggingError;
use lamprea_core::settings::{LoggingSettings, DEFAULT_SETTINGS_PATH};
use lamprea_core::{
    init_from_settings, load_settings, Agent, AgentRepository, Client, ClientDetail,
    ClientRepository, ClientService, ClientWithDetail, ConfigError, Driver, DriverRepository,
    EntityId, EntityService, ExportError, ExportKind, Exporter, RepoError,
    SqliteConnectionProvider, TableEntity,
};
use log::info;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

/// Clients, agents and drivers of the distribution back office.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file; `LAMPREA__*` environment variables override its keys.
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of stored records per kind.
    Summary,
    /// List every record of one kind, ordered by id.
    List {
        /// clients | agents | drivers
        kind: ExportKind,
    },
    /// Case-insensitive substring search over id and text fields.
    Search {
        kind: ExportKind,
        /// Blank text lists everything.
        text: String,
    },
    /// Show one client with its detail.
    ShowClient { id: EntityId },
    /// Add a client, together with its detail when any detail field is given.
    AddClient(AddClientArgs),
    AddAgent(AgentArgs),
    AddDriver(DriverArgs),
    /// Rewrite every field of an existing record.
    Update {
        #[command(subcommand)]
        record: RecordArgs,
    },
    /// Add or replace the detail of an existing client.
    SetDetail(SetDetailArgs),
    /// Delete one record; clients go together with their detail.
    Delete { kind: ExportKind, id: EntityId },
    /// Delete a client and its detail in one transaction.
    DeleteClient { id: EntityId },
    /// Write record lists as JSON under the export directory.
    Export {
        /// Every kind when omitted.
        kind: Option<ExportKind>,
        /// Defaults to `<kind>.json`.
        #[arg(long, requires = "kind")]
        file: Option<String>,
    },
}

#[derive(Subcommand)]
enum RecordArgs {
    Client(ClientArgs),
    Agent(AgentArgs),
    Driver(DriverArgs),
}

#[derive(Args)]
struct ClientArgs {
    #[arg(long)]
    id: EntityId,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

impl From<ClientArgs> for Client {
    fn from(args: ClientArgs) -> Self {
        Client::new(args.id, args.name, args.email)
    }
}

#[derive(Args)]
struct DetailArgs {
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl DetailArgs {
    fn is_empty(&self) -> bool {
        self.address.is_none() && self.phone.is_none() && self.notes.is_none()
    }

    fn for_client(self, id: EntityId) -> ClientDetail {
        ClientDetail {
            id,
            address: self.address,
            phone: self.phone,
            notes: self.notes,
        }
    }
}

#[derive(Args)]
struct AddClientArgs {
    #[command(flatten)]
    client: ClientArgs,
    #[command(flatten)]
    detail: DetailArgs,
}

impl AddClientArgs {
    fn split(self) -> (Client, Option<ClientDetail>) {
        let client = Client::from(self.client);
        if self.detail.is_empty() {
            return (client, None);
        }
        let detail = self.detail.for_client(client.id);
        (client, Some(detail))
    }
}

#[derive(Args)]
struct SetDetailArgs {
    /// Owning client id.
    #[arg(long)]
    id: EntityId,
    #[command(flatten)]
    detail: DetailArgs,
}

#[derive(Args)]
struct AgentArgs {
    #[arg(long)]
    id: EntityId,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
}

impl From<AgentArgs> for Agent {
    fn from(args: AgentArgs) -> Self {
        Agent::new(args.id, args.name, args.email, args.phone)
    }
}

#[derive(Args)]
struct DriverArgs {
    #[arg(long)]
    id: EntityId,
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    license_plate: String,
}

impl From<DriverArgs> for Driver {
    fn from(args: DriverArgs) -> Self {
        Driver::new(args.id, args.name, args.phone, args.license_plate)
    }
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Repo(RepoError),
    Export(ExportError),
}

impl CliError {
    fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Logging(_) => "logging",
            Self::Repo(err) => err.kind().as_str(),
            Self::Export(ExportError::Repo(err)) => err.kind().as_str(),
            Self::Export(ExportError::Io { .. }) => "io",
            Self::Export(ExportError::Serialize(_)) => "encoding",
            Self::Export(ExportError::InvalidFileName(_)) => "usage",
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ExportError> for CliError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!(
                "event=cli_command module=cli status=error category={}",
                err.category()
            );
            eprintln!("error [{}]: {err}", err.category());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli.config)?;
    init_from_settings(&absolute_log_dir(&settings.logging))?;

    let provider = SqliteConnectionProvider::new(settings.db.clone());
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Commands::Summary => {
            let mut counts = Vec::with_capacity(ExportKind::ALL.len());
            for kind in ExportKind::ALL {
                counts.push(format!("{}={}", kind.as_str(), count(&provider, kind)?));
            }
            println!("{}", counts.join(" "));
        }
        Commands::List { kind } => list(&provider, kind, "")?,
        Commands::Search { kind, text } => list(&provider, kind, &text)?,
        Commands::ShowClient { id } => {
            match ClientService::new(&provider).find_with_detail(id)? {
                Some(found) => print_client(&found),
                None => println!("client {id} not found"),
            }
        }
        Commands::AddClient(args) => {
            let (client, detail) = args.split();
            match detail {
                Some(detail) => {
                    ClientService::new(&provider).save_client_with_detail(&client, &detail)?
                }
                None => EntityService::new(ClientRepository::new(&provider)).create(&client)?,
            }
            println!("client {} saved", client.id);
        }
        Commands::AddAgent(args) => {
            let agent = Agent::from(args);
            EntityService::new(AgentRepository::new(&provider)).create(&agent)?;
            println!("agent {} saved", agent.id);
        }
        Commands::AddDriver(args) => {
            let driver = Driver::from(args);
            EntityService::new(DriverRepository::new(&provider)).create(&driver)?;
            println!("driver {} saved", driver.id);
        }
        Commands::Update { record } => {
            let (noun, id, updated) = match record {
                RecordArgs::Client(args) => {
                    let client = Client::from(args);
                    let service = EntityService::new(ClientRepository::new(&provider));
                    ("client", client.id, service.update(&client)?)
                }
                RecordArgs::Agent(args) => {
                    let agent = Agent::from(args);
                    let service = EntityService::new(AgentRepository::new(&provider));
                    ("agent", agent.id, service.update(&agent)?)
                }
                RecordArgs::Driver(args) => {
                    let driver = Driver::from(args);
                    let service = EntityService::new(DriverRepository::new(&provider));
                    ("driver", driver.id, service.update(&driver)?)
                }
            };
            report(noun, id, updated, "updated");
        }
        Commands::SetDetail(args) => {
            let detail = args.detail.for_client(args.id);
            ClientService::new(&provider).save_detail(&detail)?;
            println!("client {} detail saved", detail.id);
        }
        Commands::Delete { kind, id } => {
            let deleted = match kind {
                ExportKind::Clients => {
                    ClientService::new(&provider).delete_client_with_detail(id)? > 0
                }
                ExportKind::Agents => {
                    EntityService::new(AgentRepository::new(&provider)).delete(id)?
                }
                ExportKind::Drivers => {
                    EntityService::new(DriverRepository::new(&provider)).delete(id)?
                }
            };
            report(noun_for(kind), id, deleted, "deleted");
        }
        Commands::DeleteClient { id } => {
            let removed = ClientService::new(&provider).delete_client_with_detail(id)?;
            report("client", id, removed > 0, "deleted");
        }
        Commands::Export { kind, file } => {
            let exporter = Exporter::new(&provider, &settings.export.dir);
            let kinds = kind.map_or(ExportKind::ALL.to_vec(), |kind| vec![kind]);
            for kind in kinds {
                let file_name = file
                    .clone()
                    .unwrap_or_else(|| kind.default_file_name().to_string());
                let path = exporter.export(kind, &file_name)?;
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn count(provider: &SqliteConnectionProvider, kind: ExportKind) -> Result<u64, CliError> {
    let total = match kind {
        ExportKind::Clients => EntityService::new(ClientRepository::new(provider)).count()?,
        ExportKind::Agents => EntityService::new(AgentRepository::new(provider)).count()?,
        ExportKind::Drivers => EntityService::new(DriverRepository::new(provider)).count()?,
    };
    Ok(total)
}

fn noun_for(kind: ExportKind) -> &'static str {
    match kind {
        ExportKind::Clients => "client",
        ExportKind::Agents => "agent",
        ExportKind::Drivers => "driver",
    }
}

fn report(noun: &str, id: EntityId, done: bool, verb: &str) {
    if done {
        println!("{noun} {id} {verb}");
    } else {
        println!("{noun} {id} not found");
    }
}

/// Lists `kind`, filtered by `text` when it is not blank.
fn list(
    provider: &SqliteConnectionProvider,
    kind: ExportKind,
    text: &str,
) -> Result<(), CliError> {
    match kind {
        ExportKind::Clients => {
            print_rows(&EntityService::new(ClientRepository::new(provider)).search(text)?)
        }
        ExportKind::Agents => {
            print_rows(&EntityService::new(AgentRepository::new(provider)).search(text)?)
        }
        ExportKind::Drivers => {
            print_rows(&EntityService::new(DriverRepository::new(provider)).search(text)?)
        }
    }
    Ok(())
}

fn print_rows<E: TableEntity>(rows: &[E]) {
    for row in rows {
        println!("{}\t{}", row.id(), row.search_fields().join("\t"));
    }
    println!("({} {})", rows.len(), E::TABLE);
}

fn print_client(found: &ClientWithDetail) {
    let field = |value: Option<&String>| value.map(String::as_str).unwrap_or("-").to_string();
    let detail = found.detail.as_ref();
    println!("id:      {}", found.client.id);
    println!("name:    {}", found.client.name);
    println!("email:   {}", found.client.email);
    println!("address: {}", field(detail.and_then(|d| d.address.as_ref())));
    println!("phone:   {}", field(detail.and_then(|d| d.phone.as_ref())));
    println!("notes:   {}", field(detail.and_then(|d| d.notes.as_ref())));
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Summary => "summary",
        Commands::List { .. } => "list",
        Commands::Search { .. } => "search",
        Commands::ShowClient { .. } => "show-client",
        Commands::AddClient(_) => "add-client",
        Commands::AddAgent(_) => "add-agent",
        Commands::AddDriver(_) => "add-driver",
        Commands::Update { .. } => "update",
        Commands::SetDetail(_) => "set-detail",
        Commands::Delete { .. } => "delete",
        Commands::DeleteClient { .. } => "delete-client",
        Commands::Export { .. } => "export",
    }
}

/// Resolves a relative log directory against the working directory.
fn absolute_log_dir(logging: &LoggingSettings) -> LoggingSettings {
    let dir = logging
        .dir
        .as_ref()
        .map(|dir| std::path::absolute(dir).unwrap_or_else(|_| dir.clone()));
    LoggingSettings {
        level: logging.level.clone(),
        dir,
    }
}

#[cfg(test)]
mod tests {
    use super::{AddClientArgs, Cli, ClientArgs, Commands, DetailArgs, RecordArgs};
    use clap::{CommandFactory, Parser};
    use lamprea_core::ExportKind;

    fn ane_args(detail: DetailArgs) -> AddClientArgs {
        AddClientArgs {
            client: ClientArgs {
                id: 4,
                name: "Ane".to_string(),
                email: "ane@lamprea.test".to_string(),
            },
            detail,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_client_without_detail_fields_has_no_detail() {
        let (client, detail) = ane_args(DetailArgs {
            address: None,
            phone: None,
            notes: None,
        })
        .split();
        assert_eq!(client.id, 4);
        assert!(detail.is_none());
    }

    #[test]
    fn add_client_with_any_detail_field_shares_the_id() {
        let (_, detail) = ane_args(DetailArgs {
            address: None,
            phone: Some("611".to_string()),
            notes: None,
        })
        .split();
        let detail = detail.unwrap();
        assert_eq!(detail.id, 4);
        assert_eq!(detail.phone.as_deref(), Some("611"));
    }

    #[test]
    fn update_takes_a_record_kind_and_all_fields() {
        let cli = Cli::try_parse_from([
            "lamprea",
            "update",
            "driver",
            "--id",
            "3",
            "--name",
            "Iker",
            "--phone",
            "699",
            "--license-plate",
            "4321-KLM",
        ])
        .unwrap();
        match cli.command {
            Commands::Update {
                record: RecordArgs::Driver(args),
            } => {
                assert_eq!(args.id, 3);
                assert_eq!(args.license_plate, "4321-KLM");
            }
            _ => panic!("expected update driver"),
        }
    }

    #[test]
    fn delete_and_set_detail_parse() {
        let cli = Cli::try_parse_from(["lamprea", "delete", "agents", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Delete {
                kind: ExportKind::Agents,
                id: 7
            }
        ));

        let cli =
            Cli::try_parse_from(["lamprea", "set-detail", "--id", "2", "--notes", "back door"])
                .unwrap();
        match cli.command {
            Commands::SetDetail(args) => {
                let detail = args.detail.for_client(args.id);
                assert_eq!(detail.id, 2);
                assert_eq!(detail.notes.as_deref(), Some("back door"));
                assert_eq!(detail.address, None);
            }
            _ => panic!("expected set-detail"),
        }
    }

    #[test]
    fn export_file_requires_a_kind() {
        assert!(Cli::try_parse_from(["lamprea", "export", "--file", "x.json"]).is_err());
        let cli = Cli::try_parse_from(["lamprea", "export"]).unwrap();
        assert!(matches!(cli.command, Commands::Export { kind: None, file: None }));
    }
}
