
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use addressbook::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, default_storage_dir};
use addressbook::net::types::{
    ContactQuery, ContactUpdate, Credentials, Id, ImportFile, MethodKind, NewContact, NewContactMethod, Registration,
    UnknownMethodKind,
};
use addressbook::{
    ApiClient, ApiError, ClientConfig, ConfigError, FileStorage, HttpTransport, Route, Session, SessionError,
    SessionStore, Storage, StorageError,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

/// Local storage key for the server session cookie.
const COOKIE_KEY: &str = "session_cookie";
const DEFAULT_EXPORT_NAME: &str = "contacts_export.xlsx";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("not logged in; run `addressbook login` first")]
    LoginRequired,
    #[error("already logged in as {0}; run `addressbook logout` first")]
    AlreadyLoggedIn(String),
    #[error(transparent)]
    InvalidMethodKind(#[from] UnknownMethodKind),
    #[error("invalid contact method '{0}' (expected type=value)")]
    InvalidMethod(String),
    #[error("file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SessionError> for CliError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Api(e) => Self::Api(e),
            SessionError::Storage(e) => Self::Storage(e),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "addressbook", about = "Address book API client")]
struct Cli {
    #[arg(long, env = "ADDRESSBOOK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "ADDRESSBOOK_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    #[arg(long, env = "ADDRESSBOOK_STORAGE_DIR", help = "Directory for local session storage")]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the API is reachable.
    Health,
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADDRESSBOOK_PASSWORD")]
        password: String,
    },
    Login {
        /// Username or email.
        #[arg(long)]
        username: String,
        #[arg(long, env = "ADDRESSBOOK_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    List {
        #[arg(long, default_value_t = false)]
        favorite: bool,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: Id,
    },
    Add {
        name: String,
        #[arg(long, default_value_t = false)]
        favorite: bool,
        /// Contact method as `type=value`; repeatable.
        #[arg(long = "method")]
        methods: Vec<String>,
    },
    Update {
        id: Id,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        favorite: Option<bool>,
    },
    Delete {
        id: Id,
    },
    /// Toggle a contact's favorite flag.
    Favorite {
        id: Id,
    },
    Method(MethodCommand),
    Export {
        #[arg(long, help = "Output path; defaults to the server-suggested filename")]
        output: Option<PathBuf>,
    },
    Import {
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct MethodCommand {
    #[command(subcommand)]
    command: MethodSubcommand,
}

#[derive(Subcommand, Debug)]
enum MethodSubcommand {
    Add { contact_id: Id, kind: MethodKind, value: String },
    Delete { contact_id: Id, method_id: Id },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let storage_dir = match cli.storage_dir {
        Some(dir) => dir,
        None => default_storage_dir()?,
    };
    let config = ClientConfig::new(&cli.base_url, Duration::from_millis(cli.timeout_ms), storage_dir)?;
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.storage_dir));

    let transport = HttpTransport::new(&config)?;
    if let Some(cookie) = storage.get_item(COOKIE_KEY)? {
        tracing::debug!("restoring saved session cookie");
        transport.restore_session_cookie(&cookie);
    }
    let api = ApiClient::new(transport);
    let mut session = Session::new(SessionStore::load(Arc::clone(&storage)));

    let result = dispatch(&api, &mut session, cli.command).await;
    persist_cookie(&api, &session, storage.as_ref())?;
    result
}

/// Keep the server cookie only while the local session is signed in.
fn persist_cookie(api: &ApiClient, session: &Session, storage: &dyn Storage) -> Result<(), StorageError> {
    match api.transport().session_cookie() {
        Some(cookie) if session.is_authenticated() => storage.set_item(COOKIE_KEY, &cookie),
        _ => storage.remove_item(COOKIE_KEY),
    }
}

/// Navigate to `route` and fail if the guard sends us elsewhere.
fn enter(session: &mut Session, route: Route) -> Result<(), CliError> {
    let location = session.navigate(route.path());
    match location.route {
        Some(landed) if landed == route => Ok(()),
        Some(Route::Login) => Err(CliError::LoginRequired),
        _ => {
            let user = session.store().user();
            let name = user.get("username").and_then(|v| v.as_str()).unwrap_or("current user").to_owned();
            Err(CliError::AlreadyLoggedIn(name))
        }
    }
}

async fn dispatch(api: &ApiClient, session: &mut Session, command: Command) -> Result<(), CliError> {
    match command {
        Command::Health => print_json(&api.health().await?),
        Command::Register { username, email, password } => {
            enter(session, Route::Register)?;
            let user = session.register(api, &Registration { username, email, password }).await?;
            print_json(&user)
        }
        Command::Login { username, password } => {
            enter(session, Route::Login)?;
            let user = session.login(api, &Credentials { username, password }).await?;
            print_json(&user)
        }
        Command::Logout => {
            enter(session, Route::Home)?;
            session.logout(api).await?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            enter(session, Route::Home)?;
            print_json(&session.refresh(api).await?)
        }
        Command::List { favorite, search } => {
            enter(session, Route::Home)?;
            let list = session.settle(api.list_contacts(&ContactQuery { favorite, search }).await)?;
            print_json(&list)
        }
        Command::Show { id } => {
            enter(session, Route::Home)?;
            print_json(&session.settle(api.get_contact(id).await)?.contact)
        }
        Command::Add { name, favorite, methods } => {
            enter(session, Route::Home)?;
            let methods = methods.iter().map(|raw| parse_method(raw)).collect::<Result<Vec<_>, _>>()?;
            let contact = NewContact { name, is_favorite: favorite, methods };
            print_json(&session.settle(api.create_contact(&contact).await)?.contact)
        }
        Command::Update { id, name, favorite } => {
            enter(session, Route::Home)?;
            let update = ContactUpdate { name, is_favorite: favorite };
            print_json(&session.settle(api.update_contact(id, &update).await)?.contact)
        }
        Command::Delete { id } => {
            enter(session, Route::Home)?;
            print_json(&session.settle(api.delete_contact(id).await)?)
        }
        Command::Favorite { id } => {
            enter(session, Route::Home)?;
            print_json(&session.settle(api.toggle_favorite(id).await)?.contact)
        }
        Command::Method(method) => {
            enter(session, Route::Home)?;
            run_method(api, session, method).await
        }
        Command::Export { output } => {
            enter(session, Route::Home)?;
            let file = session.settle(api.export_contacts().await)?;
            let path = output.unwrap_or_else(|| export_path(file.filename.as_deref()));
            write_file(&path, &file.bytes)?;
            println!("wrote {} bytes to {}", file.bytes.len(), path.display());
            Ok(())
        }
        Command::Import { path } => {
            enter(session, Route::Home)?;
            let file = read_import_file(&path)?;
            print_json(&session.settle(api.import_contacts(file).await)?)
        }
    }
}

async fn run_method(api: &ApiClient, session: &mut Session, method: MethodCommand) -> Result<(), CliError> {
    match method.command {
        MethodSubcommand::Add { contact_id, kind, value } => {
            let method = NewContactMethod { kind, value };
            print_json(&session.settle(api.add_contact_method(contact_id, &method).await)?.contact)
        }
        MethodSubcommand::Delete { contact_id, method_id } => {
            print_json(&session.settle(api.delete_contact_method(contact_id, method_id).await)?.contact)
        }
    }
}

fn parse_method(raw: &str) -> Result<NewContactMethod, CliError> {
    let (kind, value) = raw.split_once('=').ok_or_else(|| CliError::InvalidMethod(raw.to_owned()))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::InvalidMethod(raw.to_owned()));
    }
    Ok(NewContactMethod { kind: kind.parse()?, value: value.to_owned() })
}

/// Server-suggested filename reduced to its final component.
fn export_path(suggested: Option<&str>) -> PathBuf {
    suggested
        .and_then(|name| Path::new(name).file_name())
        .map_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME), PathBuf::from)
}

fn read_import_file(path: &Path) -> Result<ImportFile, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::File { path: path.to_owned(), source })?;
    let filename = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(ImportFile { filename, bytes })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|source| CliError::File { path: path.to_owned(), source })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
