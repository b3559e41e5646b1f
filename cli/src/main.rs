use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use portal::config::{ConfigError, PortalConfig, normalize_base_url};
use portal::net::api::{ApiClient, ApiError};
use portal::net::auth::HttpAuthService;
use portal::{AppPath, Decision, FileStore, Location, SessionError, SessionStore};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("http client build failed: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("api request failed: {0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no page at {0}")]
    NotFound(String),
}

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Sign in, sign out and navigate against the Portal API")]
struct Cli {
    /// Overrides `PORTAL_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `PORTAL_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange email and password for a session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign into it.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Forget the stored session.
    Logout,
    /// Print the signed-in identity.
    Whoami,
    /// Navigate to a page and report where the guard lands.
    Open { path: String },
    /// Authorized `GET` against the API.
    Get { path: String },
}

struct App {
    session: Arc<SessionStore>,
    location: Arc<Location>,
    api: ApiClient,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(PortalConfig::from_env()?, cli.base_url, cli.state_dir);
    let app = build_app(&config)?;
    app.session.restore();

    match cli.command {
        Command::Login { email, password } => {
            let who = app.session.login(&email, &password).await?;
            println!("signed in as {} ({})", who.email, who.role);
            land(&app, AppPath::Home.as_str())
        }
        Command::Signup { email, password, role } => {
            let who = app.session.signup(&email, &password, &role).await?;
            println!("signed up as {} ({})", who.email, who.role);
            land(&app, AppPath::Home.as_str())
        }
        Command::Logout => {
            app.session.logout();
            println!("signed out");
            if let Some(page) = app.location.current() {
                println!("now at {page}");
            }
            Ok(())
        }
        Command::Whoami => {
            let session = app.session.require_session()?;
            print_json(&serde_json::to_value(&session.identity)?)
        }
        Command::Open { path } => land(&app, &path),
        Command::Get { path } => {
            let body = app.api.get_json(&path).await?;
            print_json(&body)
        }
    }
}

fn resolve_config(mut config: PortalConfig, base_url: Option<String>, state_dir: Option<PathBuf>) -> PortalConfig {
    if let Some(url) = base_url {
        config.api_base_url = normalize_base_url(&url);
    }
    if let Some(dir) = state_dir {
        config.state_dir = dir;
    }
    config
}

fn build_app(config: &PortalConfig) -> Result<App, CliError> {
    let http = portal::net::build_http_client(config.timeouts)?;
    let auth = Arc::new(HttpAuthService::new(http.clone(), config.api_base_url.clone()));
    let storage = Arc::new(FileStore::in_dir(&config.state_dir));
    let location = Arc::new(Location::new());
    let session = Arc::new(SessionStore::new(auth, storage, location.clone()));
    let api = ApiClient::new(http, config.api_base_url.clone(), session.clone());
    tracing::debug!(base_url = %config.api_base_url, state_dir = %config.state_dir.display(), "portal configured");
    Ok(App { session, location, api })
}

fn land(app: &App, path: &str) -> Result<(), CliError> {
    let decision = app.location.open(&app.session, path);
    let line = describe(path, decision).ok_or_else(|| CliError::NotFound(path.to_owned()))?;
    println!("{line}");
    Ok(())
}

fn describe(requested: &str, decision: Decision) -> Option<String> {
    match decision {
        Decision::Render(page) => Some(format!("render {page}")),
        Decision::Redirect(page) => Some(format!("redirect {requested} -> {page}")),
        Decision::NotFound => None,
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
