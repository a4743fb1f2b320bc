use anyhow::{Context, Result};
use clap::Parser;
use codeassist::app::run_tui;
use codeassist::backend::{Backend, HttpBackend};
use codeassist::config::Config;
use codeassist::controller::Controller;
use codeassist::identity;
use codeassist::keyring::{keyring_disabled, KeychainTokenStore};
use codeassist::session::SessionStore;
use codeassist::ui::App;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

#[derive(Parser, Debug)]
#[command(
    name = "codeassist",
    about = "Review code, generate tests and analyze bugs from your terminal",
    version
)]
struct Args {
    /// Backend address (overrides CODEASSIST_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Address the backend redirected to after GitHub login
    #[arg(long)]
    callback: Option<String>,

    /// Forget the saved session and exit
    #[arg(long)]
    logout: bool,

    /// Print the signed-in GitHub user and exit
    #[arg(long)]
    whoami: bool,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Remember --api-url in the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;

    let mut config = Config::load();
    let api_url = config
        .resolve_api_url(args.api_url.as_deref())
        .context("Failed to resolve the backend address")?;

    if args.save_config {
        config.api_url = Some(api_url.to_string());
        config
            .save()
            .map_err(anyhow::Error::msg)
            .context("Failed to save config")?;
        eprintln!("  Saved to {}", Config::config_location());
    }

    let store = Arc::new(if keyring_disabled() {
        SessionStore::in_memory()
    } else {
        SessionStore::new(Box::new(KeychainTokenStore))
    });

    if args.logout {
        store.clear();
        eprintln!("  Logged out.");
        return Ok(());
    }

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(
        api_url.clone(),
        config.request_timeout(),
        config.dispatch_timeout(),
    )?);
    tracing::info!(api_url = %api_url, store = store.backend_label(), "starting");

    let mut callback = args
        .callback
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("--callback is not a valid address")?;

    if args.whoami {
        return whoami(backend.as_ref(), &store, callback.as_mut()).await;
    }

    let mut controller = Controller::new(Arc::clone(&store));
    let initial: Vec<_> = controller.start(callback.as_mut()).into_iter().collect();
    let app = App::new(controller, api_url.to_string());

    run_tui(app, backend, config.open_browser, initial).await
}

async fn whoami(
    backend: &dyn Backend,
    store: &SessionStore,
    callback: Option<&mut Url>,
) -> Result<()> {
    let Some(session) = store.restore(callback) else {
        println!("Not signed in.");
        return Ok(());
    };
    match identity::resolve(backend, &session).await {
        Ok(user) if user.display_name() != user.login => {
            println!("{} (@{})", user.display_name(), user.login)
        }
        Ok(user) => println!("@{}", user.login),
        Err(e) => {
            if e.is_session_invalid() {
                store.clear();
            }
            println!("{}", e.user_message());
            println!("The saved session was cleared; log in again.");
        }
    }
    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("codeassist")
        .join("codeassist.log")
}

fn init_logging(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory '{}'", parent.display())
            })?;
        }
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}
