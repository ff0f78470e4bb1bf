//! inkpost shell — a keyboard-driven stand-in for the browser UI.
//!
//! The shell wires the session core together the way the web front-end
//! would: every "navigation" consults a route guard first, every backend
//! call goes through the authorized transport, and toasts are printed as
//! they arrive. Feeds and admin data are shown raw; rendering them is
//! not this program's job.

use std::io::{self, Write as _};
use std::path::Path;
use std::sync::{Arc, Weak};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use inkpost::api::{ApiClient, ApiError, RevocationObserver};
use inkpost::auth::{
    CredentialStore, DiskStore, MemoryStore, SavedLogin, SessionManager, Vault,
};
use inkpost::config::Config;
use inkpost::nav::{AdminGuard, AuthGuard, GuestGuard, Navigator, Route};
use inkpost::notify::{Severity, ToastEvent, ToastSink};

/// Keychain service name for the vault passphrase
const KEYRING_SERVICE: &str = "inkpost";

/// Navigator for a line-oriented UI: a route change is a printed line.
struct ShellNavigator;

impl Navigator for ShellNavigator {
    fn navigate(&self, route: Route) {
        println!("-> {}", route.path());
    }
}

/// Initialize tracing into a rolling log file under the data directory,
/// keeping stdout free for the prompt. RUST_LOG controls the level.
fn init_tracing(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let appender = tracing_appender::rolling::daily(log_dir, "inkpost.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    guard
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config ({e}), using defaults");
        Config::default()
    });
    if let Ok(url) = std::env::var("INKPOST_API_URL") {
        config.api_url = url;
    }

    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let _log_guard = init_tracing(&data_dir.join("logs"));
    info!(api_url = %config.api_url, "inkpost shell starting");

    // Sealed disk store when the keychain cooperates, otherwise an
    // in-memory session for this run only.
    let store: Arc<dyn CredentialStore> = match Vault::open_keyring(KEYRING_SERVICE, &data_dir) {
        Ok(vault) => match DiskStore::new(&data_dir, vault) {
            Ok(disk) => Arc::new(disk),
            Err(e) => {
                warn!(error = %e, "disk store unavailable, session will not persist");
                Arc::new(MemoryStore::new())
            }
        },
        Err(e) => {
            warn!(error = %e, "keychain unavailable, session will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let toasts = ToastSink::new();
    let navigator = Arc::new(ShellNavigator);
    let client = ApiClient::new(&config.api_url, store.clone())?;
    let session = Arc::new(SessionManager::new(
        store,
        client.clone(),
        navigator.clone(),
        toasts.clone(),
    ));
    let observer_arc: Arc<dyn RevocationObserver> = session.clone();
    let observer: Weak<dyn RevocationObserver> = Arc::downgrade(&observer_arc);
    client.authorizer().set_observer(observer);

    let auth_guard = AuthGuard::new(session.clone(), navigator.clone());
    let guest_guard = GuestGuard::new(session.clone(), navigator.clone());
    let admin_guard = AdminGuard::new(session.clone(), navigator.clone());

    // Print toasts as they arrive, the way the web UI overlays them.
    let mut toast_rx = toasts.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = toast_rx.recv().await {
            if let ToastEvent::Shown(toast) = event {
                println!("[{}] {}", toast.severity, toast.text);
            }
        }
    });

    match session.principal() {
        Some(p) if session.is_logged_in() => println!("Signed in as {} ({})", p.username, p.role),
        _ => println!("Not signed in. Type `login` or `register`."),
    }

    loop {
        let line = prompt("inkpost> ")?;
        match line.as_str() {
            "" => {}
            "help" => {
                println!("commands: login register logout whoami feed admin help quit");
            }
            "login" => {
                if guest_guard.allows() {
                    login(&session, &mut config, &toasts).await?;
                }
            }
            "register" => {
                if guest_guard.allows() {
                    register(&session, &toasts).await?;
                }
            }
            "logout" => {
                session.logout(true);
                println!("Signed out.");
            }
            "whoami" => match session.principal() {
                Some(p) if session.is_logged_in() => {
                    println!("{} <{}> role={} id={}", p.username, p.email, p.role, p.id);
                }
                _ => println!("anonymous"),
            },
            "feed" => {
                if auth_guard.allows() {
                    show_feed(&client, &toasts).await;
                }
            }
            "admin" => {
                if admin_guard.allows() {
                    show_admin_stats(&client, &toasts).await;
                }
            }
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try `help`)"),
        }
    }

    info!("inkpost shell shutting down");
    Ok(())
}

async fn login(
    session: &SessionManager<ApiClient>,
    config: &mut Config,
    toasts: &ToastSink,
) -> Result<()> {
    let identifier = {
        let default = std::env::var("INKPOST_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone());
        match default {
            Some(last) => {
                let entered = prompt(&format!("Username or email [{last}]: "))?;
                if entered.is_empty() {
                    last
                } else {
                    entered
                }
            }
            None => prompt("Username or email: ")?,
        }
    };

    let password = match std::env::var("INKPOST_PASSWORD") {
        Ok(p) => p,
        Err(_) if SavedLogin::has(&identifier) => {
            let answer = prompt("Use stored password? [Y/n]: ")?;
            if answer.to_lowercase() != "n" {
                SavedLogin::password(&identifier)?
            } else {
                rpassword::prompt_password("Password: ")?
            }
        }
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    match session.login(&identifier, &password).await {
        Ok(principal) => {
            if let Err(e) = SavedLogin::store(&identifier, &password) {
                warn!(error = %e, "failed to save password to keychain");
            }
            config.last_username = Some(identifier);
            if let Err(e) = config.save() {
                warn!(error = %e, "failed to save config");
            }
            toasts.show(format!("Welcome back, {}!", principal.username), Severity::Success);
        }
        Err(e) => report_auth_error(e, toasts),
    }
    Ok(())
}

async fn register(session: &SessionManager<ApiClient>, toasts: &ToastSink) -> Result<()> {
    let username = prompt("Username: ")?;
    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ")?;

    match session.register(&username, &email, &password).await {
        Ok(principal) => {
            toasts.show(format!("Welcome, {}!", principal.username), Severity::Success);
        }
        Err(e) => report_auth_error(e, toasts),
    }
    Ok(())
}

fn report_auth_error(error: ApiError, toasts: &ToastSink) {
    match error {
        ApiError::AuthenticationRejected(message) => toasts.show(message, Severity::Error),
        ApiError::Network(e) => {
            toasts.show("Unable to connect to the server.", Severity::Error);
            warn!(error = %e, "network failure during authentication");
        }
        other => toasts.show(other.to_string(), Severity::Error),
    }
}

async fn show_feed(client: &ApiClient, toasts: &ToastSink) {
    match client.get::<serde_json::Value>("/posts").await {
        Ok(posts) => {
            let count = posts
                .as_array()
                .map(Vec::len)
                .or_else(|| posts.get("posts").and_then(|p| p.as_array()).map(Vec::len))
                .unwrap_or(0);
            println!("{count} post(s) in the feed");
        }
        // A revoked account was already handled by the authorizer; the
        // remaining errors are the feed's own problem to phrase.
        Err(ApiError::AccountRevoked(_)) => {}
        Err(e) => toasts.show(format!("Failed to load posts: {e}"), Severity::Error),
    }
}

async fn show_admin_stats(client: &ApiClient, toasts: &ToastSink) {
    match client.get::<serde_json::Value>("/admin/stats").await {
        Ok(stats) => match serde_json::to_string_pretty(&stats) {
            Ok(rendered) => println!("{rendered}"),
            Err(_) => println!("{stats}"),
        },
        Err(ApiError::AccountRevoked(_)) => {}
        Err(e) => toasts.show(format!("Failed to load admin stats: {e}"), Severity::Error),
    }
}
