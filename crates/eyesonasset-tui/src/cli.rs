//! Non-interactive commands: `--login`, `--logout`, `--status`.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, Utc};

use eyesonasset_core::auth::{
    AuthGateway, Credentials, LocalSessionStore, LogoutAction, SessionEvaluator, SessionStore,
    SystemClock,
};
use eyesonasset_core::config::{ENV_PASSWORD, ENV_USERNAME};
use eyesonasset_core::routing::NavigationLog;
use eyesonasset_core::Config;

pub const USAGE: &str = "\
Usage: eyesonasset [COMMAND]

Without a command the terminal UI starts.

Commands:
  --login    Log in and store the session
  --logout   Clear the stored session
  --status   Show whether a session is valid and when it expires
  --help     Show this message";

fn open_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    let storage = config.open_storage(&config.cache_dir()?);
    Ok(Arc::new(
        LocalSessionStore::new(storage, Arc::new(SystemClock))
            .with_fallback_lifetime(config.session_fallback_secs),
    ))
}

fn prompt_username(default: Option<&str>) -> Result<String> {
    match default {
        Some(name) => print!("Username [{}]: ", name),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim();
    Ok(match (username.is_empty(), default) {
        (true, Some(name)) => name.to_string(),
        _ => username.to_string(),
    })
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

pub async fn login(mut config: Config) -> Result<()> {
    let store = open_store(&config)?;
    let gateway = AuthGateway::new(&config)?;

    let identifier = match std::env::var(ENV_USERNAME).ok().filter(|u| !u.trim().is_empty()) {
        Some(name) => name,
        None => prompt_username(config.last_identifier.as_deref())?,
    };
    let password = match std::env::var(ENV_PASSWORD).ok().filter(|p| !p.is_empty()) {
        Some(password) => password,
        None => prompt_password()?,
    };
    let credentials = Credentials::new(identifier, password);

    match gateway.sign_in(&credentials, store.as_ref()).await {
        Ok(record) => {
            let minutes = record.minutes_until_expiry(Utc::now());
            println!("Logged in as {} (session valid for {} minutes)", credentials.identifier, minutes);
            config.last_identifier = Some(credentials.identifier.clone());
            config.save().context("Failed to save config")?;
            Ok(())
        }
        Err(e) => anyhow::bail!(e.user_message()),
    }
}

pub fn logout(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let action = LogoutAction::new(store, config.routes.login_path.clone());
    let mut nav = NavigationLog::new();
    action.logout(&mut nav);
    println!("Logged out");
    Ok(())
}

pub fn status(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let evaluator = SessionEvaluator::new(store, Arc::new(SystemClock));

    match evaluator.current() {
        Some(record) => {
            let minutes = record.minutes_until_expiry(Utc::now());
            let at = record
                .expires_at()
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("Session valid: expires in {} minutes ({})", minutes, at);
        }
        None => println!("No valid session. Run with --login to sign in."),
    }
    Ok(())
}
