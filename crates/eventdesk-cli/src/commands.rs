use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use serde_json::{Map, Value};
use tracing::warn;

use eventdesk_core::api::FormPart;
use eventdesk_core::config::Config;
use eventdesk_core::models::{sort_by_start, ContentKind};
use eventdesk_core::navigation::{Navigator, TracingNavigator, LOGIN_ROUTE};
use eventdesk_core::EventDesk;

use crate::Command;

const LOGIN_ENV: &str = "EVENTDESK_LOGIN";
const PASSWORD_ENV: &str = "EVENTDESK_PASSWORD";

/// Fields tried, in order, to label a record in list output
const LABEL_FIELDS: &[&str] = &["title", "name", "event_name", "heading", "caption", "email"];

/// A terminal has no screens to switch; a redirect to login becomes a hint
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, route: &str) {
        if route == LOGIN_ROUTE {
            eprintln!("Please log in again: eventdesk login");
        } else {
            TracingNavigator.navigate(route);
        }
    }
}

pub async fn run(command: Command, config: &mut Config, base_url: String) -> Result<()> {
    let desk = EventDesk::connect(config, base_url, Arc::new(CliNavigator))?;

    match command {
        Command::Login { login } => {
            let identifier = match login
                .or_else(|| std::env::var(LOGIN_ENV).ok())
                .or_else(|| config.last_login.clone())
            {
                Some(id) => id,
                None => prompt("Email or phone: ")?,
            };
            let password = match std::env::var(PASSWORD_ENV) {
                Ok(p) if !p.is_empty() => p,
                _ => rpassword::prompt_password("Password: ").context("Failed to read password")?,
            };
            if identifier.is_empty() || password.is_empty() {
                bail!("Email/phone and password required");
            }

            let role = desk.auth.login_with_password(&identifier, &password).await?;

            config.last_login = Some(identifier);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("Logged in as {} ({})", role, role.home_route());
        }
        Command::Logout => {
            desk.auth.logout();
            println!("Logged out");
        }
        Command::Status => {
            if desk.session.is_authenticated() {
                let bundle = desk.session.bundle();
                println!("Logged in");
                println!("  role:    {}", bundle.role.as_deref().unwrap_or("-"));
                println!("  user id: {}", bundle.subject_id.as_deref().unwrap_or("-"));
                println!("  home:    {}", desk.session.home_route());
            } else {
                println!("Not logged in");
            }
        }
        Command::List { kind } => {
            let kind = parse_kind(&kind)?;
            let items = desk.content.list(kind).await?;
            println!("{} ({})", kind, items.len());
            for item in &items {
                println!("  {}", summarize(item));
            }
        }
        Command::Get { kind, id } => {
            let record = desk.content.get(parse_kind(&kind)?, &id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Create { kind, fields, files } => {
            let kind = parse_kind(&kind)?;
            let record = if files.is_empty() {
                desk.content.create(kind, Value::Object(parse_fields(&fields)?)).await?
            } else {
                desk.content
                    .create_with_files(kind, build_form(&fields, &files)?)
                    .await?
            };
            println!("Created {}", summarize(&record));
        }
        Command::Update { kind, id, fields, files } => {
            let kind = parse_kind(&kind)?;
            let record = if files.is_empty() {
                desk.content
                    .update(kind, &id, Value::Object(parse_fields(&fields)?))
                    .await?
            } else {
                desk.content
                    .update_with_files(kind, &id, build_form(&fields, &files)?)
                    .await?
            };
            println!("Updated {}", summarize(&record));
        }
        Command::Delete { kind, id } => {
            let kind = parse_kind(&kind)?;
            desk.content.delete(kind, &id).await?;
            println!("Deleted {} #{}", kind, id);
        }
        Command::MyEvents { all } => {
            let mut events = desk.content.my_events().await?;
            let today = Local::now().date_naive();
            if !all {
                events.retain(|e| e.is_upcoming(today));
            }
            sort_by_start(&mut events);

            if events.is_empty() {
                println!("{}", empty_events_message(all));
            }
            for event in &events {
                println!(
                    "  {:<14} {:<40} {}",
                    event.formatted_date(),
                    event.display_title(),
                    event.venue.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn parse_kind(raw: &str) -> Result<ContentKind> {
    raw.parse::<ContentKind>().map_err(|e| anyhow!(e))
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("expected key=value, got '{}'", raw),
    }
}

/// `key=value` pairs into a JSON object. Values that parse as JSON
/// (numbers, booleans, arrays) keep their type; anything else is a string.
fn parse_fields(raw: &[String]) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in raw {
        let (key, value) = split_pair(pair)?;
        let parsed = serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()));
        fields.insert(key.to_string(), parsed);
    }
    Ok(fields)
}

fn build_form(fields: &[String], files: &[String]) -> Result<Vec<FormPart>> {
    let mut parts = Vec::new();
    for pair in fields {
        let (key, value) = split_pair(pair)?;
        parts.push(FormPart::text(key, value));
    }
    for spec in files {
        let (key, path) = split_pair(spec)?;
        let path = Path::new(path);
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.to_string());
        parts.push(FormPart::file(key, file_name, guess_mime(path), bytes));
    }
    Ok(parts)
}

fn guess_mime(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        _ => return None,
    };
    Some(mime.to_string())
}

fn empty_events_message(all: bool) -> &'static str {
    if all {
        "No events"
    } else {
        "No upcoming events"
    }
}

/// One-line description of a record: "#id label"
fn summarize(record: &Value) -> String {
    let id = match record.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "?".to_string(),
    };
    let label = LABEL_FIELDS
        .iter()
        .find_map(|f| record.get(*f).and_then(Value::as_str))
        .unwrap_or("(untitled)");
    format!("#{} {}", id, label)
}
