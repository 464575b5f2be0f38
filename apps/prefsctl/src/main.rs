mod config;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use prefs_core::{widgets::HistoryField, PrefsError, PrefsRegistry};
use serde_json::Value;
use shared::{
    domain::Scope,
    error::{ErrorCode, ErrorReport},
    protocol::{PreferenceEntry, ToolResponse},
};
use storage::{FileBackend, StorageBackends};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "prefsctl", about = "Inspect and edit stored preferences")]
struct Cli {
    #[arg(long, default_value = "prefsctl.toml")]
    config: PathBuf,
    #[arg(long, default_value_t = Scope::Extension)]
    scope: Scope,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Get {
        key: String,
    },
    /// `value` is parsed as JSON.
    Set {
        key: String,
        value: String,
    },
    Unset {
        key: String,
    },
    List,
    /// History fields always live in the extension store.
    HistoryPush {
        key: String,
        entry: String,
        #[arg(long)]
        max: Option<usize>,
    },
    /// Reads a history field from the extension store.
    History {
        key: String,
        #[arg(long)]
        max: Option<usize>,
    },
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Set { .. } | Command::Unset { .. } | Command::HistoryPush { .. }
        )
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = config::load_settings(&cli.config)?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let registry = open_registry(&settings)?;
    let mutates = cli.command.mutates();
    let response = run(&registry, &settings, cli.scope, cli.command);
    // Read-only commands must not rewrite stores they merely inspected.
    if mutates {
        registry.shutdown();
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(match response {
        ToolResponse::Error(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn open_registry(settings: &config::Settings) -> Result<PrefsRegistry> {
    let defaults = config::Settings::default();
    let extension =
        config::prepare_store_path(&settings.extension_store, &defaults.extension_store)?;
    let project = config::prepare_store_path(&settings.project_store, &defaults.project_store)?;
    info!(extension = %extension.display(), project = %project.display(), "opening stores");

    Ok(PrefsRegistry::new(StorageBackends::new(
        Arc::new(FileBackend::open(&extension)?),
        Arc::new(FileBackend::open(&project)?),
    )))
}

fn run(
    registry: &PrefsRegistry,
    settings: &config::Settings,
    scope: Scope,
    command: Command,
) -> ToolResponse {
    let stored_scope = matches!(
        command,
        Command::Get { .. } | Command::Set { .. } | Command::Unset { .. } | Command::List
    );
    if stored_scope && !scope.is_persistent() {
        return invalid(format!("{scope} preferences are never stored"));
    }
    if !stored_scope && scope != Scope::Extension {
        return invalid(format!(
            "history fields live in the extension store, not {scope}"
        ));
    }

    let result = match command {
        Command::Get { key } => get(registry, scope, key),
        Command::Set { key, value } => match serde_json::from_str::<Value>(&value) {
            Ok(value) => set(registry, scope, key, Some(value)),
            Err(err) => return invalid(format!("value is not valid JSON: {err}")),
        },
        Command::Unset { key } => set(registry, scope, key, None),
        Command::List => list(registry, scope),
        Command::HistoryPush { key, entry, max } => {
            history(registry, &key, max.unwrap_or(settings.history_limit), Some(&entry))
        }
        Command::History { key, max } => {
            history(registry, &key, max.unwrap_or(settings.history_limit), None)
        }
    };

    result.unwrap_or_else(|err| ToolResponse::Error(ErrorReport::from(&err)))
}

fn get(registry: &PrefsRegistry, scope: Scope, key: String) -> Result<ToolResponse, PrefsError> {
    let pref = registry.declare_optional::<Value>(&key, scope, None, None)?;
    Ok(ToolResponse::Value {
        value: pref.get(),
        key,
        scope,
    })
}

fn set(
    registry: &PrefsRegistry,
    scope: Scope,
    key: String,
    value: Option<Value>,
) -> Result<ToolResponse, PrefsError> {
    let pref = registry.declare_optional::<Value>(&key, scope, None, None)?;
    pref.set(value);
    Ok(ToolResponse::Updated { key, scope })
}

fn list(registry: &PrefsRegistry, scope: Scope) -> Result<ToolResponse, PrefsError> {
    let mut keys = registry.backends().for_scope(scope).keys();
    keys.sort();

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        let pref = registry.declare_optional::<Value>(&key, scope, None, None)?;
        match pref.get() {
            Some(value) => entries.push(PreferenceEntry { key, scope, value }),
            None => warn!(key = %key, "skipping unreadable preference"),
        }
    }
    Ok(ToolResponse::Entries(entries))
}

fn history(
    registry: &PrefsRegistry,
    key: &str,
    max_history: usize,
    push: Option<&str>,
) -> Result<ToolResponse, PrefsError> {
    let field = HistoryField::declare(registry, key, max_history)?;
    if let Some(entry) = push {
        field.push(entry);
    }
    Ok(ToolResponse::History {
        key: key.to_string(),
        newest_first: field.entries_newest_first(),
    })
}

fn invalid(message: String) -> ToolResponse {
    ToolResponse::Error(ErrorReport::new(ErrorCode::Validation, message))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
