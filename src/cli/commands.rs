//! CLI command implementations
//!
//! Every command loads the configuration and opens the store first, which
//! runs the create/upgrade hooks of the declared tables.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::ProviderConfig;
use crate::http_server::HttpServer;
use crate::notify::{ChangeNotifier, ChannelNotifier, NoopNotifier};
use crate::router::TableRouter;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_request_lines, write_error, write_response};
use super::request::Request;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    init_tracing();
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Exec { config } => exec(&config),
        Command::Start { config } => start(&config),
        Command::Serve { config, port } => serve(&config, port),
    }
}

/// Logs go to stderr; stdout carries responses only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn open_router(
    config: &ProviderConfig,
    notifier: Arc<dyn ChangeNotifier>,
) -> CliResult<TableRouter> {
    let router = config.open_router(notifier)?;
    info!(
        event = "ROUTER_READY",
        authority = %config.authority,
        version = config.database.version,
        tables = ?router.registry().table_names()
    );
    Ok(router)
}

/// Open the database, creating or upgrading the declared tables
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = ProviderConfig::load(config_path)?;
    let router = open_router(&config, Arc::new(NoopNotifier))?;

    write_response(
        &mut io::stdout(),
        json!({
            "initialized": true,
            "version": config.database.version,
            "tables": router.registry().table_names(),
        }),
    )
}

/// Execute a single request from stdin and exit
pub fn exec(config_path: &Path) -> CliResult<()> {
    let config = ProviderConfig::load(config_path)?;
    let router = open_router(&config, Arc::new(NoopNotifier))?;

    let request = read_request(&mut io::stdin().lock())?;
    respond(&router, request, &mut io::stdout())
}

/// Serve line-delimited requests from stdin until EOF
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = ProviderConfig::load(config_path)?;
    let router = open_router(&config, Arc::new(NoopNotifier))?;

    serve_lines(&router, io::stdin().lock(), &mut io::stdout())
}

/// Serve requests over HTTP until the server stops
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = ProviderConfig::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let (notifier, mut changes) = ChannelNotifier::new();
        let router = open_router(&config, Arc::new(notifier))?;

        tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                debug!(event = "CHANGE", kind = %change.kind, uri = %change.uri, id = %change.id);
            }
        });

        HttpServer::new(config.http.clone(), config.authority.clone(), Arc::new(router))
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Answer every request line on `reader`; I/O failures end the loop
pub fn serve_lines(
    router: &TableRouter,
    reader: impl BufRead,
    writer: &mut impl Write,
) -> CliResult<()> {
    for line in read_request_lines(reader) {
        let line = line?;
        match serde_json::from_str::<Value>(&line) {
            Ok(request) => respond(router, request, writer)?,
            Err(e) => write_error(writer, "INVALID_REQUEST", &format!("Invalid JSON: {}", e))?,
        }
    }
    Ok(())
}

/// Execute one request and write its response
fn respond(router: &TableRouter, request: Value, writer: &mut impl Write) -> CliResult<()> {
    match Request::from_json(request).and_then(|r| r.execute(router)) {
        Ok(data) => write_response(writer, data),
        Err(e) => write_error(writer, e.code(), &e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("tablerouter.json");
        let db_path = temp_dir.path().join("data.db");

        let config = json!({
            "authority": "com.example.app",
            "database": { "path": db_path.to_string_lossy() },
            "tables": [{
                "name": "notes",
                "create_sql": "CREATE TABLE notes (_id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL)",
                "columns": [{"alias": "_id"}, {"alias": "title"}],
                "required_columns": ["title"]
            }]
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn responses(output: Vec<u8>) -> Vec<Value> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_init_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();
        assert!(temp_dir.path().join("data.db").exists());

        // Reopening an initialized database is fine
        init(&config_path).unwrap();
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = init(&temp_dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("missing.json"));
    }

    #[test]
    fn test_serve_lines_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config = ProviderConfig::load(&create_config(&temp_dir)).unwrap();
        let router = config.open_router(Arc::new(NoopNotifier)).unwrap();

        let input = [
            r#"{"op": "insert", "uri": "content://com.example.app/notes", "values": {"title": "a"}}"#,
            "",
            "not json",
            r#"{"op": "query", "uri": "content://com.example.app/notes/title/a"}"#,
            r#"{"op": "insert", "uri": "content://com.example.app/notes/1", "values": {"title": "b"}}"#,
        ]
        .join("\n");

        let mut output = Vec::new();
        serve_lines(&router, Cursor::new(input), &mut output).unwrap();

        let out = responses(output);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0]["data"]["uri"], "content://com.example.app/notes/1");
        assert_eq!(out[1]["code"], "INVALID_REQUEST");
        assert_eq!(out[2]["data"]["count"], 1);
        assert_eq!(out[2]["data"]["rows"][0]["title"], "a");
        assert_eq!(out[3]["status"], "error");
        assert_eq!(out[3]["code"], "INVALID_ARGUMENT");
    }
}
