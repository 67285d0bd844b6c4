//! Agenda commands: add, show, example, clear, meta, export.
//!
//! Each command opens one connection, sends a single request, and renders
//! the response.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use agendakit_core::format_agenda;
use agendakit_protocol::{DetailsPatch, Request, Response};

use crate::cli::{Cli, ExportFormat};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use super::{resolve_duration, socket_client, unexpected};

/// Adds an item to the session agenda.
pub async fn add(
    cli: &Cli,
    config: &ClientConfig,
    topic: String,
    owner: String,
    start: NaiveTime,
    duration: Option<u32>,
    notes: String,
) -> ClientResult<()> {
    let duration = resolve_duration(duration, config);
    let request = Request::add_item(topic, owner, start, duration, notes);
    let response = socket_client(cli, config).send(request).await?;
    expect_ok(response)
}

/// Prints the agenda sorted by start time.
pub async fn show(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let response = socket_client(cli, config).send(Request::GetAgenda).await?;
    match response {
        Response::Agenda { details, items } => {
            println!("{}", format_agenda(&details, &items));
            Ok(())
        }
        Response::Error { error } => Err(ClientError::Server(error.message)),
        other => Err(unexpected(other)),
    }
}

/// Replaces the agenda with the built-in example items.
pub async fn example(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let response = socket_client(cli, config).send(Request::LoadExample).await?;
    expect_ok(response)
}

/// Removes every item from the session agenda.
pub async fn clear(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let response = socket_client(cli, config).send(Request::Clear).await?;
    expect_ok(response)
}

/// Updates meeting details. Flags that were not given keep their current
/// value on the server.
pub async fn meta(
    cli: &Cli,
    config: &ClientConfig,
    title: Option<String>,
    date: Option<NaiveDate>,
    location: Option<String>,
    host: Option<String>,
) -> ClientResult<()> {
    let patch = DetailsPatch {
        title,
        date,
        location,
        host,
    };
    if patch.is_empty() {
        println!("nothing to update; pass at least one of --title, --date, --location, --host");
        return Ok(());
    }

    let response = socket_client(cli, config)
        .send(Request::set_details(patch))
        .await?;
    expect_ok(response)
}

/// Exports the agenda and writes the document to stdout or a file.
///
/// When `--output` names a directory the server-suggested filename is
/// appended to it.
pub async fn export(
    cli: &Cli,
    config: &ClientConfig,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> ClientResult<()> {
    let request = match format {
        ExportFormat::Ics => Request::ExportIcs,
        ExportFormat::Json => Request::ExportJson,
    };

    let response = socket_client(cli, config).send(request).await?;
    match response {
        Response::Document {
            filename,
            media_type,
            content,
        } => {
            debug!(filename = %filename, media_type = %media_type, "received export document");
            match output {
                Some(path) => {
                    let path = if path.is_dir() { path.join(&filename) } else { path };
                    std::fs::write(&path, &content)?;
                    println!("wrote {}", path.display());
                }
                None => {
                    if content.ends_with('\n') {
                        print!("{}", content);
                    } else {
                        println!("{}", content);
                    }
                }
            }
            Ok(())
        }
        Response::Error { error } => Err(ClientError::Server(error.message)),
        other => Err(unexpected(other)),
    }
}

/// Maps plain acknowledgement responses onto the process exit code.
/// Warnings print but still exit zero.
fn expect_ok(response: Response) -> ClientResult<()> {
    match response {
        Response::Ok => Ok(()),
        Response::Warning { message } => {
            println!("warning: {}", message);
            Ok(())
        }
        Response::Error { error } => Err(ClientError::Server(error.message)),
        other => Err(unexpected(other)),
    }
}
