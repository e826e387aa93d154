//! Interactive chat session.

use super::{load_spreadsheets, relay_client, SET_URL_HINT};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use sheets_config_and_utils::{Config, FileConfigStore, Paths};
use sheets_relay::{ExchangeRecord, ProbeOutcome, SheetsSession, StaticFilePicker};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  /attach <path>   add a CSV or Excel file
  /detach <n>      remove file number <n> (see /files)
  /files           list attached files
  /clear           remove all attached files
  /probe           test the webhook
  /status          show connection status
  /help            show this help
  /quit            leave the chat
Anything else is sent as a message together with the attached files.";

/// One parsed line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    Attach(&'a str),
    Detach(&'a str),
    Files,
    Clear,
    Probe,
    Status,
    Help,
    Quit,
    Unknown(&'a str),
    Blank,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Blank;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "attach" => Input::Attach(arg),
        "detach" => Input::Detach(arg),
        "files" => Input::Files,
        "clear" => Input::Clear,
        "probe" => Input::Probe,
        "status" => Input::Status,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(name),
    }
}

/// Run the chat loop until `/quit` or end of input.
pub async fn chat(
    paths: &Paths,
    config: &Config,
    files: &[PathBuf],
    format: &OutputFormat,
) -> Result<()> {
    let store = Arc::new(FileConfigStore::new(paths.clone()));
    // The stored endpoint is checked in the background; its result shows up
    // with the next batch of records.
    let session = SheetsSession::open(store, relay_client(config)?).await;

    if !files.is_empty() {
        let picked = StaticFilePicker::new(load_spreadsheets(files)?);
        session.attach(&picked).await?;
    }

    let mut view = TranscriptView::new(*format);
    view.flush(&session.transcript().await);
    report_missing_endpoint(&session, format);
    if *format == OutputFormat::Text {
        println!("Type /help for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        view.prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Message(text) => {
                session.send(text).await;
            }
            Input::Attach(path) => attach(&session, path, format).await,
            Input::Detach(arg) => detach(&session, arg, format).await,
            Input::Files => list_files(&session).await,
            Input::Clear => {
                session.clear_attachments().await;
                output::print_success("All files removed", format);
            }
            Input::Probe => {
                match session.probe().await {
                    ProbeOutcome::Failed(e) => output::print_error(&e.report(), format),
                    ProbeOutcome::NotConfigured => output::print_error(SET_URL_HINT, format),
                    ProbeOutcome::Connected => {}
                }
            }
            Input::Status => {
                let status = session.relay().status().await;
                output::print_row("Status", status.label());
                let webhook = match session.endpoint() {
                    Ok(Some(url)) => url,
                    Ok(None) => "(not set)".to_string(),
                    Err(e) => format!("(unreadable: {})", e),
                };
                output::print_row("Webhook", &webhook);
                output::print_row("Files", &session.attachments().await.len().to_string());
            }
            Input::Unknown(name) => {
                output::print_error(&format!("unknown command '/{}', try /help", name), format)
            }
        }

        view.flush(&session.transcript().await);
    }

    debug!("Chat session ended");
    Ok(())
}

fn report_missing_endpoint(session: &SheetsSession, format: &OutputFormat) {
    match session.endpoint() {
        Ok(Some(_)) => {}
        Ok(None) => output::print_error(SET_URL_HINT, format),
        Err(e) => output::print_error(&e.to_string(), format),
    }
}

async fn attach(session: &SheetsSession, path: &str, format: &OutputFormat) {
    if path.is_empty() {
        output::print_error("usage: /attach <path>", format);
        return;
    }
    let picked = match load_spreadsheets(&[PathBuf::from(path)]) {
        Ok(picked) => picked,
        Err(e) => {
            output::print_error(&format!("cannot read {}: {:#}", path, e), format);
            return;
        }
    };
    match session.attach(&StaticFilePicker::new(picked)).await {
        Ok(0) => {}
        Ok(_) => output::print_success(&format!("Attached {}", path), format),
        Err(e) => output::print_error(&e.to_string(), format),
    }
}

async fn detach(session: &SheetsSession, arg: &str, format: &OutputFormat) {
    let removed = match arg.parse::<usize>() {
        Ok(n) if n >= 1 => session.remove_attachment(n - 1).await,
        _ => None,
    };
    match removed {
        Some(file) => output::print_success(&format!("Removed {}", file.name()), format),
        None => output::print_error("usage: /detach <n>, numbers as listed by /files", format),
    }
}

async fn list_files(session: &SheetsSession) {
    let attachments = session.attachments().await;
    output::print_heading("Attached files");
    if attachments.is_empty() {
        println!("  (none)");
    }
    for (i, file) in attachments.iter().enumerate() {
        println!(
            "  {:>2}. {:<32} {:>10}",
            i + 1,
            file.name(),
            output::format_size(file.size())
        );
    }
}

/// Prints transcript records the user has not seen yet.
struct TranscriptView {
    format: OutputFormat,
    shown: usize,
}

impl TranscriptView {
    fn new(format: OutputFormat) -> Self {
        Self { format, shown: 0 }
    }

    fn flush(&mut self, records: &[ExchangeRecord]) {
        for record in records.iter().skip(self.shown) {
            // The user just typed their own message.
            if self.format == OutputFormat::Text && record.is_from_user() {
                continue;
            }
            output::print_record(record, &self.format);
        }
        self.shown = records.len();
    }

    fn prompt(&self) {
        if self.format == OutputFormat::Text {
            print!("> ");
            let _ = std::io::stdout().flush();
        }
    }
}
