//! CLI module for chatproxy.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version display
//! - Running one exchange and streaming it to the terminal
//!
//! # Usage
//!
//! ```ignore
//! use chatproxy::cli::{parse_args, run_cli_command};
//!
//! let cli = parse_args(std::env::args())?;
//! runtime.block_on(run_cli_command(&proxy, cli, token))?;
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, ArgsError, Cli, CliCommand, SendArgs, USAGE};
pub use version::{version_line, VERSION};

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use color_eyre::{Report, Result, Section};
use tokio_util::sync::CancellationToken;

use crate::error::ProxyError;
use crate::models::ChatResult;
use crate::proxy::{ChatProxy, SendMessageOptions};
use crate::traits::HttpClient;

/// Tracks what has been written to the terminal so each progress update
/// prints only the new tail of the reply.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: Mutex<String>,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to write for a new snapshot of the reply.
    ///
    /// Usually the suffix beyond what was printed. If the backend rewrote
    /// earlier text, the whole reply is printed again on a fresh line.
    pub fn update(&self, text: &str) -> Option<String> {
        let mut printed = self.printed.lock().unwrap_or_else(|p| p.into_inner());
        if text == printed.as_str() {
            return None;
        }

        let output = match text.strip_prefix(printed.as_str()) {
            Some(suffix) => suffix.to_string(),
            None => format!("\n{}", text),
        };
        *printed = text.to_string();
        Some(output)
    }

    /// Output still owed for the final reply, ending the line.
    pub fn finish(&self, final_text: &str) -> String {
        let mut tail = self.update(final_text).unwrap_or_default();
        tail.push('\n');
        tail
    }
}

fn write_stdout(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

/// Attach the category's recovery hint to a failed call.
fn with_hint(err: ProxyError) -> Report {
    let hint = err.category().recovery_hint();
    Report::new(err).suggestion(hint)
}

fn report_ids(result: &ChatResult) {
    eprintln!(
        "conversation_id: {}\nmessage_id: {}",
        result.conversation_id.as_deref().unwrap_or("-"),
        result.id
    );
}

/// Execute a parsed command against the backend.
///
/// `Help` and `Version` need no backend and are handled by the caller.
pub async fn run_cli_command<C: HttpClient>(
    proxy: &ChatProxy<C>,
    cli: Cli,
    token: CancellationToken,
) -> Result<()> {
    let timeout = cli.timeout_ms.map(Duration::from_millis);

    let printer = Arc::new(StreamPrinter::new());
    let sink = Arc::clone(&printer);
    let mut options = SendMessageOptions::new()
        .with_cancellation(token)
        .with_progress(move |partial: &ChatResult| {
            if let Some(text) = sink.update(&partial.text) {
                write_stdout(&text);
            }
        });
    if let Some(timeout) = timeout {
        options = options.with_timeout(timeout);
    }

    let result = match cli.command {
        CliCommand::Help => {
            print!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::LastMessageId { conversation_id } => {
            let id = proxy
                .get_conversation_last_message_id(&conversation_id)
                .await
                .map_err(with_hint)?;
            println!("{}", id);
            return Ok(());
        }
        CliCommand::Continue {
            conversation_id,
            prompt,
        } => {
            proxy
                .continue_conversation(&conversation_id, &prompt, options)
                .await
                .map_err(with_hint)?
        }
        CliCommand::Send(args) => {
            options.conversation_id = args.conversation_id;
            options.parent_message_id = args.parent_message_id;
            options.message_id = args.message_id;
            options.action = args.action;
            proxy
                .send_message(&args.prompt, options)
                .await
                .map_err(with_hint)?
        }
    };

    write_stdout(&printer.finish(&result.text));
    report_ids(&result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printer_prints_only_new_suffix() {
        let printer = StreamPrinter::new();
        assert_eq!(printer.update("He"), Some("He".to_string()));
        assert_eq!(printer.update("Hello"), Some("llo".to_string()));
        assert_eq!(printer.update("Hello"), None);
    }

    #[test]
    fn test_printer_reprints_rewritten_text() {
        let printer = StreamPrinter::new();
        printer.update("Hello");
        assert_eq!(printer.update("Help"), Some("\nHelp".to_string()));
    }

    #[test]
    fn test_printer_finish_ends_line() {
        let printer = StreamPrinter::new();
        printer.update("Hel");
        assert_eq!(printer.finish("Hello"), "lo\n");

        let empty = StreamPrinter::new();
        assert_eq!(empty.finish(""), "\n");
    }
}
