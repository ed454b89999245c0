//! Command-line argument parsing for the chatproxy CLI.
//!
//! Flags taking a value accept both `--flag value` and `--flag=value`.
//! Remaining positional words are joined with spaces to form the prompt.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::MessageAction;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show usage
    Help,
    /// Show version information
    Version,
    /// Send a prompt and print the reply (default)
    Send(SendArgs),
    /// Print the latest message id of a conversation
    LastMessageId { conversation_id: String },
    /// Reply after the latest message of a conversation
    Continue {
        conversation_id: String,
        prompt: String,
    },
}

/// Arguments of a plain send.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendArgs {
    pub prompt: String,
    pub conversation_id: Option<String>,
    pub parent_message_id: Option<String>,
    pub message_id: Option<String>,
    pub action: MessageAction,
}

/// Full parse result: the command plus options shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: CliCommand,
    pub config_path: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("invalid value '{value}' for {flag}")]
    InvalidValue { flag: String, value: String },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("a prompt is required")]
    MissingPrompt,

    #[error("{0} does not take a prompt")]
    UnexpectedPrompt(String),

    #[error("{0} and {1} cannot be used together")]
    Conflict(String, String),
}

/// Usage text printed by `--help`.
pub const USAGE: &str = "\
Usage: chatproxy [OPTIONS] <PROMPT>...

Send a prompt to the conversation backend and stream the reply to stdout.

Options:
      --conversation-id <ID>       Continue this conversation (needs --parent-message-id)
      --parent-message-id <ID>     Message the reply should follow
      --message-id <ID>            Id for the outgoing message (generated if omitted)
      --variant                    Regenerate an alternative reply
      --timeout-ms <MS>            Overall deadline in milliseconds
      --last-message-id <CONV_ID>  Print the latest message id of a conversation
      --continue <CONV_ID>         Reply after the latest message of a conversation
      --config <PATH>              Config file (default: ~/.chatproxy/config.json)
  -V, --version                    Print version
  -h, --help                       Print help
";

/// Parse command-line arguments.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Examples
///
/// ```
/// use chatproxy::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chatproxy".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap().command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<Cli, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut send = SendArgs::default();
    let mut words: Vec<String> = Vec::new();
    let mut config_path = None;
    let mut timeout_ms = None;
    let mut last_message_id: Option<String> = None;
    let mut continue_id: Option<String> = None;

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        if arg == "--" {
            words.extend(args.by_ref());
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            words.push(arg);
            continue;
        }

        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg.clone(), None),
        };
        let mut value = |flag: &str| -> Result<String, ArgsError> {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
        };

        match flag.as_str() {
            "--help" | "-h" => return Ok(Cli::bare(CliCommand::Help)),
            "--version" | "-V" => return Ok(Cli::bare(CliCommand::Version)),
            "--conversation-id" => send.conversation_id = Some(value(&flag)?),
            "--parent-message-id" => send.parent_message_id = Some(value(&flag)?),
            "--message-id" => send.message_id = Some(value(&flag)?),
            "--variant" => send.action = MessageAction::Variant,
            "--timeout-ms" => {
                let raw = value(&flag)?;
                let ms = raw
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| ArgsError::InvalidValue {
                        flag: flag.clone(),
                        value: raw.clone(),
                    })?;
                timeout_ms = Some(ms);
            }
            "--last-message-id" => last_message_id = Some(value(&flag)?),
            "--continue" => continue_id = Some(value(&flag)?),
            "--config" => config_path = Some(PathBuf::from(value(&flag)?)),
            _ => return Err(ArgsError::UnknownOption(arg)),
        }
    }

    let prompt = words.join(" ");

    let command = match (last_message_id, continue_id) {
        (Some(_), Some(_)) => {
            return Err(ArgsError::Conflict(
                "--last-message-id".to_string(),
                "--continue".to_string(),
            ))
        }
        (Some(conversation_id), None) => {
            if !prompt.is_empty() {
                return Err(ArgsError::UnexpectedPrompt("--last-message-id".to_string()));
            }
            CliCommand::LastMessageId { conversation_id }
        }
        (None, Some(conversation_id)) => {
            if send.conversation_id.is_some() {
                return Err(ArgsError::Conflict(
                    "--continue".to_string(),
                    "--conversation-id".to_string(),
                ));
            }
            if prompt.trim().is_empty() {
                return Err(ArgsError::MissingPrompt);
            }
            CliCommand::Continue {
                conversation_id,
                prompt,
            }
        }
        (None, None) => {
            if prompt.trim().is_empty() {
                return Err(ArgsError::MissingPrompt);
            }
            send.prompt = prompt;
            CliCommand::Send(send)
        }
    };

    Ok(Cli {
        command,
        config_path,
        timeout_ms,
    })
}

impl Cli {
    fn bare(command: CliCommand) -> Self {
        Self {
            command,
            config_path: None,
            timeout_ms: None,
        }
    }
}
