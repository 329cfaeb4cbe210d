//! Command-line interface for support-desk.
//!
//! Uses lexopt for minimal binary size overhead (~34KB). Every flag is
//! optional; without flags the chat starts with the configured defaults.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Application name of the session.
    pub app_name: Option<String>,
    /// User id of the session.
    pub user_id: Option<String>,
    /// Customer name placed in the initial state.
    pub user_name: Option<String>,
    /// Model requested from the agent backend.
    pub model: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('a') | Long("app-name") => {
                result.app_name = Some(non_empty("app-name", parser.value()?.parse()?)?);
            }
            Short('u') | Long("user-id") => {
                result.user_id = Some(non_empty("user-id", parser.value()?.parse()?)?);
            }
            Short('n') | Long("user-name") => {
                result.user_name = Some(parser.value()?.parse()?);
            }
            Short('m') | Long("model") => {
                result.model = Some(non_empty("model", parser.value()?.parse()?)?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn non_empty(name: &'static str, value: String) -> Result<String, ArgsError> {
    if value.trim().is_empty() {
        Err(ArgsError::InvalidValue(name, value))
    } else {
        Ok(value)
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"support-desk {version}
Interactive customer-support chat with in-memory session state

USAGE:
    support-desk [OPTIONS]

Type a question at the `You:` prompt. Type `exit` or `quit` to end the
conversation and print the final session state.

OPTIONS:
    -c, --config <FILE>      Path to configuration file (JSON)
    -a, --app-name <NAME>    Application name [default: Customer Support]
    -u, --user-id <ID>       User id [default: aiwithsid]
    -n, --user-name <NAME>   Customer name [default: Siddharth Sen]
    -m, --model <MODEL>      Model name [default: gpt-4o-mini]
    -l, --log-level <LVL>    Log level (error, warn, info, debug, trace)
    -h, --help               Print help
    -V, --version            Print version

ENVIRONMENT VARIABLES:
    SUPPORT_DESK_API_KEY     API key (falls back to OPENAI_API_KEY)
    SUPPORT_DESK_API_BASE    API base URL (falls back to OPENAI_BASE_URL)
    SUPPORT_DESK_MODEL       Model name (falls back to OPENAI_MODEL)
    SUPPORT_DESK_APP_NAME    Application name
    SUPPORT_DESK_USER_ID     User id
    SUPPORT_DESK_USER_NAME   Customer name
    SUPPORT_DESK_LOG_LEVEL   Log level (falls back to RUST_LOG)

    Variables may also be placed in a .env file in the working directory.

EXAMPLES:
    # Start with defaults
    support-desk

    # Different customer, verbose logs on stderr
    support-desk -n "Ada Lovelace" -l debug

    # Local OpenAI-compatible server
    SUPPORT_DESK_API_BASE=http://localhost:11434/v1 support-desk -m llama3.1
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("support-desk {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
