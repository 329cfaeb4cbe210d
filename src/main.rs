//! support-desk binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use support_desk::cli::{self, Args};
use support_desk::{logging, ChatLoop, CompletionsRunner, Config, SessionStore};
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine; the process environment still applies
    dotenv::dotenv().ok();

    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run 'support-desk --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized yet when config loading fails
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(args)?;
    logging::init(config.log_filter());

    info!("support-desk v{}", env!("CARGO_PKG_VERSION"));

    let runner_config = config.to_runner_config()?;
    info!(
        api_base = %runner_config.api_base,
        model = %runner_config.model,
        "Agent configured"
    );
    let runner = Arc::new(CompletionsRunner::new(runner_config)?);

    // One store per process, handed to the chat loop
    let store = Arc::new(SessionStore::new());

    let mut chat = ChatLoop::new(store, runner, config.chat_settings());
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    chat.run(stdin, &mut stdout).await?;

    Ok(())
}
