//! # support-desk
//!
//! Interactive customer-support chat over an LLM agent.
//!
//! A [`ChatLoop`] opens one session in a [`SessionStore`], records every
//! user line in the session's `interaction_history`, forwards it to an
//! [`AgentRunner`] and prints the reply. On `exit` or `quit` it prints the
//! final session state.
//!
//! ## Features
//!
//! - **Session store**: in-memory sessions keyed by app, user and id
//! - **Pluggable agents**: any [`AgentRunner`]; the bundled
//!   [`CompletionsRunner`] speaks the OpenAI chat-completions protocol
//! - **Course tools**: the agent can purchase and refund courses, which
//!   updates `purchased_courses` in the session state
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use support_desk::{ChatLoop, CompletionsRunner, Config, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> support_desk::Result<()> {
//!     support_desk::logging::try_init("support_desk=info").ok();
//!
//!     let config = Config::default();
//!     let runner_config = config.to_runner_config().expect("valid config");
//!     let runner = Arc::new(CompletionsRunner::new(runner_config)?);
//!     let store = Arc::new(SessionStore::new());
//!
//!     let mut chat = ChatLoop::new(store, runner, config.chat_settings());
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!     let summary = chat.run(stdin, &mut std::io::stdout()).await?;
//!
//!     println!("{} turns", summary.turns);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use agent::{AgentRunner, CompletionsRunner, RunnerConfig};
pub use chat::{ChatLoop, ChatPhase, ChatSettings, ChatSummary};
pub use config::Config;
pub use error::{Result, SupportDeskError};
pub use session::{
    record_user_turn, InteractionRecord, Session, SessionId, SessionKey, SessionState,
    SessionStore,
};
