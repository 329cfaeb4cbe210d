//! Agent runners.
//!
//! An [`AgentRunner`] turns one user message into one reply. It receives
//! the session store and the session key so it can read the current state
//! and, through its own tools, change it.
//!
//! ## Example
//!
//! ```
//! use async_trait::async_trait;
//! use support_desk::agent::AgentRunner;
//! use support_desk::session::{SessionKey, SessionStore};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl AgentRunner for Echo {
//!     async fn send(
//!         &self,
//!         _store: &SessionStore,
//!         _key: &SessionKey,
//!         text: &str,
//!     ) -> support_desk::Result<String> {
//!         Ok(format!("you said: {}", text))
//!     }
//! }
//! ```

mod catalog;
mod completions;
mod instruction;

use async_trait::async_trait;

use crate::session::{SessionKey, SessionStore};
use crate::Result;

pub use catalog::{Course, CourseCatalog, ToolOutcome};
pub use completions::{CompletionsRunner, RunnerConfig};
pub use instruction::{render_instruction, DEFAULT_INSTRUCTION};

/// Produces replies for a session.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Send one user message and wait for the reply.
    ///
    /// Failures are reported as [`crate::SupportDeskError::AgentInvocation`].
    async fn send(&self, store: &SessionStore, key: &SessionKey, text: &str) -> Result<String>;
}
