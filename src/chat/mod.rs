//! Interactive chat loop.
//!
//! Drives one session through `Init -> Running -> Terminated`: create the
//! session, forward each user line to the agent runner, then dump the
//! final state.

mod phase;
mod repl;

pub use phase::ChatPhase;
pub use repl::{is_exit_command, ChatLoop, ChatSettings, ChatSummary, FAREWELL};
