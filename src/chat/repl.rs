//! Chat loop over a line-oriented input and a text output.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, Level};

use super::ChatPhase;
use crate::agent::AgentRunner;
use crate::error::SupportDeskError;
use crate::session::{
    display_value, record_user_turn, Session, SessionKey, SessionState, SessionStore,
};
use crate::Result;

/// Printed when the user ends the conversation.
pub const FAREWELL: &str = "Ending conversation. Goodbye!";

const PROMPT: &str = "You: ";

/// Check whether a line asks to end the conversation.
///
/// Matches `exit` or `quit`, ignoring case and surrounding whitespace.
pub fn is_exit_command(input: &str) -> bool {
    let command = input.trim().to_lowercase();
    command == "exit" || command == "quit"
}

/// Parameters of the session the loop creates.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub app_name: String,
    pub user_id: String,
    pub initial_state: SessionState,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct ChatSummary {
    /// Session as it was after the last turn.
    pub session: Session,
    /// Number of turns forwarded to the agent.
    pub turns: usize,
}

/// Sequential chat loop over one session.
pub struct ChatLoop {
    store: Arc<SessionStore>,
    runner: Arc<dyn AgentRunner>,
    settings: ChatSettings,
    phase: ChatPhase,
}

impl ChatLoop {
    /// Create a chat loop that will open its session in `store`.
    pub fn new(
        store: Arc<SessionStore>,
        runner: Arc<dyn AgentRunner>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            store,
            runner,
            settings,
            phase: ChatPhase::Init,
        }
    }

    /// Current phase of the loop.
    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Run the conversation to completion.
    ///
    /// Reads one line per turn from `input` until an exit command or end
    /// of input, then prints the final session state to `out`. Any failure
    /// aborts the run without a final dump and leaves the loop
    /// [`ChatPhase::Terminated`].
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<ChatSummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        // A loop runs once; its session belongs to that single run
        if self.phase != ChatPhase::Init {
            return Err(SupportDeskError::InvalidPhaseTransition {
                from: self.phase,
                to: ChatPhase::Running,
            });
        }

        match self.converse(input, out).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                if !self.phase.is_terminal() {
                    self.phase.transition_to(ChatPhase::Terminated)?;
                }
                Err(e)
            }
        }
    }

    async fn converse<R, W>(&mut self, input: R, out: &mut W) -> Result<ChatSummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let key = self.start(out)?;

        let mut lines = input.lines();
        let mut turns = 0;

        while self.phase.accepts_turns() {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                debug!("Input closed, ending conversation");
                writeln!(out)?;
                break;
            };

            if is_exit_command(&line) {
                break;
            }

            if let Err(e) = self.turn(&key, &line, out).await {
                error!(session = %key.session_id, error = %e, "Turn failed, aborting");
                return Err(e);
            }
            turns += 1;
        }

        writeln!(out, "{}", FAREWELL)?;
        self.phase.transition_to(ChatPhase::Terminated)?;

        let session = self.dump_final_state(&key, out)?;
        info!(session = %key.session_id, turns, "Conversation ended");
        Ok(ChatSummary { session, turns })
    }

    fn start<W: Write>(&mut self, out: &mut W) -> Result<SessionKey> {
        let session = self.store.create_session(
            self.settings.app_name.clone(),
            self.settings.user_id.clone(),
            &self.settings.initial_state,
        )?;
        info!(
            app = %session.app_name,
            user = %session.user_id,
            session = %session.id,
            "Session started"
        );

        writeln!(out, "Created new session: {}", session.id)?;
        writeln!(out, "Welcome to customer service support")?;
        writeln!(out, "Type exit or quit to end the conversation.")?;
        writeln!(out)?;

        self.phase.transition_to(ChatPhase::Running)?;
        Ok(session.key())
    }

    async fn turn<W: Write>(&self, key: &SessionKey, line: &str, out: &mut W) -> Result<()> {
        record_user_turn(&self.store, key, line)?;

        let reply = self.runner.send(&self.store, key, line).await?;
        writeln!(out, "Agent: {}", reply.trim_end())?;
        writeln!(out)?;

        if tracing::enabled!(Level::DEBUG) {
            let session = self.store.get(key)?;
            let state = serde_json::to_string(&session.state).unwrap_or_default();
            debug!(session = %key.session_id, state = %state, "State after turn");
        }
        Ok(())
    }

    fn dump_final_state<W: Write>(&self, key: &SessionKey, out: &mut W) -> Result<Session> {
        let session = self
            .store
            .get_session(&key.app_name, &key.user_id, &key.session_id)?;

        writeln!(out)?;
        writeln!(out, "Final Session State:")?;
        for (name, value) in session.state.iter() {
            writeln!(out, "{}: {}", name, display_value(value))?;
        }
        out.flush()?;
        Ok(session)
    }
}
