//! Interaction history records and the user-turn updater.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SessionKey, SessionStore};
use crate::Result;

/// Who produced an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Agent,
}

/// One entry of `interaction_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub author: Author,
    pub text: String,
}

impl InteractionRecord {
    /// Record of something the user typed.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            text: text.into(),
        }
    }

    /// Record of an agent reply.
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            author: Author::Agent,
            text: text.into(),
        }
    }
}

/// Append the user's utterance to the session's interaction history.
///
/// Must run before the turn is handed to the agent runner so the agent
/// sees the latest message in state.
pub fn record_user_turn(store: &SessionStore, key: &SessionKey, text: &str) -> Result<()> {
    let len = store.update(key, |session| {
        session
            .state
            .push_interaction(InteractionRecord::user(text))
    })?;

    debug!(session = %key.session_id, history_len = len, "Recorded user turn");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SupportDeskError;
    use crate::session::{SessionId, SessionState};

    fn setup() -> (SessionStore, SessionKey) {
        let store = SessionStore::new();
        let session = store
            .create_session("Customer Support", "aiwithsid", &SessionState::customer("Siddharth Sen"))
            .unwrap();
        let key = session.key();
        (store, key)
    }

    #[test]
    fn test_author_serializes_lowercase() {
        let json = serde_json::to_value(InteractionRecord::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"author": "user", "text": "hi"}));

        let json = serde_json::to_value(InteractionRecord::agent("hello")).unwrap();
        assert_eq!(json["author"], "agent");
    }

    #[test]
    fn test_record_preserves_order() {
        let (store, key) = setup();

        record_user_turn(&store, &key, "first").unwrap();
        record_user_turn(&store, &key, "second").unwrap();
        record_user_turn(&store, &key, "third").unwrap();

        let session = store.get(&key).unwrap();
        let history = session.state.interaction_history().unwrap();
        let texts: Vec<_> = history.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(history.iter().all(|r| r.author == Author::User));
    }

    #[test]
    fn test_record_raw_text_kept() {
        let (store, key) = setup();
        record_user_turn(&store, &key, "  padded input ").unwrap();

        let history = store.get(&key).unwrap().state.interaction_history().unwrap();
        assert_eq!(history[0].text, "  padded input ");
    }

    #[test]
    fn test_record_unknown_session() {
        let (store, key) = setup();
        let missing = SessionKey::new(key.app_name.clone(), key.user_id.clone(), SessionId::new());

        let result = record_user_turn(&store, &missing, "hello");
        assert!(matches!(result, Err(SupportDeskError::SessionNotFound(_))));
    }
}
