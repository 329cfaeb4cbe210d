//! Session management module.
//!
//! This module provides the in-memory session store, the session state
//! mapping and the interaction-history updater.

mod history;
mod id;
mod state;
mod store;

pub use history::{record_user_turn, Author, InteractionRecord};
pub use id::SessionId;
pub use state::{
    display_value, SessionState, INTERACTION_HISTORY, PURCHASED_COURSES, USER_NAME,
};
pub use store::{Session, SessionKey, SessionStore};
