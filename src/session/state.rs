//! Session state mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::history::InteractionRecord;
use crate::error::SupportDeskError;
use crate::Result;

/// Key holding the customer's display name.
pub const USER_NAME: &str = "user_name";
/// Key holding the list of owned course ids.
pub const PURCHASED_COURSES: &str = "purchased_courses";
/// Key holding the ordered list of interaction records.
pub const INTERACTION_HISTORY: &str = "interaction_history";

/// Mutable key/value data attached to a session.
///
/// Entries keep their insertion order, which is also the order of the
/// final state dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(Map<String, Value>);

impl SessionState {
    /// Create an empty state mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state of a customer-support session.
    pub fn customer(user_name: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.set(USER_NAME, Value::String(user_name.into()));
        state.set(PURCHASED_COURSES, Value::Array(Vec::new()));
        state.set(INTERACTION_HISTORY, Value::Array(Vec::new()));
        state
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or replace an entry. Replacing keeps the original position.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.get(USER_NAME).and_then(Value::as_str)
    }

    /// Owned course ids. A missing entry reads as an empty list.
    pub fn purchased_courses(&self) -> Result<Vec<String>> {
        self.typed_list(PURCHASED_COURSES)
    }

    /// Interaction records in insertion order.
    pub fn interaction_history(&self) -> Result<Vec<InteractionRecord>> {
        self.typed_list(INTERACTION_HISTORY)
    }

    /// Append a record to `interaction_history`, returning the new length.
    pub fn push_interaction(&mut self, record: InteractionRecord) -> Result<usize> {
        let value = serde_json::to_value(record)
            .map_err(|e| SupportDeskError::InvalidState(e.to_string()))?;
        let history = self.list_mut(INTERACTION_HISTORY)?;
        history.push(value);
        Ok(history.len())
    }

    /// Add a course id to `purchased_courses`.
    ///
    /// Returns `false` if the course was already owned.
    pub fn add_purchased_course(&mut self, course_id: &str) -> Result<bool> {
        let courses = self.list_mut(PURCHASED_COURSES)?;
        if courses.iter().any(|c| c.as_str() == Some(course_id)) {
            return Ok(false);
        }
        courses.push(Value::String(course_id.to_string()));
        Ok(true)
    }

    /// Remove a course id from `purchased_courses`.
    ///
    /// Returns `false` if the course was not owned.
    pub fn remove_purchased_course(&mut self, course_id: &str) -> Result<bool> {
        let courses = self.list_mut(PURCHASED_COURSES)?;
        let before = courses.len();
        courses.retain(|c| c.as_str() != Some(course_id));
        Ok(courses.len() != before)
    }

    fn typed_list<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| SupportDeskError::InvalidState(format!("{}: {}", key, e))),
        }
    }

    fn list_mut(&mut self, key: &str) -> Result<&mut Vec<Value>> {
        self.0
            .entry(key)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| SupportDeskError::InvalidState(format!("{} is not a list", key)))
    }
}

impl From<Map<String, Value>> for SessionState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Render a state value the way the final dump prints it.
///
/// Strings are printed bare; everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
