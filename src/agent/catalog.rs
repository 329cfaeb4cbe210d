//! Course catalog and the state-changing tools exposed to the model.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::session::{SessionKey, SessionStore};
use crate::Result;

pub const PURCHASE_COURSE: &str = "purchase_course";
pub const REFUND_COURSE: &str = "refund_course";

/// A course that can be bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub price: f64,
}

/// Result of a tool call, returned to the model as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub message: String,
}

impl ToolOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Courses on offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCatalog(Vec<Course>);

impl Default for CourseCatalog {
    fn default() -> Self {
        Self(vec![Course {
            id: "ai_marketing_platform".to_string(),
            name: "Fullstack AI Marketing Platform".to_string(),
            price: 149.0,
        }])
    }
}

impl CourseCatalog {
    pub fn new(courses: Vec<Course>) -> Self {
        Self(courses)
    }

    pub fn courses(&self) -> &[Course] {
        &self.0
    }

    pub fn find(&self, id: &str) -> Option<&Course> {
        self.0.iter().find(|c| c.id == id)
    }

    /// Plain-text listing appended to the system instruction.
    pub fn describe(&self) -> String {
        if self.0.is_empty() {
            return "Course catalog: no courses are currently on offer.".to_string();
        }
        let mut text = String::from("Course catalog:");
        for course in &self.0 {
            text.push_str(&format!(
                "\n- {} (id: {}, price: ${:.2})",
                course.name, course.id, course.price
            ));
        }
        text
    }

    /// Function definitions in chat-completions `tools` format.
    pub fn tool_definitions(&self) -> Vec<Value> {
        let ids: Vec<&str> = self.0.iter().map(|c| c.id.as_str()).collect();
        let parameters = json!({
            "type": "object",
            "properties": {
                "course_id": {
                    "type": "string",
                    "description": "Id of the course from the catalog",
                    "enum": ids,
                }
            },
            "required": ["course_id"],
        });

        vec![
            json!({
                "type": "function",
                "function": {
                    "name": PURCHASE_COURSE,
                    "description": "Purchase a course for the current customer",
                    "parameters": parameters.clone(),
                }
            }),
            json!({
                "type": "function",
                "function": {
                    "name": REFUND_COURSE,
                    "description": "Refund a course the current customer owns",
                    "parameters": parameters,
                }
            }),
        ]
    }

    /// Run a tool call against the session state.
    ///
    /// Bad arguments and unknown tools are reported back to the model as a
    /// failed outcome; only store failures are errors.
    pub fn execute(
        &self,
        store: &SessionStore,
        key: &SessionKey,
        name: &str,
        arguments: &Value,
    ) -> Result<ToolOutcome> {
        let Some(course_id) = arguments.get("course_id").and_then(Value::as_str) else {
            return Ok(ToolOutcome::failed("missing required argument: course_id"));
        };

        match name {
            PURCHASE_COURSE => {
                let Some(course) = self.find(course_id) else {
                    return Ok(ToolOutcome::failed(format!("unknown course: {}", course_id)));
                };
                let added = store.update(key, |s| s.state.add_purchased_course(course_id))?;
                if added {
                    info!(session = %key.session_id, course = %course_id, "Course purchased");
                    Ok(ToolOutcome::ok(format!(
                        "Purchased {} for ${:.2}",
                        course.name, course.price
                    )))
                } else {
                    Ok(ToolOutcome::failed(format!("{} is already owned", course.name)))
                }
            }
            REFUND_COURSE => {
                let removed =
                    store.update(key, |s| s.state.remove_purchased_course(course_id))?;
                if removed {
                    info!(session = %key.session_id, course = %course_id, "Course refunded");
                    Ok(ToolOutcome::ok(format!("Refunded {}", course_id)))
                } else {
                    Ok(ToolOutcome::failed(format!("{} is not owned", course_id)))
                }
            }
            other => Ok(ToolOutcome::failed(format!("unknown tool: {}", other))),
        }
    }
}
