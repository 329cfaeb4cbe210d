//! System instruction templating.

use crate::session::{display_value, SessionState};

/// Customer-service instruction used when none is configured.
///
/// `{key}` placeholders are filled from the session state.
pub const DEFAULT_INSTRUCTION: &str = "\
You are the customer service agent for an online course platform.
You help customers with questions about the available courses, purchases and refunds.

Customer information:
- Name: {user_name}
- Purchased courses: {purchased_courses}
- Previous interactions: {interaction_history}

Guidelines:
- Greet the customer by name and keep answers short and friendly.
- Use the purchase_course tool only after the customer clearly asks to buy a course.
- Use the refund_course tool only for a course the customer owns and asks to refund.
- Never invent courses that are not in the catalog.";

/// Fill `{key}` placeholders from the session state.
///
/// Strings are inserted bare, other values as compact JSON. Placeholders
/// without a matching state entry are left untouched.
pub fn render_instruction(template: &str, state: &SessionState) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    // Substituted values are never scanned again
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|key| !key.contains('{'))
            .and_then(|key| state.get(key).map(|value| (key, value)));

        match value {
            Some((key, value)) => {
                rendered.push_str(&display_value(value));
                rest = &after[key.len() + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}
